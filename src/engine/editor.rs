//! The editing session: one owned state value driven by input events and
//! by per-refresh scheduler ticks.

use super::compositor::Compositor;
use super::controls::{self, ZoomRange};
use super::coords::CanvasSize;
use super::drag::DragController;
use super::effects::overlay::OverlayFrame;
use super::input::{InputEvent, PointerEvent, PointerPhase};
use super::joystick::{Direction, JoystickState, JoystickTuning, SpeedMultiplier};
use super::scheduler::{FrameScheduler, TaskControl, TaskHandle};
use super::transform::TransformState;
use crate::config::{AppSettings, FrameSettings, RotateMode};
use crate::error::{EditorError, EditorResult};
use crate::export::params::{resolve_frame_url, VideoExportParams};
use crate::export::{ExportJob, VideoExportRequest};
use crate::media::{self, MediaKind, MediaSource};
use image::RgbaImage;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const PROCESSING_VIDEO_MESSAGE: &str = "Processing video on server…";

/// Everything the per-refresh tasks can touch.
pub struct EditorState {
    pub canvas: CanvasSize,
    pub media: Option<MediaSource>,
    pub transform: TransformState,
    pub drag: DragController,
    pub joystick: JoystickState,
    pub tuning: JoystickTuning,
    pub overlay: Option<OverlayFrame>,
    compositor: Compositor,
    surface: RgbaImage,
    /// Set by every mutation; cleared by a redraw.
    dirty: bool,
    revision: u64,
    message: Option<String>,
}

impl EditorState {
    fn new(canvas: CanvasSize, tuning: JoystickTuning, overlay: Option<OverlayFrame>) -> Self {
        let compositor = Compositor::new(canvas);
        let surface = compositor.blank_surface();
        Self {
            canvas,
            media: None,
            transform: TransformState::default(),
            drag: DragController::new(),
            joystick: JoystickState::default(),
            tuning,
            overlay,
            compositor,
            surface,
            dirty: false,
            revision: 0,
            message: None,
        }
    }

    pub fn has_media(&self) -> bool {
        self.media.is_some()
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn redraw(&mut self) {
        self.compositor.render(
            &mut self.surface,
            self.media.as_ref(),
            &self.transform,
            self.overlay.as_mut(),
        );
        self.dirty = false;
        self.revision += 1;
    }
}

/// Continuous redraw, for the lifetime of the session.
fn render_tick(state: &mut EditorState) -> TaskControl {
    if state.dirty {
        state.redraw();
    }
    TaskControl::Continue
}

/// Joystick motion. Redraws inline so a held direction shows up on the same
/// refresh it moved in.
fn joystick_tick(state: &mut EditorState) -> TaskControl {
    let Some(natural) = state
        .media
        .as_ref()
        .map(|m| (m.natural_width, m.natural_height))
    else {
        state.joystick.animation = None;
        return TaskControl::Stop;
    };
    state
        .joystick
        .step(&mut state.transform, natural, state.canvas, state.tuning);
    state.redraw();
    TaskControl::Continue
}

/// What the front end needs to lay out its controls and status line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    pub loaded: bool,
    pub media_kind: Option<MediaKind>,
    pub natural_width: u32,
    pub natural_height: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub transform: TransformState,
    pub dragging: bool,
    pub speed_label: &'static str,
    pub message: Option<String>,
    pub zoom_range: ZoomRange,
    pub rotate_mode: RotateMode,
    pub revision: u64,
}

pub struct Editor {
    state: EditorState,
    scheduler: FrameScheduler<EditorState>,
    render_loop: Option<TaskHandle>,
    zoom_range: ZoomRange,
    rotate_mode: RotateMode,
    frame_url: Option<String>,
}

impl Editor {
    pub fn new(settings: &AppSettings) -> Self {
        // A zero-sized canvas would make the cover scale zero
        let canvas = CanvasSize::new(settings.canvas.width.max(1), settings.canvas.height.max(1));
        let tuning = JoystickTuning {
            base_speed: settings.controls.joystick_base_speed,
            pad: settings.controls.joystick_pad,
        };
        let overlay = open_overlay(&settings.frame);
        Self {
            state: EditorState::new(canvas, tuning, overlay),
            scheduler: FrameScheduler::new(),
            render_loop: None,
            zoom_range: ZoomRange {
                min: settings.controls.zoom_min,
                max: settings.controls.zoom_max,
                step: settings.controls.zoom_step,
            },
            rotate_mode: settings.controls.rotate_mode,
            frame_url: resolve_frame_url(&settings.frame),
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn transform(&self) -> TransformState {
        self.state.transform
    }

    pub fn surface(&self) -> &RgbaImage {
        &self.state.surface
    }

    pub fn revision(&self) -> u64 {
        self.state.revision
    }

    pub fn message(&self) -> Option<&str> {
        self.state.message.as_deref()
    }

    pub fn speed(&self) -> SpeedMultiplier {
        self.state.joystick.speed
    }

    /// Load a file from disk and install it.
    pub fn load_media(&mut self, path: &Path) -> EditorResult<TransformState> {
        self.install_media(media::load(path))
    }

    /// Install the result of a load that ran elsewhere (the desktop shell
    /// decodes off the editor lock). Any previous media is dropped first.
    pub fn install_media(
        &mut self,
        loaded: EditorResult<MediaSource>,
    ) -> EditorResult<TransformState> {
        self.state.message = None;
        self.state.media = None;
        self.state.drag.release();
        self.state.mark_dirty();

        match loaded {
            Ok(source) => {
                self.state.transform = TransformState::cover(
                    source.natural_width,
                    source.natural_height,
                    self.state.canvas,
                );
                self.state.media = Some(source);
                self.ensure_render_loop();
                Ok(self.state.transform)
            }
            Err(e) => {
                log::warn!("Media load failed: {:?}", e);
                self.state.message = Some(e.to_string());
                if self.render_loop.is_none() {
                    self.state.redraw();
                }
                Err(e)
            }
        }
    }

    /// Swap the overlay frame. A path that fails to decode leaves no overlay.
    pub fn set_overlay(&mut self, frame: &FrameSettings) -> anyhow::Result<()> {
        self.frame_url = resolve_frame_url(frame);
        self.state.overlay = None;
        self.state.mark_dirty();
        if let Some(path) = &frame.overlay_path {
            self.state.overlay = Some(OverlayFrame::open(Path::new(path))?);
        }
        Ok(())
    }

    fn ensure_render_loop(&mut self) {
        let running = self
            .render_loop
            .map(|h| self.scheduler.is_scheduled(h))
            .unwrap_or(false);
        if !running {
            self.render_loop = Some(self.scheduler.request_frame("render", render_tick));
            log::debug!("Render loop started");
        }
    }

    /// One display refresh. Returns whether the canvas was redrawn.
    pub fn run_frame(&mut self) -> bool {
        let before = self.state.revision;
        self.scheduler.run_frame(&mut self.state);
        self.state.revision != before
    }

    pub fn is_joystick_running(&self) -> bool {
        self.state
            .joystick
            .animation
            .map(|h| self.scheduler.is_scheduled(h))
            .unwrap_or(false)
    }

    /// Apply one input event. Returns whether the editor state changed.
    pub fn handle(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::Pointer(pointer) => self.handle_pointer(pointer),
            InputEvent::Zoom { value } => {
                if !self.state.has_media() {
                    return false;
                }
                let changed = controls::apply_zoom(&mut self.state.transform, value);
                if changed {
                    self.state.mark_dirty();
                }
                changed
            }
            InputEvent::Rotate { action } => {
                if !self.state.has_media() {
                    return false;
                }
                controls::apply_rotate(&mut self.state.transform, action);
                self.state.mark_dirty();
                true
            }
            InputEvent::JoystickPress { direction } => {
                self.joystick_press(direction);
                false
            }
            InputEvent::JoystickRelease { direction } => {
                self.joystick_release(direction);
                false
            }
            InputEvent::JoystickCenter => {
                self.state.joystick.cycle_speed();
                true
            }
        }
    }

    fn handle_pointer(&mut self, pointer: PointerEvent) -> bool {
        let point = pointer.canvas_point(self.state.canvas);

        match pointer.phase {
            PointerPhase::Down => {
                if self.state.has_media() {
                    self.state
                        .drag
                        .press(point, pointer.contacts, &self.state.transform);
                }
                false
            }
            PointerPhase::Move => {
                let moved = self.state.has_media()
                    && self
                        .state
                        .drag
                        .drag_to(point, pointer.contacts, &mut self.state.transform);
                if moved {
                    self.state.mark_dirty();
                }
                moved
            }
            PointerPhase::Up | PointerPhase::Cancel => {
                self.state.drag.release();
                false
            }
        }
    }

    fn joystick_press(&mut self, direction: Direction) {
        self.state.joystick.set(direction, true);
        if !self.is_joystick_running() {
            let handle = self.scheduler.request_frame("joystick", joystick_tick);
            self.state.joystick.animation = Some(handle);
        }
    }

    fn joystick_release(&mut self, direction: Direction) {
        self.state.joystick.set(direction, false);
        if !self.state.joystick.any_held() {
            if let Some(handle) = self.state.joystick.animation.take() {
                self.scheduler.cancel(handle);
            }
        }
    }

    /// Capture what the download button should export.
    pub fn prepare_download(&mut self) -> EditorResult<ExportJob> {
        let result = match self.state.media.as_ref().map(|m| m.kind) {
            None => Err(EditorError::NoMedia),
            Some(MediaKind::Image) => {
                self.state.redraw();
                Ok(ExportJob::Image(self.state.surface.clone()))
            }
            Some(MediaKind::Video) => return self.prepare_video_export(),
        };
        self.report(result)
    }

    pub fn prepare_video_export(&mut self) -> EditorResult<ExportJob> {
        let result = match self.state.media.as_ref().filter(|m| m.is_video()) {
            None => Err(EditorError::NotAVideo),
            Some(source) => Ok(ExportJob::Video(VideoExportRequest {
                video_path: source.path.clone(),
                file_name: source.file_name(),
                mime: MediaKind::mime_for(&source.path).to_string(),
                params: VideoExportParams::new(
                    &self.state.transform,
                    self.state.canvas,
                    self.frame_url.clone(),
                ),
            })),
        };
        if result.is_ok() {
            self.state.message = Some(PROCESSING_VIDEO_MESSAGE.to_string());
        }
        self.report(result)
    }

    /// Record how an export went in the status line.
    pub fn finish_export(&mut self, result: &EditorResult<PathBuf>) {
        self.state.message = match result {
            Ok(_) => None,
            Err(e) => Some(e.to_string()),
        };
    }

    fn report<T>(&mut self, result: EditorResult<T>) -> EditorResult<T> {
        if let Err(e) = &result {
            log::info!("Export refused: {}", e);
            self.state.message = Some(e.to_string());
        }
        result
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        let media = self.state.media.as_ref();
        EditorSnapshot {
            loaded: media.is_some(),
            media_kind: media.map(|m| m.kind),
            natural_width: media.map(|m| m.natural_width).unwrap_or(0),
            natural_height: media.map(|m| m.natural_height).unwrap_or(0),
            canvas_width: self.state.canvas.width,
            canvas_height: self.state.canvas.height,
            transform: self.state.transform,
            dragging: self.state.drag.is_dragging(),
            speed_label: self.state.joystick.speed.label(),
            message: self.state.message.clone(),
            zoom_range: self.zoom_range,
            rotate_mode: self.rotate_mode,
            revision: self.state.revision,
        }
    }
}

fn open_overlay(frame: &FrameSettings) -> Option<OverlayFrame> {
    let path = frame.overlay_path.as_ref()?;
    match OverlayFrame::open(Path::new(path)) {
        Ok(overlay) => Some(overlay),
        Err(e) => {
            log::warn!("No overlay frame: {:#}", e);
            None
        }
    }
}
