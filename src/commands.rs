use crate::config::{AppSettings, FrameSettings};
use crate::engine::controls::RotateAction;
use crate::engine::editor::{Editor, EditorSnapshot};
use crate::engine::input::{InputEvent, PointerEvent};
use crate::engine::joystick::Direction;
use crate::engine::transform::TransformState;
use crate::error::EditorResult;
use crate::export::{self, ExportJob};
use std::path::PathBuf;
use std::sync::Mutex;
use tauri::ipc::Response;
use tauri::{AppHandle, Emitter, State};
use tauri_plugin_opener::OpenerExt;

pub struct AppState {
    pub editor: Mutex<Editor>,
    pub settings: Mutex<AppSettings>,
    pub settings_path: PathBuf,
    pub last_export: Mutex<Option<PathBuf>>,
}

impl AppState {
    pub fn new(settings: AppSettings, settings_path: PathBuf) -> Self {
        Self {
            editor: Mutex::new(Editor::new(&settings)),
            settings: Mutex::new(settings),
            settings_path,
            last_export: Mutex::new(None),
        }
    }
}

fn notify(app: &AppHandle) {
    let _ = app.emit("editor-changed", ());
}

#[tauri::command]
pub async fn load_media(
    path: String,
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<TransformState, String> {
    let source_path = PathBuf::from(&path);
    let loaded = tauri::async_runtime::spawn_blocking(move || crate::media::load(&source_path))
        .await
        .map_err(|e| e.to_string())?;

    let result = {
        let mut editor = state.editor.lock().map_err(|e| e.to_string())?;
        editor.install_media(loaded)
    };
    notify(&app);
    result.map_err(|e| e.to_string())
}

/// Returns whether the media moved.
#[tauri::command]
pub fn pointer(event: PointerEvent, state: State<'_, AppState>) -> Result<bool, String> {
    let mut editor = state.editor.lock().map_err(|e| e.to_string())?;
    Ok(editor.handle(InputEvent::Pointer(event)))
}

#[tauri::command]
pub fn set_zoom(value: f64, state: State<'_, AppState>) -> Result<TransformState, String> {
    let mut editor = state.editor.lock().map_err(|e| e.to_string())?;
    editor.handle(InputEvent::Zoom { value });
    Ok(editor.transform())
}

#[tauri::command]
pub fn rotate(action: RotateAction, state: State<'_, AppState>) -> Result<TransformState, String> {
    let mut editor = state.editor.lock().map_err(|e| e.to_string())?;
    editor.handle(InputEvent::Rotate { action });
    Ok(editor.transform())
}

#[tauri::command]
pub fn joystick_press(direction: Direction, state: State<'_, AppState>) -> Result<(), String> {
    let mut editor = state.editor.lock().map_err(|e| e.to_string())?;
    editor.handle(InputEvent::JoystickPress { direction });
    Ok(())
}

#[tauri::command]
pub fn joystick_release(direction: Direction, state: State<'_, AppState>) -> Result<(), String> {
    let mut editor = state.editor.lock().map_err(|e| e.to_string())?;
    editor.handle(InputEvent::JoystickRelease { direction });
    Ok(())
}

#[tauri::command]
pub fn joystick_cycle_speed(state: State<'_, AppState>) -> Result<String, String> {
    let mut editor = state.editor.lock().map_err(|e| e.to_string())?;
    editor.handle(InputEvent::JoystickCenter);
    Ok(editor.speed().label().to_string())
}

#[tauri::command]
pub fn get_editor_state(state: State<'_, AppState>) -> Result<EditorSnapshot, String> {
    let editor = state.editor.lock().map_err(|e| e.to_string())?;
    Ok(editor.snapshot())
}

/// Raw RGBA bytes of the canvas, row-major, canvas width × height.
#[tauri::command]
pub fn get_frame(state: State<'_, AppState>) -> Result<Response, String> {
    let editor = state.editor.lock().map_err(|e| e.to_string())?;
    Ok(Response::new(editor.surface().as_raw().clone()))
}

async fn run_export(
    prepared: EditorResult<ExportJob>,
    app: &AppHandle,
    state: &AppState,
) -> Result<String, String> {
    let job = match prepared {
        Ok(job) => job,
        Err(e) => {
            notify(app);
            return Err(e.to_string());
        }
    };
    if job.is_video() {
        notify(app);
    }

    let settings = state
        .settings
        .lock()
        .map_err(|e| e.to_string())?
        .export
        .clone();
    let result = export::run(job, &settings).await;

    {
        let mut editor = state.editor.lock().map_err(|e| e.to_string())?;
        editor.finish_export(&result);
    }
    notify(app);

    let path = result.map_err(|e| e.to_string())?;
    *state.last_export.lock().map_err(|e| e.to_string())? = Some(path.clone());
    Ok(path.to_string_lossy().to_string())
}

/// The download button: JPEG for photos, server render for videos.
#[tauri::command]
pub async fn download(app: AppHandle, state: State<'_, AppState>) -> Result<String, String> {
    let prepared = {
        let mut editor = state.editor.lock().map_err(|e| e.to_string())?;
        editor.prepare_download()
    };
    run_export(prepared, &app, &state).await
}

#[tauri::command]
pub fn reveal_export(app: AppHandle, state: State<'_, AppState>) -> Result<(), String> {
    let last = state.last_export.lock().map_err(|e| e.to_string())?.clone();
    let path = last.ok_or_else(|| "Nothing exported yet".to_string())?;
    app.opener()
        .reveal_item_in_dir(&path)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn set_overlay(frame: FrameSettings, state: State<'_, AppState>) -> Result<(), String> {
    {
        let mut editor = state.editor.lock().map_err(|e| e.to_string())?;
        editor.set_overlay(&frame).map_err(|e| format!("{:#}", e))?;
    }
    let mut settings = state.settings.lock().map_err(|e| e.to_string())?;
    settings.frame = frame;
    settings
        .save_to(&state.settings_path)
        .map_err(|e| format!("{:#}", e))
}

#[tauri::command]
pub fn get_settings(state: State<'_, AppState>) -> Result<AppSettings, String> {
    let settings = state.settings.lock().map_err(|e| e.to_string())?;
    Ok(settings.clone())
}

/// Persist settings. Canvas size and refresh rate apply on next launch.
#[tauri::command]
pub fn save_settings(
    new_settings: AppSettings,
    state: State<'_, AppState>,
) -> Result<(), String> {
    new_settings
        .save_to(&state.settings_path)
        .map_err(|e| format!("{:#}", e))?;
    let mut settings = state.settings.lock().map_err(|e| e.to_string())?;
    *settings = new_settings;
    Ok(())
}
