pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod media;

#[cfg(feature = "desktop")]
pub mod commands;

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use std::time::Duration;
    use tauri::{Emitter, Manager};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings_path = config::AppSettings::default_path();
    let settings = config::AppSettings::load_or_default(&settings_path);
    let refresh_hz = settings.preview.refresh_hz.max(1);

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .manage(commands::AppState::new(settings, settings_path))
        .setup(move |app| {
            let handle = app.handle().clone();

            // Display refresh driver for the editor's frame scheduler
            tauri::async_runtime::spawn(async move {
                let mut ticker =
                    tokio::time::interval(Duration::from_secs_f64(1.0 / refresh_hz as f64));
                ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                loop {
                    ticker.tick().await;
                    let state = handle.state::<commands::AppState>();
                    let redrawn = match state.editor.lock() {
                        Ok(mut editor) => editor.run_frame().then(|| editor.revision()),
                        Err(e) => {
                            log::error!("Editor state poisoned, stopping refresh: {}", e);
                            break;
                        }
                    };
                    if let Some(revision) = redrawn {
                        let _ = handle.emit("frame-ready", revision);
                    }
                }
            });

            log::info!("Refresh driver running at {} Hz", refresh_hz);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::load_media,
            commands::pointer,
            commands::set_zoom,
            commands::rotate,
            commands::joystick_press,
            commands::joystick_release,
            commands::joystick_cycle_speed,
            commands::get_editor_state,
            commands::get_frame,
            commands::download,
            commands::reveal_export,
            commands::set_overlay,
            commands::get_settings,
            commands::save_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
