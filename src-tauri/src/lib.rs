pub mod commands;
pub mod config;
pub mod models;
pub mod shell;
pub mod state;

use commands::{
    debug::write_debug_file,
    embed::{attach_embedded_view, show_context_menu},
    memory::{get_memory_info, SysinfoSampler},
    popup::{open_external, open_popup_window},
};
use config::ShellConfig;
use shell::{
    menu::{build_application_menu, handle_menu_event},
    platform::Platform,
    window::build_main_window,
};
use state::ShellState;
use std::sync::Arc;
use tauri::{AppHandle, Manager, RunEvent, Runtime, WindowEvent};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    init_logging();

    let platform = Platform::current();

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .menu(move |handle| build_application_menu(handle, platform))
        .on_menu_event(|app, event| handle_menu_event(app, event.id().as_ref()))
        .setup(move |app| {
            let data_dir = app.path().app_local_data_dir().ok();
            let config = ShellConfig::load(&config::resolve_app_root(data_dir));
            log::info!(
                "Starting on {platform:?}; writing diagnostics to {}",
                config.output_path().display()
            );

            let main_window = config.main_window.clone();
            app.manage(ShellState::new(config, platform, Arc::new(SysinfoSampler)));
            build_main_window(app.handle(), &main_window)?;
            Ok(())
        })
        .on_window_event(|window, event| {
            if let WindowEvent::Destroyed = event {
                window.state::<ShellState>().forget_window(window.label());
            }
        })
        .invoke_handler(tauri::generate_handler![
            write_debug_file,
            get_memory_info,
            open_popup_window,
            open_external,
            show_context_menu,
            attach_embedded_view,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(handle_run_event);
}

fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

fn handle_run_event<R: Runtime>(app: &AppHandle<R>, event: RunEvent) {
    match event {
        // `code: None` means the last window closed rather than an explicit exit.
        RunEvent::ExitRequested { code: None, api, .. } => {
            if !app.state::<ShellState>().platform.quits_when_last_window_closes() {
                api.prevent_exit();
            }
        }
        #[cfg(target_os = "macos")]
        RunEvent::Reopen { .. } => {
            if app.webview_windows().is_empty() {
                let state = app.state::<ShellState>();
                if let Err(e) = build_main_window(app, &state.config.main_window) {
                    log::error!("Failed to reopen main window: {e}");
                }
            }
        }
        _ => {}
    }
}
