const COMMANDS: &[&str] = &[
    "write_debug_file",
    "get_memory_info",
    "open_popup_window",
    "open_external",
    "show_context_menu",
    "attach_embedded_view",
];

fn main() {
    tauri_build::try_build(
        tauri_build::Attributes::new().app_manifest(tauri_build::AppManifest::new().commands(COMMANDS)),
    )
    .expect("failed to run tauri-build");
}
