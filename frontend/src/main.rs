mod api;
mod app;
mod configs;
mod dashboard;
mod notifications;

use dioxus::prelude::*;

#[cfg(target_arch = "wasm32")]
fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(target_arch = "wasm32"))]
fn init_panic_hook() {}

#[cfg(target_arch = "wasm32")]
fn main() {
    init_panic_hook();
    launch(app::App);
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    init_panic_hook();
    let cfg = dioxus_desktop::Config::new().with_window(
        dioxus_desktop::WindowBuilder::new().with_title("Cycle Time Analyzer"),
    );
    LaunchBuilder::desktop().with_cfg(cfg).launch(app::App);
}
