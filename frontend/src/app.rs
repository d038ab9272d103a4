// frontend/src/app.rs

use crate::configs::{ConfigurationList, CreateConfiguration, EditConfiguration};
use crate::dashboard::Dashboard;
use crate::notifications::Toasts;
use cycletime_shared::NotificationCenter;
use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable, Router};

// --- global css ---
const GLOBAL_CSS: &str = r#"
html, body {
    margin: 0;
    padding: 0;
    width: 100%;
    min-height: 100%;
    background: #020617;
    font-family: system-ui, sans-serif;
}

:root, html {
    color-scheme: dark;
}

#main {
    width: 100%;
    min-height: 100%;
    background: #020617;
}

* { box-sizing: border-box; }

input, select, button {
    font: inherit;
}
"#;

pub const PANEL_STYLE: &str =
    "padding:12px; border:1px solid #334155; border-radius:12px; background:#0b1220;";
pub const INPUT_STYLE: &str = "width:100%; padding:8px 10px; border-radius:10px; border:1px solid #334155; background:#020617; color:#e5e7eb; outline:none;";
pub const BUTTON_STYLE: &str = "padding:8px 14px; border-radius:10px; border:1px solid #334155; background:#111827; color:#e5e7eb; cursor:pointer;";
pub const PRIMARY_BUTTON_STYLE: &str = "padding:8px 14px; border-radius:10px; border:1px solid #2563eb; background:#1d4ed8; color:#eff6ff; cursor:pointer;";

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Shell)]
        #[route("/")]
        Dashboard {},

        #[route("/configurations")]
        ConfigurationList {},

        #[route("/configurations/new")]
        CreateConfiguration {},

        #[route("/configurations/:id")]
        EditConfiguration { id: i64 },
}

#[component]
pub fn App() -> Element {
    use_context_provider(|| Signal::new(NotificationCenter::new()));

    rsx! {
        document::Style { "{GLOBAL_CSS}" }
        Meta { name: "viewport", content: "width=device-width, initial-scale=1" }

        div {
            style: "min-height: 100vh; width: 100%; background: #020617; color: #e5e7eb;",
            Router::<Route> {}
            Toasts {}
        }
    }
}

#[component]
fn Shell() -> Element {
    rsx! {
        div { style: "display:flex; align-items:center; gap:20px; padding:12px 20px; border-bottom:1px solid #1f2937; background:#0b1220;",
            div { style: "font-weight:600; font-size:16px;", "Cycle Time Analyzer" }
            Link { to: Route::Dashboard {}, style: "color:#93c5fd; text-decoration:none;", "Dashboard" }
            Link { to: Route::ConfigurationList {}, style: "color:#93c5fd; text-decoration:none;", "Configurations" }
        }
        div { style: "padding:20px; max-width:1400px; margin:0 auto;",
            Outlet::<Route> {}
        }
    }
}
