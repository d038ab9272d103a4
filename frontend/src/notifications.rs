// frontend/src/notifications.rs
//
// Toast overlay. The `NotificationCenter` lives in a context signal provided
// by `App`; anything that wants to raise a toast grabs it with `use_toasts`.

use cycletime_shared::{NotificationCenter, NotificationKind};
use dioxus::prelude::*;

const PRUNE_INTERVAL_MS: u32 = 500;

#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> i64 {
    js_sys::Date::now() as i64
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub fn use_toasts() -> Signal<NotificationCenter> {
    use_context::<Signal<NotificationCenter>>()
}

pub fn notify(mut center: Signal<NotificationCenter>, kind: NotificationKind, message: impl Into<String>) {
    let message = message.into();
    match kind {
        NotificationKind::Error => tracing::warn!("{message}"),
        _ => tracing::debug!("{message}"),
    }
    center.write().show(kind, message, now_ms());
}

/// Like `notify`, but skipped while an identical message is still showing.
pub fn notify_once(center: Signal<NotificationCenter>, kind: NotificationKind, message: impl Into<String>) {
    let message = message.into();
    let showing = center
        .peek()
        .list(now_ms())
        .iter()
        .any(|n| n.kind == kind && n.message == message);
    if !showing {
        notify(center, kind, message);
    }
}

async fn sleep_ms(ms: u32) {
    #[cfg(target_arch = "wasm32")]
    {
        gloo_timers::future::TimeoutFuture::new(ms).await;
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        tokio::time::sleep(std::time::Duration::from_millis(ms as u64)).await;
    }
}

fn kind_style(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Info => "border:1px solid #2563eb; background:#0b1f4d; color:#bfdbfe;",
        NotificationKind::Success => "border:1px solid #16a34a; background:#052e16; color:#bbf7d0;",
        NotificationKind::Warning => "border:1px solid #d97706; background:#3b2106; color:#fde68a;",
        NotificationKind::Error => "border:1px solid #dc2626; background:#450a0a; color:#fecaca;",
    }
}

#[component]
pub fn Toasts() -> Element {
    let mut center = use_toasts();

    use_future(move || async move {
        loop {
            sleep_ms(PRUNE_INTERVAL_MS).await;
            let now = now_ms();
            // only write when something actually expired, so idle toasts don't re-render
            let stale = center.peek().list(now).len() != center.peek().len();
            if stale {
                center.write().prune(now);
            }
        }
    });

    let live = center.read().list(now_ms());

    rsx! {
        div {
            style: "position:fixed; right:16px; bottom:16px; z-index:1000; display:flex; flex-direction:column; gap:8px; width:min(360px, 90vw);",
            for n in live {
                div {
                    key: "{n.id}",
                    style: "{kind_style(n.kind)} padding:10px 12px; border-radius:12px; display:flex; gap:8px; align-items:flex-start; box-shadow:0 8px 20px rgba(0,0,0,0.4);",
                    div { style: "flex:1; font-size:14px;", "{n.message}" }
                    button {
                        style: "background:none; border:none; color:inherit; cursor:pointer; font-size:14px;",
                        onclick: move |_| {
                            center.write().dismiss(n.id);
                        },
                        "✕"
                    }
                }
            }
        }
    }
}
