// frontend/src/dashboard/mod.rs
//
// Analytics dashboard: pick a saved configuration and a date range, then load
// every metric series in parallel. Each series lives in its own signal with
// its own loading flag so cards fill in independently.

mod chart_card;
pub mod charts;

use crate::api;
use crate::app::{INPUT_STYLE, PANEL_STYLE, Route};
use crate::notifications::{notify_once, use_toasts};
use chart_card::{CfdChart, DurationChart, ThroughputChart, WipChart};
use cycletime_shared::{
    CfdSeries, ChartData, Configuration, DurationSeries, MetricKind, NotificationCenter,
    NotificationKind, ThroughputSeries, WipSeries,
};
use dioxus::prelude::*;
use dioxus_router::Link;
use serde::de::DeserializeOwned;
use std::rc::Rc;

const DEFAULT_DAYS: u32 = 90;
const RANGE_CHOICES: [u32; 4] = [30, 90, 180, 365];

pub fn metric_path(id: i64, kind: MetricKind, days: u32) -> String {
    format!("/api/configurations/{id}/analytics/{}?days={days}", kind.as_str())
}

/// One metric's data slot plus its loading flag.
struct Slot<T: 'static> {
    data: Signal<Option<Rc<T>>>,
    loading: Signal<bool>,
}

impl<T: 'static> Clone for Slot<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for Slot<T> {}

fn use_slot<T: 'static>() -> Slot<T> {
    Slot {
        data: use_signal(|| None),
        loading: use_signal(|| false),
    }
}

fn load<T>(
    slot: Slot<T>,
    kind: MetricKind,
    path: String,
    generation: Signal<u64>,
    toasts: Signal<NotificationCenter>,
    failed: fn(String) -> T,
) where
    T: DeserializeOwned + ChartData + 'static,
{
    let Slot {
        mut data,
        mut loading,
    } = slot;
    let started = *generation.peek();
    loading.set(true);

    spawn(async move {
        let series = match api::get_json::<T>(&path).await {
            Ok(series) => series,
            Err(e) => failed(format!("could not load {}: {e}", kind.title())),
        };
        // a newer selection superseded this request
        if *generation.peek() != started {
            return;
        }
        if let Some(err) = series.error() {
            notify_once(toasts, NotificationKind::Error, err.to_string());
        }
        data.set(Some(Rc::new(series)));
        loading.set(false);
    });
}

#[component]
pub fn Dashboard() -> Element {
    let toasts = use_toasts();
    let configs = use_resource(|| async {
        api::get_json::<Vec<Configuration>>("/api/configurations").await
    });

    let mut selected = use_signal(|| None::<i64>);
    let mut days = use_signal(|| DEFAULT_DAYS);
    let mut generation = use_signal(|| 0u64);

    let lead = use_slot::<DurationSeries>();
    let cycle = use_slot::<DurationSeries>();
    let throughput = use_slot::<ThroughputSeries>();
    let wip = use_slot::<WipSeries>();
    let cfd = use_slot::<CfdSeries>();

    // default to the first configuration once the list arrives
    use_effect(move || {
        if selected.peek().is_some() {
            return;
        }
        let first = match &*configs.read() {
            Some(Ok(list)) => list.first().map(|c| c.id),
            _ => None,
        };
        if first.is_some() {
            selected.set(first);
        }
    });

    use_effect(move || {
        let Some(id) = selected() else {
            return;
        };
        let days = days();
        *generation.write() += 1;

        for kind in MetricKind::ALL {
            let path = metric_path(id, kind, days);
            match kind {
                MetricKind::LeadTime => load(lead, kind, path, generation, toasts, |e| DurationSeries::failed(e)),
                MetricKind::CycleTime => load(cycle, kind, path, generation, toasts, |e| DurationSeries::failed(e)),
                MetricKind::Throughput => load(throughput, kind, path, generation, toasts, |e| ThroughputSeries::failed(e)),
                MetricKind::Wip => load(wip, kind, path, generation, toasts, |e| WipSeries::failed(e)),
                MetricKind::Cfd => load(cfd, kind, path, generation, toasts, |e| CfdSeries::failed(e)),
            }
        }
    });

    let picker = match &*configs.read() {
        None => rsx! { div { style: "color:#64748b;", "Loading configurations…" } },
        Some(Err(e)) => rsx! { div { style: "color:#fca5a5;", "Could not load configurations: {e}" } },
        Some(Ok(list)) if list.is_empty() => rsx! {
            div { style: "color:#94a3b8;",
                "No configurations yet. "
                Link { to: Route::CreateConfiguration {}, style: "color:#93c5fd;", "Create one" }
                " to start analysing a project."
            }
        },
        Some(Ok(list)) => rsx! {
            select {
                style: "{INPUT_STYLE} width:auto; min-width:220px;",
                onchange: move |evt| selected.set(evt.value().parse().ok()),
                for c in list.iter() {
                    option {
                        value: "{c.id}",
                        selected: selected() == Some(c.id),
                        "{c.name} ({c.project_key})"
                    }
                }
            }
            select {
                style: "{INPUT_STYLE} width:auto;",
                onchange: move |evt| {
                    if let Ok(d) = evt.value().parse() {
                        days.set(d);
                    }
                },
                for d in RANGE_CHOICES {
                    option { value: "{d}", selected: days() == d, "Last {d} days" }
                }
            }
        },
    };

    rsx! {
        div { style: "{PANEL_STYLE} display:flex; flex-wrap:wrap; gap:12px; align-items:center; margin-bottom:16px;",
            {picker}
        }

        if selected().is_some() {
            div { style: "display:grid; grid-template-columns:repeat(auto-fit, minmax(420px, 1fr)); gap:16px;",
                DurationChart { title: MetricKind::LeadTime.title().to_string(), data: lead.data, loading: lead.loading }
                DurationChart { title: MetricKind::CycleTime.title().to_string(), data: cycle.data, loading: cycle.loading }
                ThroughputChart { data: throughput.data, loading: throughput.loading }
                WipChart { data: wip.data, loading: wip.loading }
                CfdChart { data: cfd.data, loading: cfd.loading }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_paths_use_kebab_segments() {
        assert_eq!(
            metric_path(7, MetricKind::CycleTime, 30),
            "/api/configurations/7/analytics/cycle-time?days=30"
        );
        assert_eq!(
            metric_path(1, MetricKind::Cfd, DEFAULT_DAYS),
            "/api/configurations/1/analytics/cfd?days=90"
        );
    }
}
