// frontend/src/dashboard/chart_card.rs
//
// Binds a `ChartLifecycle` to a mounted card. The lifecycle is created once
// per mount, synced against the current signals on every render and torn
// down when the card unmounts.

use super::charts::{
    CfdAreas, DurationHistogram, Scene, ThroughputBars, WipLine, cfd_summary, duration_summary,
    render_scene, throughput_summary, wip_summary,
};
use crate::app::PANEL_STYLE;
use cycletime_shared::chart::PLACEHOLDER_MESSAGE;
use cycletime_shared::{
    CfdSeries, ChartData, ChartLifecycle, ChartPhase, ChartRenderer, DataSource, DurationSeries,
    Flag, ThroughputSeries, WipSeries,
};
use dioxus::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

pub fn chart_card<T, R>(
    title: &str,
    loading: Flag,
    data: DataSource<T>,
    make_renderer: impl FnOnce() -> R,
    summary: fn(&T) -> Element,
) -> Element
where
    T: ChartData + 'static,
    R: ChartRenderer<T, Chart = Scene> + 'static,
{
    let lifecycle = use_hook(|| Rc::new(RefCell::new(ChartLifecycle::new(make_renderer()))));

    use_drop({
        let lifecycle = lifecycle.clone();
        move || lifecycle.borrow_mut().teardown()
    });

    let phase = lifecycle.borrow_mut().sync_from(&loading, &data);

    let body = match phase {
        ChartPhase::Loading => rsx! {
            div { style: "height:220px; display:flex; align-items:center; justify-content:center; color:#64748b; font-size:13px;",
                "Loading…"
            }
        },
        ChartPhase::Unavailable => rsx! {
            div { style: "height:220px; display:flex; align-items:center; justify-content:center; color:#64748b; font-size:13px;",
                "{PLACEHOLDER_MESSAGE}"
            }
        },
        ChartPhase::Ready => {
            let lc = lifecycle.borrow();
            let scene = lc.chart().map(render_scene);
            let stats = lc.source().map(|d| summary(d));
            let ready = rsx! {
                div { style: "display:flex; flex-wrap:wrap; gap:16px; margin-bottom:10px;", {stats} }
                {scene}
            };
            ready
        }
    };

    rsx! {
        div { style: "{PANEL_STYLE} min-width:0;",
            div { style: "color:#94a3b8; font-size:13px; font-weight:600; margin-bottom:10px;", "{title}" }
            {body}
        }
    }
}

#[component]
pub fn DurationChart(
    title: String,
    data: Signal<Option<Rc<DurationSeries>>>,
    loading: Signal<bool>,
) -> Element {
    chart_card(
        &title,
        Flag::accessor(move || loading()),
        DataSource::accessor(move || data()),
        DurationHistogram::default,
        duration_summary,
    )
}

#[component]
pub fn ThroughputChart(data: Signal<Option<Rc<ThroughputSeries>>>, loading: Signal<bool>) -> Element {
    chart_card(
        "Throughput",
        Flag::accessor(move || loading()),
        DataSource::accessor(move || data()),
        ThroughputBars::default,
        throughput_summary,
    )
}

#[component]
pub fn WipChart(data: Signal<Option<Rc<WipSeries>>>, loading: Signal<bool>) -> Element {
    chart_card(
        "Work in Progress",
        Flag::accessor(move || loading()),
        DataSource::accessor(move || data()),
        WipLine::default,
        wip_summary,
    )
}

#[component]
pub fn CfdChart(data: Signal<Option<Rc<CfdSeries>>>, loading: Signal<bool>) -> Element {
    chart_card(
        "Cumulative Flow",
        Flag::accessor(move || loading()),
        DataSource::accessor(move || data()),
        CfdAreas::default,
        cfd_summary,
    )
}
