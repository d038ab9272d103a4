// frontend/src/dashboard/charts.rs
//
// Chart renderers for the analytics series. A renderer turns a series into a
// `Scene` (plain shapes in a fixed viewbox) which `ChartCard` draws as SVG.
//
//  - duration histogram: fixed-width day buckets coloured by percentile band,
//    with median / 85th / 95th markers
//  - throughput: weekly bars plus the average line
//  - wip: daily line plus the average line
//  - cfd: stacked areas, last workflow status at the bottom

use cycletime_shared::stats::{
    DEFAULT_BUCKET_WIDTH, bucket_start, cumulative_percentage, distribution_buckets, sorted_finite,
};
use cycletime_shared::{
    CfdSeries, ChartError, ChartRenderer, DurationSeries, PercentileBand, PercentileCuts,
    ThroughputSeries, WipSeries,
};
use dioxus::prelude::*;

pub const VIEW_W: f64 = 900.0;
pub const VIEW_H: f64 = 260.0;

const PAD_L: f64 = 44.0;
const PAD_R: f64 = 12.0;
const PAD_T: f64 = 12.0;
const PAD_B: f64 = 28.0;

const MAX_X_TICKS: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Bar {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        fill: &'static str,
        tip: String,
    },
    Line {
        points: String,
        stroke: &'static str,
        dashed: bool,
    },
    Area {
        points: String,
        fill: &'static str,
        tip: String,
    },
    Marker {
        x: f64,
        label: String,
        stroke: &'static str,
    },
    Tick {
        x: f64,
        y: f64,
        anchor: &'static str,
        text: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub shapes: Vec<Shape>,
    /// (colour, label)
    pub legend: Vec<(&'static str, String)>,
}

pub fn series_color(i: usize) -> &'static str {
    const COLORS: [&str; 8] = [
        "#f97316", "#22d3ee", "#a3e635", "#f43f5e", "#8b5cf6", "#e879f9", "#10b981", "#fbbf24",
    ];
    COLORS[i % COLORS.len()]
}

pub fn band_color(band: PercentileBand) -> &'static str {
    match band {
        PercentileBand::Within50th => "#22c55e",
        PercentileBand::From50thTo85th => "#38bdf8",
        PercentileBand::From85thTo95th => "#f59e0b",
        PercentileBand::Above95th => "#ef4444",
    }
}

pub fn band_title(band: PercentileBand) -> &'static str {
    match band {
        PercentileBand::Within50th => "within 50th percentile",
        PercentileBand::From50thTo85th => "50th to 85th percentile",
        PercentileBand::From85thTo95th => "85th to 95th percentile",
        PercentileBand::Above95th => "above 95th percentile",
    }
}

/// Maps data coordinates into the viewbox.
struct Plot {
    x_min: f64,
    x_span: f64,
    y_max: f64,
}

impl Plot {
    fn new(x_min: f64, x_max: f64, y_max: f64) -> Self {
        let x_span = x_max - x_min;
        Self {
            x_min,
            x_span: if x_span.is_finite() && x_span > 0.0 { x_span } else { 1.0 },
            y_max: if y_max.is_finite() && y_max > 0.0 { y_max } else { 1.0 },
        }
    }

    fn x(&self, v: f64) -> f64 {
        PAD_L + (v - self.x_min) / self.x_span * (VIEW_W - PAD_L - PAD_R)
    }

    fn y(&self, v: f64) -> f64 {
        PAD_T + (1.0 - v / self.y_max) * (VIEW_H - PAD_T - PAD_B)
    }

    fn baseline(&self) -> f64 {
        VIEW_H - PAD_B
    }

    fn y_ticks(&self, out: &mut Vec<Shape>) {
        for v in [0.0, self.y_max / 2.0, self.y_max] {
            out.push(Shape::Tick {
                x: PAD_L - 6.0,
                y: self.y(v) + 4.0,
                anchor: "end",
                text: format_count(v),
            });
        }
    }

    fn horizontal(&self, v: f64, stroke: &'static str) -> Shape {
        let y = self.y(v);
        Shape::Line {
            points: format!("{:.2},{y:.2} {:.2},{y:.2}", PAD_L, VIEW_W - PAD_R),
            stroke,
            dashed: true,
        }
    }
}

fn format_count(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        format!("{v:.1}")
    }
}

fn polyline(points: impl Iterator<Item = (f64, f64)>) -> String {
    points
        .map(|(x, y)| format!("{x:.2},{y:.2}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn tick_stride(n: usize) -> usize {
    n.div_ceil(MAX_X_TICKS).max(1)
}

fn x_tick(x: f64, text: String) -> Shape {
    Shape::Tick {
        x,
        y: VIEW_H - 8.0,
        anchor: "middle",
        text,
    }
}

/// Lead / cycle time histogram.
pub struct DurationHistogram {
    pub bucket_width: u32,
}

impl Default for DurationHistogram {
    fn default() -> Self {
        Self {
            bucket_width: DEFAULT_BUCKET_WIDTH,
        }
    }
}

impl ChartRenderer<DurationSeries> for DurationHistogram {
    type Chart = Scene;

    fn create(&mut self, series: &DurationSeries) -> Result<Scene, ChartError> {
        let sorted = sorted_finite(&series.data);
        let cuts = PercentileCuts::from_sorted(&sorted)
            .ok_or_else(|| ChartError::Construction("no finite durations to plot".to_string()))?;
        let width = self.bucket_width.max(1);
        let w = f64::from(width);

        // ascending input makes first-seen order numeric order
        let buckets = distribution_buckets(&sorted, width);
        let mut starts: Vec<i64> = sorted.iter().map(|&v| bucket_start(v, width)).collect();
        starts.dedup();

        let (Some(&first), Some(&last)) = (starts.first(), starts.last()) else {
            return Err(ChartError::Construction("no buckets".to_string()));
        };
        let y_max = buckets.iter().map(|b| b.count).max().unwrap_or(0);
        let plot = Plot::new(first as f64, last as f64 + w, f64::from(y_max));

        let mut shapes = Vec::new();
        plot.y_ticks(&mut shapes);
        let stride = tick_stride(buckets.len());

        for (i, (start, bucket)) in starts.iter().zip(&buckets).enumerate() {
            let lo = *start as f64;
            let hi = lo + w;
            let band = cuts.band(lo);
            let x0 = plot.x(lo);
            let x1 = plot.x(hi);
            let top = plot.y(f64::from(bucket.count));
            shapes.push(Shape::Bar {
                x: x0 + 1.0,
                y: top,
                w: (x1 - x0 - 2.0).max(1.0),
                h: plot.baseline() - top,
                fill: band_color(band),
                tip: format!(
                    "{} days: {} issues, {}% at or under {} days ({})",
                    bucket.label,
                    bucket.count,
                    cumulative_percentage(&sorted, hi),
                    hi,
                    band_title(band)
                ),
            });
            if i % stride == 0 {
                shapes.push(x_tick(x0, start.to_string()));
            }
        }

        for (value, label, stroke) in [
            (cuts.median, "50%", band_color(PercentileBand::Within50th)),
            (cuts.p85, "85%", band_color(PercentileBand::From85thTo95th)),
            (cuts.p95, "95%", band_color(PercentileBand::Above95th)),
        ] {
            shapes.push(Shape::Marker {
                x: plot.x(value),
                label: format!("{label} {value:.1}d"),
                stroke,
            });
        }

        let legend = [
            PercentileBand::Within50th,
            PercentileBand::From50thTo85th,
            PercentileBand::From85thTo95th,
            PercentileBand::Above95th,
        ]
        .into_iter()
        .map(|b| (band_color(b), band_title(b).to_string()))
        .collect();

        Ok(Scene { shapes, legend })
    }

    fn destroy(&mut self, chart: Scene) {
        tracing::trace!(shapes = chart.shapes.len(), "dropping duration histogram");
    }
}

/// Weekly completed items.
#[derive(Default)]
pub struct ThroughputBars;

impl ChartRenderer<ThroughputSeries> for ThroughputBars {
    type Chart = Scene;

    fn create(&mut self, series: &ThroughputSeries) -> Result<Scene, ChartError> {
        let n = series.data.len();
        let y_max = series.data.iter().map(|p| p.count).max().unwrap_or(0);
        let plot = Plot::new(0.0, n as f64, f64::from(y_max).max(series.average));

        let mut shapes = Vec::new();
        plot.y_ticks(&mut shapes);
        let stride = tick_stride(n);

        for (i, p) in series.data.iter().enumerate() {
            let x0 = plot.x(i as f64);
            let x1 = plot.x(i as f64 + 1.0);
            let top = plot.y(f64::from(p.count));
            shapes.push(Shape::Bar {
                x: x0 + 2.0,
                y: top,
                w: (x1 - x0 - 4.0).max(1.0),
                h: plot.baseline() - top,
                fill: "#38bdf8",
                tip: format!("Week of {}: {} completed", p.period_start, p.count),
            });
            if i % stride == 0 {
                shapes.push(x_tick((x0 + x1) / 2.0, p.period_start.format("%m-%d").to_string()));
            }
        }
        shapes.push(plot.horizontal(series.average, "#f59e0b"));

        Ok(Scene {
            shapes,
            legend: vec![
                ("#38bdf8", "completed per week".to_string()),
                ("#f59e0b", format!("average {:.1}", series.average)),
            ],
        })
    }

    fn destroy(&mut self, chart: Scene) {
        tracing::trace!(shapes = chart.shapes.len(), "dropping throughput chart");
    }
}

/// Daily work-in-progress count.
#[derive(Default)]
pub struct WipLine;

impl ChartRenderer<WipSeries> for WipLine {
    type Chart = Scene;

    fn create(&mut self, series: &WipSeries) -> Result<Scene, ChartError> {
        let n = series.data.len();
        let plot = Plot::new(0.0, n.saturating_sub(1) as f64, f64::from(series.max));

        let mut shapes = Vec::new();
        plot.y_ticks(&mut shapes);
        let stride = tick_stride(n);

        for (i, p) in series.data.iter().enumerate() {
            if i % stride == 0 {
                shapes.push(x_tick(plot.x(i as f64), p.date.format("%m-%d").to_string()));
            }
        }
        shapes.push(Shape::Line {
            points: polyline(
                series
                    .data
                    .iter()
                    .enumerate()
                    .map(|(i, p)| (plot.x(i as f64), plot.y(f64::from(p.count)))),
            ),
            stroke: "#a3e635",
            dashed: false,
        });
        shapes.push(plot.horizontal(series.average, "#f59e0b"));

        Ok(Scene {
            shapes,
            legend: vec![
                ("#a3e635", "items in progress".to_string()),
                ("#f59e0b", format!("average {:.1}", series.average)),
            ],
        })
    }

    fn destroy(&mut self, chart: Scene) {
        tracing::trace!(shapes = chart.shapes.len(), "dropping wip chart");
    }
}

/// Cumulative flow diagram.
#[derive(Default)]
pub struct CfdAreas;

impl ChartRenderer<CfdSeries> for CfdAreas {
    type Chart = Scene;

    fn create(&mut self, series: &CfdSeries) -> Result<Scene, ChartError> {
        if series.statuses.is_empty() {
            return Err(ChartError::Construction("no workflow statuses to stack".to_string()));
        }
        let n = series.data.len();

        // running totals per day, stacked from the last status upwards
        let mut layers: Vec<Vec<(f64, f64)>> = Vec::with_capacity(series.statuses.len());
        let mut acc = vec![0.0_f64; n];
        for status in series.statuses.iter().rev() {
            let layer = series
                .data
                .iter()
                .zip(acc.iter_mut())
                .map(|(p, total)| {
                    let lo = *total;
                    *total += f64::from(p.count(status));
                    (lo, *total)
                })
                .collect();
            layers.push(layer);
        }
        let y_max = acc.iter().copied().fold(0.0, f64::max);
        let plot = Plot::new(0.0, n.saturating_sub(1) as f64, y_max);

        let mut shapes = Vec::new();
        plot.y_ticks(&mut shapes);

        let mut legend = Vec::with_capacity(series.statuses.len());
        for (idx, (status, layer)) in series.statuses.iter().rev().zip(&layers).enumerate() {
            let color = series_color(series.statuses.len() - 1 - idx);
            let upper = layer
                .iter()
                .enumerate()
                .map(|(i, &(_, hi))| (plot.x(i as f64), plot.y(hi)));
            let lower = layer
                .iter()
                .enumerate()
                .rev()
                .map(|(i, &(lo, _))| (plot.x(i as f64), plot.y(lo)));
            let latest = series.data.last().map(|p| p.count(status)).unwrap_or(0);
            shapes.push(Shape::Area {
                points: polyline(upper.chain(lower)),
                fill: color,
                tip: format!("{status}: {latest} now"),
            });
            legend.push((color, status.clone()));
        }
        legend.reverse();

        let stride = tick_stride(n);
        for (i, p) in series.data.iter().enumerate() {
            if i % stride == 0 {
                shapes.push(x_tick(plot.x(i as f64), p.date.format("%m-%d").to_string()));
            }
        }

        Ok(Scene { shapes, legend })
    }

    fn destroy(&mut self, chart: Scene) {
        tracing::trace!(shapes = chart.shapes.len(), "dropping cfd chart");
    }
}

/// Draw a scene into an SVG element.
pub fn render_scene(scene: &Scene) -> Element {
    let base = VIEW_H - PAD_B;
    rsx! {
        svg {
            style: "width:100%; height:auto; display:block; background:#020617; border-radius:10px; border:1px solid #1f2937;",
            view_box: "0 0 {VIEW_W} {VIEW_H}",

            line { x1: "{PAD_L}", y1: "{base}", x2: "{VIEW_W - PAD_R}", y2: "{base}",
                stroke: "#334155", "stroke-width": "1"
            }
            line { x1: "{PAD_L}", y1: "{PAD_T}", x2: "{PAD_L}", y2: "{base}",
                stroke: "#334155", "stroke-width": "1"
            }

            for shape in scene.shapes.iter() {
                {render_shape(shape)}
            }
        }
        if !scene.legend.is_empty() {
            div { style: "display:flex; flex-wrap:wrap; gap:12px; margin-top:8px; font-size:12px; color:#94a3b8;",
                for (color, label) in scene.legend.iter() {
                    div { style: "display:flex; align-items:center; gap:6px;",
                        span { style: "width:10px; height:10px; border-radius:2px; background:{color}; display:inline-block;" }
                        "{label}"
                    }
                }
            }
        }
    }
}

fn render_shape(shape: &Shape) -> Element {
    match shape {
        Shape::Bar { x, y, w, h, fill, tip } => rsx! {
            rect { x: "{x:.2}", y: "{y:.2}", width: "{w:.2}", height: "{h:.2}", fill: "{fill}", "rx": "2",
                title { "{tip}" }
            }
        },
        Shape::Line { points, stroke, dashed } => rsx! {
            polyline {
                points: "{points}",
                fill: "none",
                stroke: "{stroke}",
                "stroke-width": "2",
                "stroke-dasharray": if *dashed { "6 4" } else { "none" },
                "stroke-linejoin": "round",
                "stroke-linecap": "round",
            }
        },
        Shape::Area { points, fill, tip } => rsx! {
            polygon { points: "{points}", fill: "{fill}", "fill-opacity": "0.75", stroke: "{fill}", "stroke-width": "1",
                title { "{tip}" }
            }
        },
        Shape::Marker { x, label, stroke } => rsx! {
            line { x1: "{x:.2}", y1: "{PAD_T}", x2: "{x:.2}", y2: "{VIEW_H - PAD_B}",
                stroke: "{stroke}", "stroke-width": "1.5", "stroke-dasharray": "4 3"
            }
            text { x: "{x + 4.0:.2}", y: "{PAD_T + 10.0}", fill: "{stroke}", "font-size": "11", "{label}" }
        },
        Shape::Tick { x, y, anchor, text } => rsx! {
            text { x: "{x:.2}", y: "{y:.2}", fill: "#94a3b8", "font-size": "11", "text-anchor": "{anchor}", "{text}" }
        },
    }
}

fn stat(label: &str, value: String) -> Element {
    rsx! {
        div { style: "display:flex; flex-direction:column; gap:2px; min-width:80px;",
            div { style: "color:#64748b; font-size:11px;", "{label}" }
            div { style: "font-size:15px;", "{value}" }
        }
    }
}

pub fn duration_summary(series: &DurationSeries) -> Element {
    let days = |v: f64| format!("{v:.1} d");
    rsx! {
        {stat("Items", series.data.len().to_string())}
        {stat("Average", days(series.average))}
        {stat("Median", days(series.median))}
        {stat("85th", days(series.p85))}
        {stat("95th", days(series.p95))}
        {stat("Min", days(series.min))}
        {stat("Max", days(series.max))}
    }
}

pub fn throughput_summary(series: &ThroughputSeries) -> Element {
    let total: u32 = series.data.iter().map(|p| p.count).sum();
    rsx! {
        {stat("Weeks", series.data.len().to_string())}
        {stat("Completed", total.to_string())}
        {stat("Avg / week", format!("{:.1}", series.average))}
    }
}

pub fn wip_summary(series: &WipSeries) -> Element {
    let current = series.data.last().map(|p| p.count).unwrap_or(0);
    rsx! {
        {stat("Current", current.to_string())}
        {stat("Average", format!("{:.1}", series.average))}
        {stat("Max", series.max.to_string())}
    }
}

pub fn cfd_summary(series: &CfdSeries) -> Element {
    let latest = series.data.last();
    rsx! {
        for status in series.statuses.iter() {
            {stat(status, latest.map(|p| p.count(status)).unwrap_or(0).to_string())}
        }
    }
}
