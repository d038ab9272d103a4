// shared/src/chart.rs
//
// Lifecycle of a single chart instance bound to a reactive data source.
//
//  - At most one live chart per lifecycle; it is always destroyed before a
//    replacement is created.
//  - Loading, absent, errored and empty data never create a chart.
//  - Teardown (explicit or on drop) destroys whatever is still live.
//
// The UI layer owns one `ChartLifecycle` per mounted chart card and calls
// `sync` on every render; the renderer decides what a "chart" actually is.

use std::rc::Rc;
use thiserror::Error;

/// Message shown for absent, errored and empty data alike.
pub const PLACEHOLDER_MESSAGE: &str = "No data available for the selected range.";

/// Payloads a chart can be built from.
pub trait ChartData {
    /// Backend-reported failure carried inside the payload.
    fn error(&self) -> Option<&str> {
        None
    }

    /// Length of the primary observation array. Zero counts as no data.
    fn primary_len(&self) -> usize;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("chart construction failed: {0}")]
    Construction(String),
}

/// Builds and releases chart instances for one kind of payload.
pub trait ChartRenderer<T> {
    type Chart;

    fn create(&mut self, data: &T) -> Result<Self::Chart, ChartError>;

    fn destroy(&mut self, chart: Self::Chart);
}

/// Either a fixed value or a zero-argument provider of the current value.
pub enum DataSource<T> {
    Value(Option<Rc<T>>),
    Accessor(Rc<dyn Fn() -> Option<Rc<T>>>),
}

impl<T> DataSource<T> {
    pub fn accessor(f: impl Fn() -> Option<Rc<T>> + 'static) -> Self {
        DataSource::Accessor(Rc::new(f))
    }

    pub fn current(&self) -> Option<Rc<T>> {
        match self {
            DataSource::Value(v) => v.clone(),
            DataSource::Accessor(f) => f(),
        }
    }
}

impl<T> Clone for DataSource<T> {
    fn clone(&self) -> Self {
        match self {
            DataSource::Value(v) => DataSource::Value(v.clone()),
            DataSource::Accessor(f) => DataSource::Accessor(f.clone()),
        }
    }
}

impl<T> From<Option<Rc<T>>> for DataSource<T> {
    fn from(value: Option<Rc<T>>) -> Self {
        DataSource::Value(value)
    }
}

/// Loading flag, fixed or read through a provider.
#[derive(Clone)]
pub enum Flag {
    Value(bool),
    Accessor(Rc<dyn Fn() -> bool>),
}

impl Flag {
    pub fn accessor(f: impl Fn() -> bool + 'static) -> Self {
        Flag::Accessor(Rc::new(f))
    }

    pub fn current(&self) -> bool {
        match self {
            Flag::Value(v) => *v,
            Flag::Accessor(f) => f(),
        }
    }
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        Flag::Value(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartPhase {
    Loading,
    /// No data, errored data, empty data, or a failed construction.
    Unavailable,
    Ready,
}

struct LiveChart<T, C> {
    source: Rc<T>,
    chart: C,
}

pub struct ChartLifecycle<T, R: ChartRenderer<T>> {
    renderer: R,
    live: Option<LiveChart<T, R::Chart>>,
    is_error: Option<Box<dyn Fn(&T) -> bool>>,
    phase: ChartPhase,
    // identity of data whose construction failed; not retried until it changes
    failed_source: Option<Rc<T>>,
    last_error: Option<ChartError>,
}

impl<T: ChartData, R: ChartRenderer<T>> ChartLifecycle<T, R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            live: None,
            is_error: None,
            phase: ChartPhase::Loading,
            failed_source: None,
            last_error: None,
        }
    }

    /// Extra predicate marking payloads as errored, on top of `ChartData::error`.
    pub fn with_error_predicate(mut self, is_error: impl Fn(&T) -> bool + 'static) -> Self {
        self.is_error = Some(Box::new(is_error));
        self
    }

    pub fn phase(&self) -> ChartPhase {
        self.phase
    }

    pub fn chart(&self) -> Option<&R::Chart> {
        self.live.as_ref().map(|l| &l.chart)
    }

    /// Data the live chart was built from.
    pub fn source(&self) -> Option<&Rc<T>> {
        self.live.as_ref().map(|l| &l.source)
    }

    pub fn last_error(&self) -> Option<&ChartError> {
        self.last_error.as_ref()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    fn usable(&self, data: &T) -> bool {
        if data.error().is_some() {
            return false;
        }
        if let Some(pred) = &self.is_error
            && pred(data)
        {
            return false;
        }
        data.primary_len() > 0
    }

    /// Bring the live chart in line with `(loading, data)` and report the phase.
    pub fn sync(&mut self, loading: bool, data: Option<Rc<T>>) -> ChartPhase {
        if loading {
            self.release();
            self.phase = ChartPhase::Loading;
            return self.phase;
        }

        let Some(data) = data.filter(|d| self.usable(d)) else {
            self.release();
            self.failed_source = None;
            self.phase = ChartPhase::Unavailable;
            return self.phase;
        };

        if let Some(live) = &self.live
            && Rc::ptr_eq(&live.source, &data)
        {
            self.phase = ChartPhase::Ready;
            return self.phase;
        }

        if let Some(failed) = &self.failed_source
            && Rc::ptr_eq(failed, &data)
        {
            self.phase = ChartPhase::Unavailable;
            return self.phase;
        }

        self.release();
        match self.renderer.create(&data) {
            Ok(chart) => {
                self.live = Some(LiveChart {
                    source: data,
                    chart,
                });
                self.failed_source = None;
                self.last_error = None;
                self.phase = ChartPhase::Ready;
            }
            Err(err) => {
                tracing::warn!("{err}");
                self.failed_source = Some(data);
                self.last_error = Some(err);
                self.phase = ChartPhase::Unavailable;
            }
        }
        self.phase
    }

    /// Same as `sync`, reading both inputs from their sources.
    pub fn sync_from(&mut self, loading: &Flag, data: &DataSource<T>) -> ChartPhase {
        let loading = loading.current();
        let data = if loading { None } else { data.current() };
        self.sync(loading, data)
    }

    /// Destroy the live chart, if any.
    pub fn teardown(&mut self) {
        self.release();
        self.failed_source = None;
    }

    fn release(&mut self) {
        if let Some(live) = self.live.take() {
            self.renderer.destroy(live.chart);
        }
    }
}

impl<T, R: ChartRenderer<T>> Drop for ChartLifecycle<T, R> {
    fn drop(&mut self) {
        if let Some(live) = self.live.take() {
            self.renderer.destroy(live.chart);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Points(Vec<f64>, Option<String>);

    impl ChartData for Points {
        fn error(&self) -> Option<&str> {
            self.1.as_deref()
        }

        fn primary_len(&self) -> usize {
            self.0.len()
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Create(u32),
        Destroy(u32),
    }

    #[derive(Clone, Default)]
    struct Recorder {
        events: Rc<RefCell<Vec<Event>>>,
        next: u32,
        fail: bool,
    }

    impl Recorder {
        fn creates(&self) -> usize {
            self.events.borrow().iter().filter(|e| matches!(e, Event::Create(_))).count()
        }

        fn destroys(&self) -> usize {
            self.events.borrow().iter().filter(|e| matches!(e, Event::Destroy(_))).count()
        }
    }

    impl ChartRenderer<Points> for Recorder {
        type Chart = u32;

        fn create(&mut self, _data: &Points) -> Result<u32, ChartError> {
            if self.fail {
                return Err(ChartError::Construction("canvas unavailable".into()));
            }
            self.next += 1;
            self.events.borrow_mut().push(Event::Create(self.next));
            Ok(self.next)
        }

        fn destroy(&mut self, chart: u32) {
            self.events.borrow_mut().push(Event::Destroy(chart));
        }
    }

    fn ready(values: &[f64]) -> Option<Rc<Points>> {
        Some(Rc::new(Points(values.to_vec(), None)))
    }

    #[test]
    fn loading_never_creates() {
        let rec = Recorder::default();
        let mut lc = ChartLifecycle::new(rec.clone());
        assert_eq!(lc.sync(true, ready(&[1.0, 2.0])), ChartPhase::Loading);
        assert_eq!(lc.sync(true, None), ChartPhase::Loading);
        assert_eq!(rec.creates(), 0);
    }

    #[test]
    fn empty_absent_and_errored_data_are_unavailable() {
        let rec = Recorder::default();
        let mut lc = ChartLifecycle::new(rec.clone());
        assert_eq!(lc.sync(false, None), ChartPhase::Unavailable);
        assert_eq!(lc.sync(false, ready(&[])), ChartPhase::Unavailable);
        let errored = Some(Rc::new(Points(vec![1.0], Some("boom".into()))));
        assert_eq!(lc.sync(false, errored), ChartPhase::Unavailable);
        assert_eq!(rec.creates(), 0);
    }

    #[test]
    fn same_data_identity_creates_once() {
        let rec = Recorder::default();
        let mut lc = ChartLifecycle::new(rec.clone());
        let data = ready(&[3.0]);
        for _ in 0..4 {
            assert_eq!(lc.sync(false, data.clone()), ChartPhase::Ready);
        }
        assert_eq!(rec.creates(), 1);
        assert_eq!(rec.destroys(), 0);
    }

    #[test]
    fn new_data_destroys_before_create() {
        let rec = Recorder::default();
        let mut lc = ChartLifecycle::new(rec.clone());
        lc.sync(false, ready(&[1.0]));
        lc.sync(false, ready(&[1.0]));
        assert_eq!(
            *rec.events.borrow(),
            vec![Event::Create(1), Event::Destroy(1), Event::Create(2)]
        );
        assert_eq!(lc.chart(), Some(&2));
    }

    #[test]
    fn ready_empty_ready_then_unmount_balances() {
        let rec = Recorder::default();
        {
            let mut lc = ChartLifecycle::new(rec.clone());
            lc.sync(false, ready(&[1.0]));
            lc.sync(false, ready(&[]));
            lc.sync(true, None);
            lc.sync(false, ready(&[2.0, 4.0]));
            assert!(rec.destroys() + 1 >= rec.creates());
        }
        assert_eq!(rec.creates(), 2);
        assert_eq!(rec.destroys(), rec.creates());
    }

    #[test]
    fn explicit_teardown_releases_chart() {
        let rec = Recorder::default();
        let mut lc = ChartLifecycle::new(rec.clone());
        lc.sync(false, ready(&[1.0]));
        lc.teardown();
        assert!(lc.chart().is_none());
        drop(lc);
        assert_eq!(rec.destroys(), 1);
    }

    #[test]
    fn custom_error_predicate_blocks_creation() {
        let rec = Recorder::default();
        let mut lc = ChartLifecycle::new(rec.clone()).with_error_predicate(|p: &Points| p.0.iter().any(|v| *v < 0.0));
        assert_eq!(lc.sync(false, ready(&[-1.0])), ChartPhase::Unavailable);
        assert_eq!(lc.sync(false, ready(&[1.0])), ChartPhase::Ready);
        assert_eq!(rec.creates(), 1);
    }

    #[test]
    fn construction_failure_is_unavailable_and_not_retried_for_same_data() {
        let rec = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let mut lc = ChartLifecycle::new(rec);
        let data = ready(&[1.0]);
        assert_eq!(lc.sync(false, data.clone()), ChartPhase::Unavailable);
        assert!(matches!(lc.last_error(), Some(ChartError::Construction(_))));
        assert_eq!(lc.sync(false, data), ChartPhase::Unavailable);
        assert!(lc.chart().is_none());
    }

    #[test]
    fn accessor_and_value_sources_behave_alike() {
        let cell: Rc<RefCell<Option<Rc<Points>>>> = Rc::new(RefCell::new(None));
        let loading = Rc::new(RefCell::new(true));

        let source = {
            let cell = cell.clone();
            DataSource::accessor(move || cell.borrow().clone())
        };
        let flag = {
            let loading = loading.clone();
            Flag::accessor(move || *loading.borrow())
        };

        let rec = Recorder::default();
        let mut lc = ChartLifecycle::new(rec.clone());
        assert_eq!(lc.sync_from(&flag, &source), ChartPhase::Loading);

        *cell.borrow_mut() = ready(&[1.0, 2.0]);
        *loading.borrow_mut() = false;
        assert_eq!(lc.sync_from(&flag, &source), ChartPhase::Ready);

        let fixed: DataSource<Points> = cell.borrow().clone().into();
        assert_eq!(lc.sync_from(&Flag::from(false), &fixed), ChartPhase::Ready);
        assert_eq!(rec.creates(), 1);
    }
}
