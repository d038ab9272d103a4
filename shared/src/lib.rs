//! Types and pure logic shared by the analyzer server and the dashboard UI.

pub mod chart;
pub mod config;
pub mod notify;
pub mod series;
pub mod stats;
pub mod workflow;

pub use chart::{ChartData, ChartError, ChartLifecycle, ChartPhase, ChartRenderer, DataSource, Flag};
pub use config::{Configuration, Credentials, MetricKind, NewConfiguration, Project, ValidationResult};
pub use notify::{Notification, NotificationCenter, NotificationId, NotificationKind};
pub use series::{CfdPoint, CfdSeries, DurationSeries, ThroughputPoint, ThroughputSeries, WipPoint, WipSeries};
pub use stats::{Bucket, PercentileBand, PercentileCuts, Summary};
pub use workflow::{Workflow, WorkflowError, WorkflowState};
