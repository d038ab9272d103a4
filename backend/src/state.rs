use crate::settings::Settings;
use crate::store::ConfigStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Saved tracker configurations
    pub store: ConfigStore,

    /// Shared HTTP client for tracker calls
    pub http: reqwest::Client,

    pub settings: Arc<Settings>,
}
