use serde::{Deserialize, Serialize};

use crate::workflow::WorkflowState;

/// Connection details for the issue tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), String> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err("Tracker URL must start with http:// or https://".to_string());
        }
        if url.trim_start_matches("https://").trim_start_matches("http://").is_empty() {
            return Err("Missing host in tracker URL".to_string());
        }
        if self.email.trim().is_empty() {
            return Err("Email is required".to_string());
        }
        if self.api_token.trim().is_empty() {
            return Err("API token is required".to_string());
        }
        Ok(())
    }

    /// Base URL without trailing slashes.
    pub fn base(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewConfiguration {
    pub name: String,
    pub credentials: Credentials,
    pub project_key: String,
    pub workflow: Vec<WorkflowState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub id: i64,
    pub name: String,
    pub credentials: Credentials,
    pub project_key: String,
    pub workflow: Vec<WorkflowState>,
}

impl Configuration {
    pub fn to_new(&self) -> NewConfiguration {
        NewConfiguration {
            name: self.name.clone(),
            credentials: self.credentials.clone(),
            project_key: self.project_key.clone(),
            workflow: self.workflow.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: String,
}

/// Which analytics series an endpoint returns; doubles as the URL segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    LeadTime,
    CycleTime,
    Throughput,
    Wip,
    Cfd,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::LeadTime,
        MetricKind::CycleTime,
        MetricKind::Throughput,
        MetricKind::Wip,
        MetricKind::Cfd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::LeadTime => "lead-time",
            MetricKind::CycleTime => "cycle-time",
            MetricKind::Throughput => "throughput",
            MetricKind::Wip => "wip",
            MetricKind::Cfd => "cfd",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            MetricKind::LeadTime => "Lead Time",
            MetricKind::CycleTime => "Cycle Time",
            MetricKind::Throughput => "Throughput",
            MetricKind::Wip => "Work in Progress",
            MetricKind::Cfd => "Cumulative Flow",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(url: &str) -> Credentials {
        Credentials {
            base_url: url.to_string(),
            email: "dev@example.com".to_string(),
            api_token: "token".to_string(),
        }
    }

    #[test]
    fn credential_checks() {
        assert!(creds("https://example.atlassian.net/").validate().is_ok());
        assert!(creds("example.atlassian.net").validate().is_err());
        assert!(creds("https://").validate().is_err());
        let mut c = creds("https://x.net");
        c.api_token = "  ".into();
        assert_eq!(c.validate(), Err("API token is required".to_string()));
    }

    #[test]
    fn base_trims_trailing_slash() {
        assert_eq!(creds(" https://x.net// ").base(), "https://x.net");
    }

    #[test]
    fn metric_kind_url_segments() {
        for kind in MetricKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
