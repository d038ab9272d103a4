// backend/src/tracker.rs
//
// Issue tracker REST client (Jira-compatible API v2):
//   GET /rest/api/2/myself   -> credential check
//   GET /rest/api/2/project  -> project picker
//   GET /rest/api/2/search   -> issues + status changelog, paged

use crate::analytics::{IssueHistory, StatusTransition};
use chrono::{DateTime, FixedOffset, Utc};
use cycletime_shared::{Credentials, Project};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;

const PAGE_SIZE: u32 = 100;
// upper bound on pages fetched for one project
const MAX_PAGES: u32 = 200;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("invalid tracker URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("tracker request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("tracker rejected the credentials")]
    Unauthorized,
    #[error("tracker returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("unexpected tracker response: {0}")]
    Parse(String),
}

pub struct TrackerClient<'a> {
    http: &'a Client,
    credentials: &'a Credentials,
}

impl<'a> TrackerClient<'a> {
    pub fn new(http: &'a Client, credentials: &'a Credentials) -> Self {
        Self { http, credentials }
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, TrackerError> {
        let raw = format!("{}{}", self.credentials.base(), path);
        Ok(Url::parse_with_params(&raw, params)?)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: Url) -> Result<T, TrackerError> {
        tracing::debug!(%url, "tracker request");
        let resp = self
            .http
            .get(url.clone())
            .basic_auth(
                self.credentials.email.trim(),
                Some(self.credentials.api_token.trim()),
            )
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        match resp.status() {
            s if s.is_success() => Ok(resp.json::<T>().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(TrackerError::Unauthorized),
            s => Err(TrackerError::Status {
                status: s.as_u16(),
                url: url.to_string(),
            }),
        }
    }

    /// Ok(display name) when the credentials are accepted.
    pub async fn validate_credentials(&self) -> Result<String, TrackerError> {
        let me: Myself = self.get_json(self.url("/rest/api/2/myself", &[])?).await?;
        Ok(me.display_name.unwrap_or(me.email_address.unwrap_or_default()))
    }

    pub async fn projects(&self) -> Result<Vec<Project>, TrackerError> {
        let raw: Vec<RawProject> = self.get_json(self.url("/rest/api/2/project", &[])?).await?;
        let mut projects: Vec<Project> = raw
            .into_iter()
            .map(|p| Project {
                id: p.id,
                key: p.key,
                name: p.name,
            })
            .collect();
        projects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(projects)
    }

    pub async fn issue_histories(&self, project_key: &str) -> Result<Vec<IssueHistory>, TrackerError> {
        let jql = format!("project = \"{}\" ORDER BY created ASC", project_key.replace('"', ""));
        let mut out = Vec::new();
        let mut start_at = 0u32;
        let mut total = 0u32;
        let mut complete = false;

        for _ in 0..MAX_PAGES {
            let url = self.url(
                "/rest/api/2/search",
                &[
                    ("jql", jql.clone()),
                    ("expand", "changelog".to_string()),
                    ("fields", "created,status".to_string()),
                    ("startAt", start_at.to_string()),
                    ("maxResults", PAGE_SIZE.to_string()),
                ],
            )?;
            let page: SearchPage = self.get_json(url).await?;
            let fetched = page.issues.len() as u32;
            total = page.total;
            for raw in page.issues {
                out.push(raw.into_history()?);
            }

            start_at += fetched;
            if paging_done(start_at, fetched, page.total) {
                complete = true;
                break;
            }
        }

        if !complete {
            tracing::warn!(
                project = project_key,
                fetched = start_at,
                total,
                "stopped after {MAX_PAGES} pages; metrics cover a partial history"
            );
        }

        tracing::info!(project = project_key, issues = out.len(), "fetched issue histories");
        Ok(out)
    }
}

/// An empty page or a cursor past `total` ends the search.
fn paging_done(start_at: u32, fetched: u32, total: u32) -> bool {
    fetched == 0 || start_at >= total
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Myself {
    display_name: Option<String>,
    email_address: Option<String>,
}

#[derive(Deserialize)]
struct RawProject {
    id: String,
    key: String,
    name: String,
}

#[derive(Deserialize)]
struct SearchPage {
    #[serde(default)]
    total: u32,
    #[serde(default)]
    issues: Vec<RawIssue>,
}

#[derive(Deserialize)]
struct RawIssue {
    key: String,
    fields: RawFields,
    #[serde(default)]
    changelog: Option<RawChangelog>,
}

#[derive(Deserialize)]
struct RawFields {
    created: String,
    status: Option<RawStatus>,
}

#[derive(Deserialize)]
struct RawStatus {
    name: String,
}

#[derive(Deserialize)]
struct RawChangelog {
    #[serde(default)]
    histories: Vec<RawHistory>,
}

#[derive(Deserialize)]
struct RawHistory {
    created: String,
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Deserialize)]
struct RawItem {
    field: String,
    #[serde(rename = "fromString")]
    from_status: Option<String>,
    #[serde(rename = "toString")]
    to_status: Option<String>,
}

impl RawIssue {
    fn into_history(self) -> Result<IssueHistory, TrackerError> {
        let created = parse_timestamp(&self.fields.created)?;
        let current = self.fields.status.map(|s| s.name).unwrap_or_default();

        let mut transitions = Vec::new();
        for h in self.changelog.map(|c| c.histories).unwrap_or_default() {
            let at = parse_timestamp(&h.created)?;
            for item in h.items.into_iter().filter(|i| i.field == "status") {
                transitions.push(StatusTransition {
                    at,
                    from: item.from_status.unwrap_or_default(),
                    to: item.to_status.unwrap_or_default(),
                });
            }
        }
        // changelogs come newest first
        transitions.sort_by_key(|t| t.at);

        let initial_status = transitions
            .first()
            .map(|t| t.from.clone())
            .unwrap_or(current);

        Ok(IssueHistory {
            key: self.key,
            created,
            initial_status,
            transitions,
        })
    }
}

/// Tracker timestamps look like `2024-01-02T10:00:00.000+0000`.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TrackerError> {
    DateTime::<FixedOffset>::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TrackerError::Parse(format!("bad timestamp {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const PAGE: &str = r#"{
        "startAt": 0,
        "maxResults": 100,
        "total": 2,
        "issues": [
            {
                "key": "ABC-1",
                "fields": { "created": "2024-01-01T09:00:00.000+0000", "status": { "name": "Done" } },
                "changelog": { "histories": [
                    { "created": "2024-01-04T10:00:00.000+0000",
                      "items": [ { "field": "status", "fromString": "In Progress", "toString": "Done" } ] },
                    { "created": "2024-01-02T10:00:00.000+0100",
                      "items": [
                        { "field": "assignee", "fromString": null, "toString": "dev" },
                        { "field": "status", "fromString": "To Do", "toString": "In Progress" }
                      ] }
                ] }
            },
            {
                "key": "ABC-2",
                "fields": { "created": "2024-01-03T09:00:00.000+0000", "status": { "name": "To Do" } }
            }
        ]
    }"#;

    #[test]
    fn search_page_maps_to_histories() {
        let page: SearchPage = serde_json::from_str(PAGE).unwrap();
        assert_eq!(page.total, 2);
        let histories: Vec<IssueHistory> = page
            .issues
            .into_iter()
            .map(|i| i.into_history().unwrap())
            .collect();

        let first = &histories[0];
        assert_eq!(first.initial_status, "To Do");
        assert_eq!(first.transitions.len(), 2);
        assert_eq!(first.transitions[0].to, "In Progress");
        assert_eq!(
            first.transitions[0].at,
            Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap()
        );

        let second = &histories[1];
        assert!(second.transitions.is_empty());
        assert_eq!(second.initial_status, "To Do");
    }

    #[test]
    fn timestamps_accept_both_offset_styles() {
        let a = parse_timestamp("2024-05-01T12:30:00.000+0000").unwrap();
        let b = parse_timestamp("2024-05-01T12:30:00Z").unwrap();
        assert_eq!(a, b);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn paging_stops_on_empty_page_or_total() {
        assert!(!paging_done(100, 100, 250));
        assert!(paging_done(250, 50, 250));
        assert!(paging_done(100, 0, 250));
    }

    // Serves one issue per page and always claims more are left.
    async fn endless_tracker() -> String {
        use axum::{Json, Router, routing::get};

        let app = Router::new().route(
            "/rest/api/2/search",
            get(|| async {
                Json(serde_json::json!({
                    "total": 1_000_000,
                    "issues": [{
                        "key": "ABC-1",
                        "fields": {
                            "created": "2024-01-01T09:00:00.000+0000",
                            "status": { "name": "To Do" }
                        }
                    }]
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn page_cap_returns_partial_history() {
        let creds = Credentials {
            base_url: endless_tracker().await,
            email: "dev@example.com".to_string(),
            api_token: "t".to_string(),
        };
        let http = Client::new();
        let issues = TrackerClient::new(&http, &creds)
            .issue_histories("ABC")
            .await
            .unwrap();
        assert_eq!(issues.len(), MAX_PAGES as usize);
    }
}
