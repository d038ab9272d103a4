// frontend/src/api.rs
//
// JSON helpers for the backend REST API. The browser build talks to the page
// origin through gloo-net; the desktop build uses reqwest against CT_API_BASE.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_API_BASE: &str = "http://localhost:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Put,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| format!("HTTP {status}"))
}

#[cfg(target_arch = "wasm32")]
fn api_base() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

#[cfg(not(target_arch = "wasm32"))]
fn api_base() -> String {
    std::env::var("CT_API_BASE")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

pub fn url(path: &str) -> String {
    format!("{}{}", api_base().trim_end_matches('/'), path)
}

#[cfg(target_arch = "wasm32")]
pub async fn get_json<T: DeserializeOwned>(path: &str) -> Result<T, String> {
    use gloo_net::http::Request;

    let resp = Request::get(&url(path))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.ok() {
        let body = resp.text().await.unwrap_or_default();
        return Err(error_message(resp.status(), &body));
    }
    resp.json::<T>().await.map_err(|e| e.to_string())
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn get_json<T: DeserializeOwned>(path: &str) -> Result<T, String> {
    let resp = reqwest::get(url(path)).await.map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(error_message(status, &body));
    }
    resp.json::<T>().await.map_err(|e| e.to_string())
}

#[cfg(target_arch = "wasm32")]
pub async fn send_json<B: Serialize, T: DeserializeOwned>(
    method: Method,
    path: &str,
    body: &B,
) -> Result<T, String> {
    use gloo_net::http::Request;

    let target = url(path);
    let builder = match method {
        Method::Post => Request::post(&target),
        Method::Put => Request::put(&target),
    };
    let resp = builder
        .json(body)
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.ok() {
        let text = resp.text().await.unwrap_or_default();
        return Err(error_message(resp.status(), &text));
    }
    resp.json::<T>().await.map_err(|e| e.to_string())
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn send_json<B: Serialize, T: DeserializeOwned>(
    method: Method,
    path: &str,
    body: &B,
) -> Result<T, String> {
    let client = reqwest::Client::new();
    let target = url(path);
    let builder = match method {
        Method::Post => client.post(target),
        Method::Put => client.put(target),
    };
    let resp = builder.json(body).send().await.map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();
        return Err(error_message(status, &text));
    }
    resp.json::<T>().await.map_err(|e| e.to_string())
}

#[cfg(target_arch = "wasm32")]
pub async fn delete(path: &str) -> Result<(), String> {
    use gloo_net::http::Request;

    let resp = Request::delete(&url(path))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.ok() {
        let text = resp.text().await.unwrap_or_default();
        return Err(error_message(resp.status(), &text));
    }
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn delete(path: &str) -> Result<(), String> {
    let resp = reqwest::Client::new()
        .delete(url(path))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();
        return Err(error_message(status, &text));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_is_preferred_over_status() {
        assert_eq!(error_message(400, r#"{"error":"Project is required"}"#), "Project is required");
        assert_eq!(error_message(502, "<html>bad gateway</html>"), "HTTP 502");
    }
}
