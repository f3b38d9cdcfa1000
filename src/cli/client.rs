use anyhow::{bail, Context};
use reqwest::RequestBuilder;
use serde_json::Value;
use std::time::Duration;

/// Thin JSON client for the Workforce API. Unwraps the success envelope and
/// turns error envelopes into `anyhow` errors.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

pub fn api_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            token,
        })
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> anyhow::Result<Value> {
        let request = self.http.get(api_url(&self.base_url, path)).query(query);
        self.send(request).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> anyhow::Result<Value> {
        let request = self.http.post(api_url(&self.base_url, path)).json(body);
        self.send(request).await
    }

    async fn send(&self, request: RequestBuilder) -> anyhow::Result<Value> {
        let Some(token) = &self.token else {
            bail!("no token: pass --token or set WORKFORCE_TOKEN (see `workforce token`)");
        };

        let response = request
            .bearer_auth(token)
            .send()
            .await
            .with_context(|| format!("could not reach {}", self.base_url))?;

        let status = response.status();
        let body: Value = response.json().await.context("server returned invalid JSON")?;

        if !status.is_success() {
            let message = body.get("message").and_then(Value::as_str).unwrap_or("request failed");
            let code = body.get("code").and_then(Value::as_str).unwrap_or("UNKNOWN");
            bail!("{} ({} {})", message, status.as_u16(), code);
        }

        Ok(body.get("data").cloned().unwrap_or(Value::Null))
    }
}
