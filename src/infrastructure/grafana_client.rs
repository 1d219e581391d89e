// Grafana HTTP API implementation of the dashboard store
use crate::application::dashboard_store::{DashboardStore, SaveOutcome};
use crate::domain::dashboard::{Dashboard, DashboardSummary, Org};
use crate::domain::error::{DashboardError, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GrafanaClient {
    http: reqwest::Client,
    base_url: String,
    main_org_token: String,
    temp_org_token: String,
}

/// `GET /api/dashboards/uid/:uid` body.
#[derive(Debug, Deserialize)]
struct DashboardEnvelope {
    dashboard: Dashboard,
}

/// `POST /api/dashboards/db` body.
#[derive(Debug, Serialize)]
struct SaveRequest<'a> {
    dashboard: &'a Dashboard,
    overwrite: bool,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    uid: String,
    title: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

impl GrafanaClient {
    pub fn new(
        base_url: String,
        main_org_token: String,
        temp_org_token: String,
        timeout: Duration,
        accept_invalid_certs: bool,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            main_org_token,
            temp_org_token,
        })
    }

    fn token(&self, org: Org) -> &str {
        match org {
            Org::Temp => &self.temp_org_token,
            Org::Main => &self.main_org_token,
        }
    }

    fn dashboard_url(&self, uid: &str) -> String {
        format!("{}/api/dashboards/uid/{}", self.base_url, urlencoding::encode(uid))
    }

    fn authorized(&self, org: Org, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", self.token(org)))
            .header("Accept", "application/json")
    }

    async fn send(&self, org: Org, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = self
            .authorized(org, request)
            .send()
            .await
            .map_err(|e| DashboardError::Transport(format!("{}: {}", what, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(org = %org, status = %status, what, "Grafana request failed");
        match status {
            StatusCode::NOT_FOUND => return Err(DashboardError::NotFound(what.to_string())),
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
                return Err(DashboardError::Conflict(format!("{}: {}", what, body)));
            }
            _ => {}
        }
        Err(DashboardError::Transport(format!(
            "{} failed with status {}: {}",
            what, status, body
        )))
    }
}

#[async_trait]
impl DashboardStore for GrafanaClient {
    async fn get_by_uid(&self, org: Org, uid: &str) -> Result<Dashboard> {
        let what = format!("dashboard {}", uid);
        let response = self.send(org, self.http.get(self.dashboard_url(uid)), &what).await?;
        let envelope = response
            .json::<DashboardEnvelope>()
            .await
            .map_err(|e| DashboardError::Transport(format!("malformed {}: {}", what, e)))?;

        tracing::debug!(org = %org, uid, panels = envelope.dashboard.panels.len(), "Fetched dashboard");
        Ok(envelope.dashboard)
    }

    async fn list_all(&self, org: Org) -> Result<Vec<DashboardSummary>> {
        let url = format!("{}/api/search?type=dash-db&limit=5000", self.base_url);
        let response = self.send(org, self.http.get(url), "dashboard search").await?;
        let hits = response
            .json::<Vec<SearchHit>>()
            .await
            .map_err(|e| DashboardError::Transport(format!("malformed search result: {}", e)))?;

        Ok(hits
            .into_iter()
            .filter(|hit| hit.kind.as_deref().is_none_or(|k| k == "dash-db"))
            .map(|hit| DashboardSummary {
                uid: hit.uid,
                title: hit.title,
            })
            .collect())
    }

    async fn put(&self, org: Org, dashboard: &Dashboard, overwrite: bool) -> Result<SaveOutcome> {
        let url = format!("{}/api/dashboards/db", self.base_url);
        let what = format!("save dashboard {:?}", dashboard.title);
        let request = self.http.post(url).json(&SaveRequest {
            dashboard,
            overwrite,
        });

        let outcome = self
            .send(org, request, &what)
            .await?
            .json::<SaveOutcome>()
            .await
            .map_err(|e| DashboardError::Transport(format!("malformed save response: {}", e)))?;

        tracing::debug!(org = %org, uid = %outcome.uid, version = outcome.version, overwrite, "Saved dashboard");
        Ok(outcome)
    }

    async fn delete(&self, org: Org, uid: &str) -> Result<()> {
        let what = format!("dashboard {}", uid);
        self.send(org, self.http.delete(self.dashboard_url(uid)), &what)
            .await?;
        tracing::debug!(org = %org, uid, "Deleted dashboard");
        Ok(())
    }
}
