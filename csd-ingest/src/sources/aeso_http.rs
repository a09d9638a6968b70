use reqwest::Client;
use serde_json::Value;

use crate::{
    config::AppConfig,
    pipeline::{PipelineError, Report, Source},
};

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Fetches CSD reports from the operator's report API.
///
/// No retry and no timeout: a slow endpoint blocks the run, a failing one ends it.
pub struct AesoReportSource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AesoReportSource {
    pub fn new(cfg: &AppConfig) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .build()
            .map_err(|e| PipelineError::Source(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: cfg.api_base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
        })
    }

    pub fn url(&self, report: Report) -> String {
        format!("{}{}", self.base_url, report.path())
    }
}

#[async_trait::async_trait]
impl Source for AesoReportSource {
    async fn fetch(&self, report: Report) -> Result<Value, PipelineError> {
        let url = self.url(report);
        tracing::debug!(%report, %url, "requesting report");

        let resp = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| {
                metrics::counter!("csd_fetch_errors_total", "report" => report.to_string()).increment(1);
                PipelineError::Source(format!("GET {url} failed: {e}"))
            })?;

        let status = resp.status();
        if !status.is_success() {
            metrics::counter!("csd_fetch_errors_total", "report" => report.to_string()).increment(1);
            return Err(PipelineError::Source(format!("GET {url} returned {status}")));
        }

        let body = resp
            .json::<Value>()
            .await
            .map_err(|e| PipelineError::Source(format!("{report} report is not valid JSON: {e}")))?;

        tracing::info!(%report, %url, status = status.as_u16(), "report fetched");
        Ok(body)
    }
}
