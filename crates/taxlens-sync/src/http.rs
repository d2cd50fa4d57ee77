//! HTTP client for the tax computation service's `/api/calculate` endpoint.

use taxlens_core::{CanonicalIncomeRecord, ComputedTaxResult};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Client for the computation service.
pub struct CalcClient {
    client: reqwest::Client,
    base_url: String,
}

impl CalcClient {
    /// `base_url` should be like `http://localhost:8000`; a trailing slash is dropped.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn calculate_url(&self) -> String {
        format!("{}/api/calculate", self.base_url)
    }

    /// Submit `record` and return the computed result.
    ///
    /// The response body is parsed leniently: absent optional components
    /// become `None` rather than failing the call.
    pub async fn calculate(
        &self,
        record: &CanonicalIncomeRecord,
    ) -> Result<ComputedTaxResult, SyncError> {
        let url = self.calculate_url();

        info!(
            url = %url,
            tax_year = record.tax_year,
            filing_status = %record.filing_status,
            state = %record.state,
            "requesting tax computation"
        );
        let resp = self.client.post(&url).json(record).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let result = parse_result(&body)?;
        info!(
            amount_owed = result.amount_owed,
            total_tax_liability = result.total_tax_liability,
            "computation complete"
        );
        Ok(result)
    }
}

fn parse_result(body: &str) -> Result<ComputedTaxResult, SyncError> {
    Ok(serde_json::from_str(body)?)
}
