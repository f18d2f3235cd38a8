use reqwest::Client;
use tracing::debug;

use crate::config::HoundConfig;
use crate::error::{HoundError, HoundResult};
use crate::model::{MatchRecord, SearchResponse};
use crate::query::{accept_query, flatten_response, search_params, search_url};

/// HTTP side of the query executor. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HoundClient {
    http: Client,
    search_url: String,
}

impl HoundClient {
    pub fn new(config: &HoundConfig) -> HoundResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            search_url: search_url(&config.base_uri),
        })
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    /// Run one search. Absent or short queries return nothing without a request.
    pub async fn search(&self, query: Option<&str>) -> HoundResult<Vec<MatchRecord>> {
        let Some(query) = accept_query(query) else {
            return Ok(Vec::new());
        };

        debug!("GET {} q={query}", self.search_url);

        let response = self
            .http
            .get(&self.search_url)
            .query(&search_params(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HoundError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let parsed: SearchResponse = serde_json::from_slice(&body)?;

        let records = flatten_response(parsed, query);
        debug!("query {query:?} produced {} matches", records.len());
        Ok(records)
    }
}

/// One-shot convenience over [`HoundClient::search`].
pub async fn execute(query: Option<&str>, config: &HoundConfig) -> HoundResult<Vec<MatchRecord>> {
    if accept_query(query).is_none() {
        return Ok(Vec::new());
    }
    HoundClient::new(config)?.search(query).await
}
