use std::time::Duration;

use tracing::debug;

use crate::client::HoundClient;
use crate::config::HoundConfig;
use crate::error::HoundResult;
use crate::model::MatchRecord;
use crate::render::{HighlightMode, RenderedBlock, render};
use crate::sequence::RequestSequencer;

pub const PROVIDER_NAME: &str = "HoundProvider";
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Global,
    Directory,
}

impl ProviderType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderType::Global => "GLOBAL",
            ProviderType::Directory => "DIRECTORY",
        }
    }
}

/// Strings the host shows for this provider in its search UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayInfo {
    pub action: &'static str,
    pub prompt: &'static str,
    pub title: &'static str,
}

pub const DISPLAY: DisplayInfo = DisplayInfo {
    action: "hound-open:toggle-provider",
    prompt: "Search code in repo",
    title: "Code",
};

/// Quick-open provider backed by a Hound server.
#[derive(Debug)]
pub struct HoundProvider {
    pub name: &'static str,
    pub provider_type: ProviderType,
    pub debounce_delay: Duration,
    pub display: DisplayInfo,
    client: HoundClient,
    highlight: HighlightMode,
    sequencer: RequestSequencer,
}

pub fn register_provider(config: &HoundConfig) -> HoundResult<HoundProvider> {
    Ok(HoundProvider {
        name: PROVIDER_NAME,
        provider_type: ProviderType::Global,
        debounce_delay: DEBOUNCE_DELAY,
        display: DISPLAY,
        client: HoundClient::new(config)?,
        highlight: config.highlight,
        sequencer: RequestSequencer::new(),
    })
}

impl HoundProvider {
    pub async fn execute_query(&self, query: Option<&str>) -> HoundResult<Vec<MatchRecord>> {
        self.client.search(query).await
    }

    /// Like [`execute_query`](Self::execute_query), but yields `None` when a
    /// newer query was issued before this one resolved.
    pub async fn execute_latest(&self, query: Option<&str>) -> HoundResult<Option<Vec<MatchRecord>>> {
        let ticket = self.sequencer.issue();
        let result = self.execute_query(query).await;

        if !self.sequencer.is_latest(ticket) {
            debug!("discarding stale response #{}", ticket.value());
            return Ok(None);
        }
        result.map(Some)
    }

    pub fn component_for_item(&self, item: &MatchRecord) -> RenderedBlock {
        render(item, self.highlight)
    }
}
