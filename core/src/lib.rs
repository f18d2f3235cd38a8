pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod query;
pub mod render;
pub mod sequence;

pub use client::{HoundClient, execute};
pub use config::HoundConfig;
pub use error::{HoundError, HoundResult};
pub use model::{CodeMatch, MatchRecord, SearchResponse};
pub use provider::{DisplayInfo, HoundProvider, ProviderType, register_provider};
pub use render::{ContextLine, HighlightMode, Highlighter, RenderedBlock, Segment, render};
pub use sequence::{RequestSequencer, Ticket};
