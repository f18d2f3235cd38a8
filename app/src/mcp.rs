use std::error::Error;
use std::sync::Arc;

use hound_open_core::{HoundConfig, HoundProvider, register_provider};
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
    transport::stdio,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{error, info};

use crate::ConnectionArgs;

#[derive(Clone)]
pub struct HoundServer {
    provider: Arc<HoundProvider>,
    tool_router: ToolRouter<HoundServer>,
}

impl HoundServer {
    fn internal_error(code: &str, message: impl Into<String>) -> McpError {
        let full = format!("{code}: {}", message.into());
        McpError::internal_error(full, None)
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct SearchCodeArgs {
    /// Hound query; a regular expression, at least three characters long.
    pub query: String,
}

#[tool_router]
impl HoundServer {
    pub fn new(provider: Arc<HoundProvider>) -> Self {
        Self {
            provider,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Search code across every repository indexed by the configured Hound server. Returns one block per match with the file path, the matching line and two lines of context on each side. Queries shorter than three characters return no results."
    )]
    pub async fn search_code(
        &self,
        Parameters(args): Parameters<SearchCodeArgs>,
    ) -> Result<CallToolResult, McpError> {
        let records = self
            .provider
            .execute_query(Some(&args.query))
            .await
            .map_err(|e| Self::internal_error("search_failed", e.to_string()))?;

        if records.is_empty() {
            return Ok(CallToolResult::success(vec![Content::text(format!(
                "No results for {:?}",
                args.query
            ))]));
        }

        let contents = records
            .iter()
            .map(|record| Content::text(self.provider.component_for_item(record).to_plain_text()))
            .collect();

        Ok(CallToolResult::success(contents))
    }
}

#[tool_handler]
impl ServerHandler for HoundServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Live code search backed by a Hound server. Use the `search_code` tool with a regular expression of at least three characters."
                    .to_string(),
            ),
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
        }
    }
}

pub async fn run_server(conn: ConnectionArgs) -> Result<(), Box<dyn Error>> {
    let config = HoundConfig::resolve(conn.base_uri, conn.config.as_deref())?;

    info!("hound_open MCP server starting");
    info!("search server: {}", config.base_uri);

    let provider = Arc::new(register_provider(&config)?);
    let server = HoundServer::new(provider);

    let service = server
        .serve(stdio())
        .await
        .inspect_err(|e| error!("hound_open MCP serve error: {e:?}"))?;

    service.waiting().await?;

    Ok(())
}
