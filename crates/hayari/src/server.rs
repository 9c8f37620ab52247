//! MCP (Model Context Protocol) server implementation.
//!
//! Exposes trend analysis to AI assistants over stdio. Each `#[tool]`
//! method delegates to `hayari-core`, the same code the CLI commands use.

use std::sync::Arc;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};

use hayari_core::config::Config;
use hayari_core::{
    AnalysisError, TokenizerBackend, analyze_phrase_trends, build_tokenizer,
    parse_line_chat_history,
};

/// Parameters for the `get_info` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GetInfoParams {
    /// Output format: "text" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "text".to_string()
}

/// Parameters for the `analyze_trends` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AnalyzeTrendsParams {
    /// Full text of a LINE chat history export.
    pub text: String,
    /// Year to analyze. Defaults to the latest year in the export.
    pub year: Option<i32>,
    /// Number of phrases to return.
    pub top: Option<usize>,
    /// Tokenizer backend: "script" or "mecab".
    pub tokenizer: Option<TokenizerBackend>,
}

/// MCP server exposing trend analysis.
#[derive(Clone)]
pub struct ProjectServer {
    tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
    config: Arc<Config>,
    max_input: Option<usize>,
}

impl Default for ProjectServer {
    fn default() -> Self {
        let config = Config::default();
        let max_input = config.input_limit();
        Self::new(config, max_input)
    }
}

#[tool_router]
impl ProjectServer {
    /// Create a server that analyzes with `config` and rejects text longer
    /// than `max_input` bytes.
    pub fn new(config: Config, max_input: Option<usize>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            config: Arc::new(config),
            max_input,
        }
    }

    /// Get project information.
    #[tool(description = "Get project name, version, and description")]
    #[tracing::instrument(skip(self), fields(otel.kind = "server"))]
    fn get_info(
        &self,
        Parameters(params): Parameters<GetInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "get_info", format = %params.format, "executing MCP tool");

        let text = if params.format == "json" {
            let info = serde_json::json!({
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "description": env!("CARGO_PKG_DESCRIPTION"),
            });
            serde_json::to_string_pretty(&info)
                .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))?
        } else {
            format!(
                "{} v{}\n{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_DESCRIPTION"),
            )
        };

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Rank the buzz phrases of one year of a chat export.
    #[tool(
        description = "Find the buzz phrases of a year in a LINE chat history export. Returns ranked phrases with counts and the indices of the messages they came from."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn analyze_trends(
        &self,
        Parameters(params): Parameters<AnalyzeTrendsParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(
            tool = "analyze_trends",
            year = ?params.year,
            bytes = params.text.len(),
            "executing MCP tool"
        );

        if let Some(max) = self.max_input
            && params.text.len() > max
        {
            return Err(McpError::invalid_params(
                format!(
                    "input too large: {} bytes (limit: {max} bytes)",
                    params.text.len()
                ),
                None,
            ));
        }

        let history = parse_line_chat_history(&params.text);
        if history.messages.is_empty() {
            return Err(McpError::invalid_params(
                AnalysisError::NoMessages.to_string(),
                None,
            ));
        }
        let year = params
            .year
            .or_else(|| history.latest_year())
            .ok_or_else(|| McpError::invalid_params("no dated messages in input", None))?;

        let mut options = self.config.trends.clone();
        if let Some(top) = params.top {
            options.top_n = top;
        }
        let backend = params
            .tokenizer
            .or(self.config.tokenizer)
            .unwrap_or_default();
        let tokenizer = build_tokenizer(backend, self.config.mecab_command.as_deref())
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        let report =
            analyze_phrase_trends(&history.to_messages(), year, tokenizer.as_ref(), &options)
                .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))?;

        tracing::info!(
            tool = "analyze_trends",
            year,
            phrases = report.phrases.len(),
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for ProjectServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(format!(
                "{} MCP server. Call analyze_trends with the text of a LINE chat export to get that year's buzz phrases.",
                env!("CARGO_PKG_NAME"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::RawContent;

    const EXPORT: &str = "[LINE] 山田とのトーク履歴\n\
2023/12/31(日)\n\
23:59\t山田\tよいお年を\n\
2024/01/01(月)\n\
00:00\t山田\tあけおめ！\n\
00:01\t自分\tあけおめ！\n\
00:02\t山田\t了解です\n";

    fn server() -> ProjectServer {
        ProjectServer::new(Config::default(), None)
    }

    fn extract_text(result: &CallToolResult) -> Option<&str> {
        result.content.first().and_then(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
    }

    fn analyze(text: &str, year: Option<i32>) -> Result<CallToolResult, McpError> {
        server().analyze_trends(Parameters(AnalyzeTrendsParams {
            text: text.to_string(),
            year,
            top: None,
            tokenizer: Some(TokenizerBackend::Script),
        }))
    }

    #[test]
    fn server_info_has_correct_name() {
        let info = ServerHandler::get_info(&server());
        assert_eq!(info.server_info.name, env!("CARGO_PKG_NAME"));
        assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn get_info_tool_returns_json_when_requested() {
        let result = server()
            .get_info(Parameters(GetInfoParams {
                format: "json".to_string(),
            }))
            .expect("get_info should succeed");
        let text = extract_text(&result).expect("should have text content");
        let json: serde_json::Value = serde_json::from_str(text).expect("valid JSON");
        assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
    }

    #[test]
    fn get_info_tool_returns_text_by_default() {
        let result = server()
            .get_info(Parameters(GetInfoParams {
                format: default_format(),
            }))
            .expect("get_info should succeed");
        let text = extract_text(&result).expect("should have text content");
        assert!(text.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn analyze_trends_defaults_to_latest_year() {
        let result = analyze(EXPORT, None).expect("analyze_trends should succeed");
        let text = extract_text(&result).expect("should have text content");
        let json: serde_json::Value = serde_json::from_str(text).expect("valid JSON");

        assert_eq!(json["year"], 2024);
        assert_eq!(json["message_count"], 3);
        assert_eq!(json["phrases"][0]["phrase"], "あけおめ！");
        assert_eq!(json["phrases"][0]["count"], 2);
    }

    #[test]
    fn analyze_trends_honors_explicit_year() {
        let result = analyze(EXPORT, Some(2023)).expect("analyze_trends should succeed");
        let text = extract_text(&result).expect("should have text content");
        let json: serde_json::Value = serde_json::from_str(text).expect("valid JSON");
        assert_eq!(json["message_count"], 1);
        assert_eq!(json["phrases"][0]["phrase"], "よいお年を");
    }

    #[test]
    fn analyze_trends_rejects_text_without_messages() {
        assert!(analyze("hello", None).is_err());
    }

    #[test]
    fn analyze_trends_enforces_input_limit() {
        let server = ProjectServer::new(Config::default(), Some(16));
        let result = server.analyze_trends(Parameters(AnalyzeTrendsParams {
            text: EXPORT.to_string(),
            year: None,
            top: None,
            tokenizer: None,
        }));
        assert!(result.is_err());
    }
}
