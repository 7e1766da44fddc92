//! MCP server exposing search index lookups as tools.

use crate::config::Settings;
use crate::state::IndexState;
use crate::tools::lookup::{
    ExactLookupRequest, LookupPrefixRequest, handle_exact_lookup, handle_lookup_prefix,
};
use crate::tools::set_search_dir::{SetSearchDirRequest, handle_set_search_dir};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP Server for generated documentation search data
#[derive(Clone)]
pub struct IndexServer {
    /// Shared index state (loaded corpora, current search directory)
    state: Arc<IndexState>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for IndexServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexServer")
            .field("state", &self.state)
            .finish()
    }
}

#[tool_router]
impl IndexServer {
    /// Create a new IndexServer from settings.
    pub fn new(settings: Settings) -> Self {
        Self {
            state: Arc::new(IndexState::new(settings)),
            tool_router: Self::tool_router(),
        }
    }

    /// Get a reference to the shared state.
    pub fn state(&self) -> &Arc<IndexState> {
        &self.state
    }

    #[tool(
        description = "Load a generated documentation search directory (the `search/` folder next to the HTML pages) and use it for later lookups. Reports the categories and entry counts found."
    )]
    async fn set_search_dir(
        &self,
        Parameters(request): Parameters<SetSearchDirRequest>,
    ) -> std::result::Result<String, String> {
        handle_set_search_dir(&self.state, request).await
    }

    #[tool(
        description = "Find documented symbols whose name starts with the given text, as a documentation search box does. Accepts typed text or a stored key prefix. Results are grouped by symbol and show the stored key in brackets; overloaded or repeated names list every destination with its scope.",
        input_schema = inline_schema_for_type::<LookupPrefixRequest>()
    )]
    async fn lookup_prefix(
        &self,
        Parameters(request): Parameters<LookupPrefixRequest>,
    ) -> std::result::Result<String, String> {
        handle_lookup_prefix(&self.state, request).await
    }

    #[tool(
        description = "Look up one search key exactly (e.g. 'sgn', 'seq_2ehpp') and list all of its destinations. Suggests close keys when there is no match.",
        input_schema = inline_schema_for_type::<ExactLookupRequest>()
    )]
    async fn exact_lookup(
        &self,
        Parameters(request): Parameters<ExactLookupRequest>,
    ) -> std::result::Result<String, String> {
        handle_exact_lookup(&self.state, request).await
    }
}

#[tool_handler]
impl ServerHandler for IndexServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "docindex: symbol lookup over generated documentation search data. \
                 Use set_search_dir with a `search/` directory unless one was given at startup, \
                 then lookup_prefix to browse symbols and exact_lookup to resolve one key.",
            )
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Unlike rmcp's default `schema_for_type()`, this function sets `inline_subschemas = true`
/// to generate inline definitions instead of $ref patterns.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(rmcp::schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    let object = serde_json::to_value(schema).expect("failed to serialize schema");

    let json_object = match object {
        serde_json::Value::Object(object) => object,
        _ => panic!("Schema serialization produced non-object value"),
    };

    Arc::new(json_object)
}
