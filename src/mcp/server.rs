/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads newline-delimited JSON-RPC requests from stdin
/// 2. Dispatches tool calls to the analytics engine for the local user
/// 3. Writes JSON-RPC responses to stdout

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::analytics::AnalyticsEngine;
use crate::domain::User;
use crate::mcp::protocol::*;
use crate::storage::ActivityStore;
use crate::tools::{self, ToolError};
use crate::ServerError;

/// MCP server bound to one local user profile
pub struct McpServer<S> {
    engine: AnalyticsEngine<S>,
    user: User,
    /// Whether the client has sent `initialized`
    initialized: bool,
}

/// Tool definition with its input schema generated from the params type
fn tool<P: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: serde_json::to_value(schema_for!(P)).unwrap_or_else(|_| json!({"type": "object"})),
    }
}

/// Every tool the server exposes
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        tool::<tools::CalendarParams>(
            "calendar_view",
            "Calendar of habit, mood and goal activity for a day, week or month, with consistency stats",
        ),
        tool::<tools::DashboardParams>(
            "analytics_dashboard",
            "Completion rates, streaks, moods and goals over the last N days",
        ),
        tool::<tools::WeeklyParams>(
            "analytics_weekly",
            "Summary of the current week starting on Sunday (0) or Monday (1)",
        ),
        tool::<tools::TrendsParams>(
            "analytics_trends",
            "Day-by-day completion of every active habit over the last N days",
        ),
        tool::<tools::HabitAnalyticsParams>(
            "habit_analytics",
            "Completion rate, streaks and average value of one habit over the last N days",
        ),
        tool::<tools::MoodAnalyticsParams>(
            "mood_analytics",
            "Average mood, recent trend, common tags and weekly averages over the last N days",
        ),
        tool::<tools::CreateHabitParams>("habit_create", "Create a new habit to track"),
        tool::<tools::LogHabitParams>(
            "habit_log",
            "Log a habit for today or a given day; logging the same day again updates the entry",
        ),
        tool::<tools::DeleteEntryParams>(
            "habit_entry_delete",
            "Remove the entry logged for a habit on a day and recompute its streak",
        ),
        tool::<tools::ListHabitsParams>("habit_list", "List habits with their current and longest streaks"),
        tool::<tools::LogMoodParams>("mood_log", "Record a 1-10 mood rating for a day"),
        tool::<tools::CreateGoalParams>("goal_create", "Create a goal with an optional numeric target"),
        tool::<tools::GoalProgressParams>("goal_progress", "Update the current value of a goal"),
    ]
}

impl<S: ActivityStore> McpServer<S> {
    pub fn new(engine: AnalyticsEngine<S>, user: User) -> Self {
        Self {
            engine,
            user,
            initialized: false,
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the MCP server over stdin/stdout until stdin closes
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve newline-delimited JSON-RPC from `reader`, answering on `writer`
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (stdin closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.process_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        writer.write_all(response_str.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                        writer.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    return Err(e.into());
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and notifications.
    pub async fn process_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        self.handle_request(request).await
    }

    async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            self.handle_notification(&request);
            return None;
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                error_codes::INVALID_REQUEST,
                format!("Unsupported JSON-RPC version '{}'", request.jsonrpc),
                None,
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" => {
                self.initialized = true;
                JsonRpcResponse::success(id, Value::Null)
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": tool_definitions() })),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        };
        Some(response)
    }

    fn handle_notification(&mut self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "initialized" | "notifications/initialized" => {
                self.initialized = true;
                info!("MCP client initialized");
            }
            other => debug!("Ignoring notification '{}'", other),
        }
    }

    fn handle_initialize(&mut self, id: Value) -> JsonRpcResponse {
        info!("MCP client connected");

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "MonkPoint MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string(), None),
        }
    }

    async fn handle_tools_call(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match params.map(serde_json::from_value::<ToolCallParams>) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid parameters: {}", e),
                    None,
                );
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        let result = self.call_tool(&tool_params.name, tool_params.arguments).await;

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string(), None),
        }
    }

    /// Dispatch a tool by name
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolCallResult {
        let engine = &self.engine;
        let user = &self.user;

        match name {
            "calendar_view" => run(arguments, |p| tools::calendar_view(engine, user, p)).await,
            "analytics_dashboard" => run(arguments, |p| tools::analytics_dashboard(engine, user, p)).await,
            "analytics_weekly" => run(arguments, |p| tools::analytics_weekly(engine, user, p)).await,
            "analytics_trends" => run(arguments, |p| tools::analytics_trends(engine, user, p)).await,
            "habit_analytics" => run(arguments, |p| tools::habit_analytics(engine, user, p)).await,
            "mood_analytics" => run(arguments, |p| tools::mood_analytics(engine, user, p)).await,
            "habit_create" => run(arguments, |p| tools::create_habit(engine, user, p)).await,
            "habit_log" => run(arguments, |p| tools::log_habit(engine, user, p)).await,
            "habit_entry_delete" => run(arguments, |p| tools::delete_habit_entry(engine, user, p)).await,
            "habit_list" => run(arguments, |p| tools::list_habits(engine, user, p)).await,
            "mood_log" => run(arguments, |p| tools::log_mood(engine, user, p)).await,
            "goal_create" => run(arguments, |p| tools::create_goal(engine, user, p)).await,
            "goal_progress" => run(arguments, |p| tools::update_goal_progress(engine, user, p)).await,
            _ => ToolCallResult::error(format!("Unknown tool: {}", name), error_codes::METHOD_NOT_FOUND),
        }
    }
}

/// Decode the arguments, run the tool and render its response as pretty JSON
async fn run<P, R, F, Fut>(arguments: Value, handler: F) -> ToolCallResult
where
    P: DeserializeOwned,
    R: Serialize,
    F: FnOnce(P) -> Fut,
    Fut: std::future::Future<Output = Result<R, ToolError>>,
{
    let params: P = match serde_json::from_value(arguments) {
        Ok(params) => params,
        Err(e) => {
            return ToolCallResult::error(format!("Invalid arguments: {}", e), error_codes::INVALID_PARAMS)
        }
    };

    match handler(params).await {
        Ok(response) => match serde_json::to_string_pretty(&response) {
            Ok(text) => ToolCallResult::success(text),
            Err(e) => ToolCallResult::error(e.to_string(), error_codes::INTERNAL_ERROR),
        },
        Err(e) => {
            warn!("Tool call failed: {}", e);
            ToolCallResult::error(e.to_string(), tool_error_code(&e))
        }
    }
}
