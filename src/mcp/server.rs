/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads JSON-RPC requests from stdin, one per line
/// 2. Dispatches tool calls to the planner tools
/// 3. Sends JSON-RPC responses to stdout

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::mcp::protocol::*;
use crate::tools::{self, ToolError};
use crate::{PlannerServer, ServerError};

/// MCP server that handles communication with the client
pub struct McpServer {
    /// The underlying planner
    planner: PlannerServer,
    /// Whether the client has confirmed initialization
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(planner: PlannerServer) -> Self {
        Self {
            planner,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();

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

                        stdout.write_all(response_str.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
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

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                error_codes::INVALID_REQUEST,
                format!("Unsupported JSON-RPC version '{}'", request.jsonrpc),
                None,
            ));
        }

        self.handle_request(request).await
    }

    /// Handle a JSON-RPC request
    async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = match request.id {
            Some(id) => id,
            None => {
                self.handle_notification(&request.method);
                return None;
            }
        };

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "initialized" => {
                self.initialized = true;
                JsonRpcResponse::success(id, Value::Null)
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params),
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        };

        Some(response)
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "notifications/initialized" | "initialized" => {
                self.initialized = true;
                info!("MCP client finished initialization");
            }
            other => debug!("Ignoring notification '{}'", other),
        }
    }

    /// Handle MCP initialization request
    fn handle_initialize(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        match params.map(serde_json::from_value::<InitializeParams>) {
            Some(Ok(init)) => {
                let client = init
                    .client_info
                    .map(|c| format!("{} {}", c.name, c.version))
                    .unwrap_or_else(|| "unknown client".to_string());
                info!("MCP client connected: {} (protocol {})", client, init.protocol_version);
                if init.protocol_version != MCP_VERSION {
                    warn!("Client asked for protocol {}, answering with {}", init.protocol_version, MCP_VERSION);
                }
            }
            Some(Err(e)) => warn!("Unreadable initialize params: {}", e),
            None => info!("MCP client connected"),
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "Saturn Planner".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        to_response(id, &result)
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        let tools = vec![
            definition::<tools::CreateHabitParams>(
                "habit_create",
                "Create a new habit with a schedule (daily, weekdays, specific days or times per week)",
            ),
            definition::<tools::UpdateHabitParams>(
                "habit_update",
                "Edit a habit, change its schedule, or deactivate it. Schedule changes apply to the whole history",
            ),
            definition::<tools::ListHabitsParams>(
                "habit_list",
                "List habits with streaks and completion rates, with sorting options",
            ),
            definition::<tools::ToggleHabitParams>(
                "habit_toggle",
                "Check a habit off for today or a past date; toggling a checked day un-checks it",
            ),
            definition::<tools::StatusParams>(
                "habit_status",
                "Current and best streaks, completion rate, weekly progress and insights",
            ),
            definition::<tools::ScheduleCheckParams>(
                "schedule_check",
                "Show which days a habit or frequency is due",
            ),
            definition::<tools::RecurrencePreviewParams>(
                "recurrence_preview",
                "Describe a recurrence rule and list its next occurrences",
            ),
            definition::<tools::CreateTaskParams>(
                "task_create",
                "Create a task, optionally repeating on a recurrence rule",
            ),
            definition::<tools::UpcomingTasksParams>(
                "task_upcoming",
                "List open tasks with their upcoming due dates",
            ),
        ];

        to_response(id, &json!({ "tools": tools }))
    }

    /// Handle tools/call request
    fn handle_tools_call(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match params.map(serde_json::from_value) {
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

        if !self.initialized {
            debug!("Tool call '{}' before initialization finished", tool_params.name);
        }

        let result = self.call_tool(&tool_params.name, tool_params.arguments);
        to_response(id, &result)
    }

    /// Dispatch one tool call
    fn call_tool(&self, name: &str, args: Map<String, Value>) -> ToolCallResult {
        let planner = &self.planner;
        let storage = planner.storage();
        let user = planner.user_id();
        let today = planner.today();
        let upcoming_count = planner.config().upcoming_count;

        debug!("Calling tool '{}'", name);

        match name {
            "habit_create" => run(args, |p| tools::create_habit(storage, user, p), |r| {
                format!("{}\nHabit ID: {}", r.message, r.habit_id)
            }),
            "habit_update" => run(args, |p| tools::update_habit(storage, user, p), |r| r.message.clone()),
            "habit_list" => run(
                args,
                |p| tools::list_habits(storage, planner.analytics(), user, p, today),
                format_habit_list,
            ),
            "habit_toggle" => run(args, |p| tools::toggle_habit(storage, user, p, today), |r| r.message.clone()),
            "habit_status" => run(
                args,
                |p| tools::get_habit_status(storage, planner.analytics(), user, p, today),
                |r| r.message.clone(),
            ),
            "schedule_check" => run(args, |p| tools::check_schedule(storage, user, p, today), |r| r.message.clone()),
            "recurrence_preview" => run(
                args,
                |p| tools::preview_recurrence(p, today, upcoming_count),
                |r| r.message.clone(),
            ),
            "task_create" => run(args, |p| tools::create_task(storage, user, p, today), |r| {
                format!("{}\nTask ID: {}", r.message, r.task_id)
            }),
            "task_upcoming" => run(
                args,
                |p| tools::upcoming_tasks(storage, user, p, today, upcoming_count),
                |r| r.message.clone(),
            ),
            _ => ToolCallResult::error(format!("Unknown tool: {}", name)),
        }
    }
}

/// Decode arguments, run the tool, and render its response as text plus JSON
fn run<P, R, F, T>(args: Map<String, Value>, call: F, text: T) -> ToolCallResult
where
    P: DeserializeOwned,
    R: Serialize,
    F: FnOnce(P) -> Result<R, ToolError>,
    T: FnOnce(&R) -> String,
{
    let params: P = match serde_json::from_value(Value::Object(args)) {
        Ok(p) => p,
        Err(e) => return ToolCallResult::error(format!("Invalid arguments: {}", e)),
    };

    match call(params) {
        Ok(response) => {
            let message = text(&response);
            match serde_json::to_value(&response) {
                Ok(value) => ToolCallResult::success(message).with_structured(value),
                Err(e) => {
                    warn!("Could not serialize tool response: {}", e);
                    ToolCallResult::success(message)
                }
            }
        }
        Err(e) => {
            debug!("Tool failed: {}", e);
            ToolCallResult::from_tool_error(&e)
        }
    }
}

fn definition<P: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    let schema = schemars::schema_for!(P);
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: serde_json::to_value(schema).unwrap_or_else(|_| json!({ "type": "object" })),
    }
}

fn to_response<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(
            id,
            error_codes::INTERNAL_ERROR,
            format!("Failed to serialize result: {}", e),
            None,
        ),
    }
}

fn format_habit_list(response: &tools::ListHabitsResponse) -> String {
    if response.habits.is_empty() {
        return "No habits found. Create your first habit to get started!".to_string();
    }

    let summary = format!("📋 **Habit Summary** ({} habits)\n\n", response.summary.total_habits);

    let detailed_list = response
        .habits
        .iter()
        .map(|h| {
            format!(
                "🎯 **{}** ({})\n   📅 {} | 🔥 Streak: {} days | 🏆 Best: {} | 📊 Rate: {:.1}% | ✅ Total: {}{}",
                h.stats.name,
                h.stats.habit_id,
                h.stats.frequency,
                h.stats.current_streak,
                h.stats.best_streak,
                h.stats.completion_rate * 100.0,
                h.stats.total_completions,
                if h.is_active { "" } else { " ⏸️ (paused)" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let overall_stats = format!(
        "\n\n📊 **Overall Stats**\n- Active habits: {}\n- Average completion rate: {:.1}%",
        response.summary.active_habits,
        response.summary.avg_completion_rate * 100.0
    );

    format!("{}{}{}", summary, detailed_list, overall_stats)
}
