/// MCP server tests driving JSON-RPC lines through the dispatcher
use saturn_planner::mcp::McpServer;
use saturn_planner::*;
use serde_json::{json, Value};

fn server() -> McpServer {
    let storage = SqliteStorage::in_memory().expect("Failed to create storage");
    McpServer::new(PlannerServer::with_storage(storage, PlannerConfig::default()))
}

async fn send(server: &mut McpServer, request: Value) -> Value {
    let response = server
        .process_line(&request.to_string())
        .await
        .expect("Expected a response");
    serde_json::to_value(response).unwrap()
}

async fn call_tool(server: &mut McpServer, id: u64, name: &str, arguments: Value) -> Value {
    let response = send(
        server,
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": {"name": name, "arguments": arguments}
        }),
    )
    .await;
    response["result"].clone()
}

#[cfg(test)]
mod mcp_server_tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_handshake() {
        let mut server = server();

        let response = send(
            &mut server,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "test-client", "version": "0.1"}
                }
            }),
        )
        .await;

        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(response["result"]["serverInfo"]["name"], "Saturn Planner");

        // The follow-up notification gets no response
        let ack = server
            .process_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(ack.is_none());
        assert!(server.is_initialized());
    }

    #[tokio::test]
    async fn test_tools_list_has_schemas() {
        let mut server = server();
        let response = send(&mut server, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;

        let tools = response["result"]["tools"].as_array().unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        for expected in [
            "habit_create",
            "habit_update",
            "habit_list",
            "habit_toggle",
            "habit_status",
            "schedule_check",
            "recurrence_preview",
            "task_create",
            "task_upcoming",
        ] {
            assert!(names.contains(&expected), "missing tool {}", expected);
        }

        let create = tools.iter().find(|t| t["name"] == "habit_create").unwrap();
        assert_eq!(create["inputSchema"]["type"], "object");
        assert!(create["inputSchema"]["properties"]["name"].is_object());
        assert_eq!(create["inputSchema"]["required"], json!(["name"]));
    }

    #[tokio::test]
    async fn test_create_toggle_and_status() {
        let mut server = server();

        let created = call_tool(&mut server, 1, "habit_create", json!({"name": "Read", "frequency": "daily"})).await;
        assert_eq!(created["isError"], false);
        let habit_id = created["structuredContent"]["habit_id"].as_str().unwrap().to_string();

        let toggled = call_tool(&mut server, 2, "habit_toggle", json!({"habit_id": habit_id})).await;
        assert_eq!(toggled["isError"], false);
        assert_eq!(toggled["structuredContent"]["completed"], true);
        assert_eq!(toggled["structuredContent"]["current_streak"], 1);

        let status = call_tool(&mut server, 3, "habit_status", json!({})).await;
        let habits = status["structuredContent"]["habits"].as_array().unwrap();
        assert_eq!(habits.len(), 1);
        assert_eq!(habits[0]["current_streak"], 1);
        assert_eq!(habits[0]["completed_today"], true);

        let untoggled = call_tool(&mut server, 4, "habit_toggle", json!({"habit_id": habit_id})).await;
        assert_eq!(untoggled["structuredContent"]["completed"], false);
    }

    #[tokio::test]
    async fn test_tool_errors_are_results_not_protocol_errors() {
        let mut server = server();

        let response = send(
            &mut server,
            json!({
                "jsonrpc": "2.0",
                "id": 9,
                "method": "tools/call",
                "params": {"name": "habit_create", "arguments": {"name": "Run", "frequency": "hourly"}}
            }),
        )
        .await;

        assert!(response.get("error").is_none());
        assert_eq!(response["result"]["isError"], true);
        assert!(response["result"]["content"][0]["text"].as_str().unwrap().starts_with("Error:"));

        let missing = call_tool(
            &mut server,
            10,
            "habit_toggle",
            json!({"habit_id": "00000000-0000-0000-0000-000000000000"}),
        )
        .await;
        assert_eq!(missing["isError"], true);
        assert_eq!(missing["structuredContent"]["code"], -32001);

        let unknown = call_tool(&mut server, 11, "habit_explode", json!({})).await;
        assert_eq!(unknown["isError"], true);
    }

    #[tokio::test]
    async fn test_recurrence_preview_and_tasks() {
        let mut server = server();

        let preview = call_tool(
            &mut server,
            1,
            "recurrence_preview",
            json!({
                "rule": {"frequency": "weekly", "interval": 1, "days_of_week": [1, 3]},
                "start": "2024-03-11",
                "count": 4
            }),
        )
        .await;
        assert_eq!(preview["structuredContent"]["description"], "Every Mon, Wed");
        assert_eq!(
            preview["structuredContent"]["occurrences"],
            json!(["2024-03-11", "2024-03-13", "2024-03-18", "2024-03-20"])
        );

        let task = call_tool(
            &mut server,
            2,
            "task_create",
            json!({"title": "Team sync notes", "repeat": "weekdays"}),
        )
        .await;
        assert_eq!(task["isError"], false);
        assert_eq!(task["structuredContent"]["repeats"], "Every Mon, Tue, Wed, Thu, Fri");

        let upcoming = call_tool(&mut server, 3, "task_upcoming", json!({"count": 3})).await;
        let tasks = upcoming["structuredContent"]["tasks"].as_array().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0]["dates"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let mut server = server();

        let garbage = server.process_line("{not json").await.unwrap();
        let garbage = serde_json::to_value(garbage).unwrap();
        assert_eq!(garbage["error"]["code"], -32700);

        let unknown = send(&mut server, json!({"jsonrpc": "2.0", "id": 5, "method": "resources/list"})).await;
        assert_eq!(unknown["error"]["code"], -32601);

        let no_params = send(&mut server, json!({"jsonrpc": "2.0", "id": 6, "method": "tools/call"})).await;
        assert_eq!(no_params["error"]["code"], -32602);

        assert!(server.process_line("   \n").await.is_none());
    }
}
