/// MCP protocol tests: JSON-RPC handling and tool calls end to end
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use monkpoint_mcp::config::CalendarConfig;
use monkpoint_mcp::mcp::protocol::error_codes;
use monkpoint_mcp::mcp::McpServer;
use monkpoint_mcp::storage::{EntryUpsert, StreakUpdate};
use monkpoint_mcp::*;

async fn server() -> McpServer<SqliteStorage> {
    let storage = SqliteStorage::open_in_memory().expect("Failed to open storage");
    MonkPointServer::with_storage(storage, Config::default())
        .await
        .expect("Failed to create server")
        .into_mcp()
}

/// Call a tool and return (is_error, error_code, decoded text)
async fn call(server: &McpServer<SqliteStorage>, name: &str, arguments: Value) -> (bool, Option<i32>, Value) {
    let result = serde_json::to_value(server.call_tool(name, arguments).await).unwrap();
    let text = result["content"][0]["text"].as_str().unwrap().to_string();
    let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
    (
        result["isError"].as_bool().unwrap(),
        result["errorCode"].as_i64().map(|c| c as i32),
        body,
    )
}

/// A datastore whose every call fails
struct OfflineStore;

fn offline<T>() -> Result<T, StorageError> {
    Err(StorageError::Connection("datastore offline".to_string()))
}

#[async_trait]
impl ActivityStore for OfflineStore {
    async fn create_user(&self, _user: &User) -> Result<(), StorageError> {
        offline()
    }
    async fn get_user(&self, _user_id: UserId) -> Result<User, StorageError> {
        offline()
    }
    async fn find_user_by_name(&self, _display_name: &str) -> Result<Option<User>, StorageError> {
        offline()
    }
    async fn update_user_timezone(&self, _user_id: UserId, _timezone: &str) -> Result<(), StorageError> {
        offline()
    }
    async fn create_habit(&self, _habit: &Habit) -> Result<(), StorageError> {
        offline()
    }
    async fn get_habit(&self, _user_id: UserId, _habit_id: HabitId) -> Result<Habit, StorageError> {
        offline()
    }
    async fn list_habits(&self, _user_id: UserId, _active_only: bool) -> Result<Vec<Habit>, StorageError> {
        offline()
    }
    async fn upsert_habit_entry(&self, _entry: &HabitEntry) -> Result<EntryUpsert, StorageError> {
        offline()
    }
    async fn delete_habit_entry(
        &self,
        _user_id: UserId,
        _habit_id: HabitId,
        _day: DayKey,
    ) -> Result<HabitEntry, StorageError> {
        offline()
    }
    async fn habit_entries_in_range(
        &self,
        _user_id: UserId,
        _first_day: DayKey,
        _last_day: DayKey,
    ) -> Result<Vec<LoggedHabitEntry>, StorageError> {
        offline()
    }
    async fn upsert_mood(&self, _mood: &MoodEntry) -> Result<MoodEntry, StorageError> {
        offline()
    }
    async fn mood_entries_in_range(
        &self,
        _user_id: UserId,
        _first_day: DayKey,
        _last_day: DayKey,
    ) -> Result<Vec<MoodEntry>, StorageError> {
        offline()
    }
    async fn create_goal(&self, _goal: &Goal) -> Result<(), StorageError> {
        offline()
    }
    async fn get_goal(&self, _user_id: UserId, _goal_id: GoalId) -> Result<Goal, StorageError> {
        offline()
    }
    async fn update_goal(&self, _goal: &Goal) -> Result<(), StorageError> {
        offline()
    }
    async fn goals_created_between(
        &self,
        _user_id: UserId,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<Goal>, StorageError> {
        offline()
    }
    async fn goals_with_status(&self, _user_id: UserId, _status: GoalStatus) -> Result<Vec<Goal>, StorageError> {
        offline()
    }
    async fn get_streak(&self, _user_id: UserId, _habit_id: HabitId) -> Result<Option<Streak>, StorageError> {
        offline()
    }
    async fn streaks_for_user(&self, _user_id: UserId) -> Result<Vec<Streak>, StorageError> {
        offline()
    }
    async fn update_streak_atomically(
        &self,
        _user_id: UserId,
        _habit_id: HabitId,
        _since: DayKey,
        _update: StreakUpdate<'_>,
    ) -> Result<Streak, StorageError> {
        offline()
    }
}

#[cfg(test)]
mod protocol_tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_handshake() {
        let mut server = server().await;

        let response = server
            .process_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .await
            .expect("initialize gets a response");
        let response = serde_json::to_value(response).unwrap();
        assert_eq!(response["result"]["serverInfo"]["name"], "MonkPoint MCP");
        assert_eq!(response["result"]["protocolVersion"], "2024-11-05");

        assert!(!server.is_initialized());
        let notification = server
            .process_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(notification.is_none());
        assert!(server.is_initialized());
    }

    #[tokio::test]
    async fn test_tools_list_exposes_every_tool() {
        let mut server = server().await;
        let response = server
            .process_line(r#"{"jsonrpc":"2.0","id":"a","method":"tools/list"}"#)
            .await
            .unwrap();
        let response = serde_json::to_value(response).unwrap();
        let tools = response["result"]["tools"].as_array().unwrap();

        let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names.len(), 13);
        for expected in [
            "calendar_view",
            "analytics_dashboard",
            "analytics_weekly",
            "analytics_trends",
            "habit_analytics",
            "mood_analytics",
            "habit_log",
            "habit_entry_delete",
            "goal_progress",
        ] {
            assert!(names.contains(&expected), "missing {}", expected);
        }
        assert!(tools[0]["inputSchema"]["properties"]["view"].is_object());
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let mut server = server().await;

        let parse = serde_json::to_value(server.process_line("{not json").await.unwrap()).unwrap();
        assert_eq!(parse["error"]["code"], error_codes::PARSE_ERROR);

        let unknown = serde_json::to_value(
            server
                .process_line(r#"{"jsonrpc":"2.0","id":2,"method":"resources/list"}"#)
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(unknown["error"]["code"], error_codes::METHOD_NOT_FOUND);
        assert_eq!(unknown["id"], 2);

        let version = serde_json::to_value(
            server
                .process_line(r#"{"jsonrpc":"1.0","id":3,"method":"ping"}"#)
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(version["error"]["code"], error_codes::INVALID_REQUEST);

        assert!(server.process_line("   \n").await.is_none());
    }

    #[tokio::test]
    async fn test_serve_answers_each_request_line() {
        let mut server = server().await;
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"calendar_view","arguments":{"view":"week"}}}"#,
            "\n",
        );
        let mut output = Vec::new();

        server.serve(input.as_bytes(), &mut output).await.unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[1]["id"], 2);
        assert_eq!(lines[1]["result"]["isError"], false);
    }
}

#[cfg(test)]
mod tool_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_log_habit_updates_streak() {
        let server = server().await;

        let (is_error, _, created) = call(
            &server,
            "habit_create",
            json!({"name": "Meditate", "unit": "minutes", "target_value": 10.0}),
        )
        .await;
        assert!(!is_error);
        let habit_id = created["habit"]["id"].as_str().unwrap().to_string();

        let (is_error, _, logged) = call(&server, "habit_log", json!({"habit_id": habit_id, "value": 12.0})).await;
        assert!(!is_error, "{}", logged);
        assert_eq!(logged["created"], true);
        assert_eq!(logged["streak"]["current"], 1);
        assert_eq!(logged["streak"]["longest"], 1);

        // Logging the same day again updates the entry in place.
        let (_, _, again) = call(&server, "habit_log", json!({"habit_id": habit_id, "value": 15.0})).await;
        assert_eq!(again["created"], false);
        assert_eq!(again["entry"]["value"], 15.0);
        assert_eq!(again["streak"]["current"], 1);

        let (_, _, listed) = call(&server, "habit_list", json!({})).await;
        assert_eq!(listed["total_habits"], 1);
        assert_eq!(listed["habits"][0]["current_streak"], 1);
    }

    #[tokio::test]
    async fn test_habit_log_rejects_future_and_unknown() {
        let server = server().await;
        let (_, _, created) = call(&server, "habit_create", json!({"name": "Stretch"})).await;
        let habit_id = created["habit"]["id"].as_str().unwrap().to_string();

        let (is_error, code, _) = call(
            &server,
            "habit_log",
            json!({"habit_id": habit_id, "date": "2999-01-01"}),
        )
        .await;
        assert!(is_error);
        assert_eq!(code, Some(error_codes::VALIDATION_ERROR));

        let (is_error, code, _) = call(
            &server,
            "habit_log",
            json!({"habit_id": HabitId::new().to_string()}),
        )
        .await;
        assert!(is_error);
        assert_eq!(code, Some(error_codes::NOT_FOUND));

        let (is_error, code, _) = call(&server, "habit_log", json!({"value": 3})).await;
        assert!(is_error);
        assert_eq!(code, Some(error_codes::INVALID_PARAMS));
    }

    #[tokio::test]
    async fn test_habit_log_rejects_inactive_habit() {
        let app = MonkPointServer::with_storage(SqliteStorage::open_in_memory().unwrap(), Config::default())
            .await
            .unwrap();
        let mut habit = Habit::new(app.user().id, "Retired".to_string(), None, None, None, None).unwrap();
        habit.is_active = false;
        app.engine().store().create_habit(&habit).await.unwrap();
        let server = app.into_mcp();

        let (is_error, code, body) = call(&server, "habit_log", json!({"habit_id": habit.id.to_string()})).await;
        assert!(is_error);
        assert_eq!(code, Some(error_codes::VALIDATION_ERROR));
        assert!(body.as_str().unwrap().contains("inactive"));

        let (_, _, trends) = call(&server, "analytics_trends", json!({"period": 2})).await;
        assert!(trends["trends"][0]["habits"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_entry_recomputes_streak() {
        let server = server().await;
        let (_, _, created) = call(&server, "habit_create", json!({"name": "Floss"})).await;
        let habit_id = created["habit"]["id"].as_str().unwrap().to_string();

        let (_, _, logged) = call(&server, "habit_log", json!({"habit_id": habit_id})).await;
        assert_eq!(logged["streak"]["current"], 1);

        let (is_error, _, deleted) = call(&server, "habit_entry_delete", json!({"habit_id": habit_id})).await;
        assert!(!is_error, "{}", deleted);
        assert_eq!(deleted["deleted"]["id"], logged["entry"]["id"]);
        assert_eq!(deleted["streak"]["current"], 0);
        assert_eq!(deleted["streak"]["longest"], 1);

        let (_, _, listed) = call(&server, "habit_list", json!({})).await;
        assert_eq!(listed["habits"][0]["current_streak"], 0);

        let (is_error, code, _) = call(&server, "habit_entry_delete", json!({"habit_id": habit_id})).await;
        assert!(is_error);
        assert_eq!(code, Some(error_codes::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_analytics_tools() {
        let server = server().await;
        let (_, _, created) = call(&server, "habit_create", json!({"name": "Swim", "unit": "laps", "target_value": 20.0})).await;
        let habit_id = created["habit"]["id"].as_str().unwrap().to_string();
        call(&server, "habit_log", json!({"habit_id": habit_id, "value": 24.0})).await;
        call(&server, "mood_log", json!({"rating": 7, "tags": ["Pool", "tired"]})).await;

        let (is_error, _, trends) = call(&server, "analytics_trends", json!({})).await;
        assert!(!is_error, "{}", trends);
        assert_eq!(trends["period_days"], 30);
        assert_eq!(trends["trends"].as_array().unwrap().len(), 30);
        assert_eq!(trends["trends"][29]["habits"][0]["completed"], true);

        let (is_error, _, habit) = call(&server, "habit_analytics", json!({"habit_id": habit_id, "period": 10})).await;
        assert!(!is_error, "{}", habit);
        assert_eq!(habit["total_entries"], 1);
        assert_eq!(habit["completion_rate"], 10.0);
        assert_eq!(habit["current_streak"], 1);
        assert_eq!(habit["average_value"], 24.0);

        let (is_error, _, moods) = call(&server, "mood_analytics", json!({"period": 7})).await;
        assert!(!is_error, "{}", moods);
        assert_eq!(moods["average_rating"], 7.0);
        assert_eq!(moods["common_tags"][0]["tag"], "pool");

        let (_, code, _) = call(&server, "mood_analytics", json!({"period": 0})).await;
        assert_eq!(code, Some(error_codes::CALENDAR_VALIDATION));
        let (_, code, _) = call(&server, "habit_analytics", json!({"habit_id": HabitId::new().to_string()})).await;
        assert_eq!(code, Some(error_codes::NOT_FOUND));
        let (_, code, _) = call(&server, "habit_analytics", json!({"habit_id": "nope"})).await;
        assert_eq!(code, Some(error_codes::VALIDATION_ERROR));
    }

    #[tokio::test]
    async fn test_calendar_tool_counts_moods_and_goals() {
        let server = server().await;
        let (is_error, _, _) = call(&server, "mood_log", json!({"rating": 8, "tags": ["rested"]})).await;
        assert!(!is_error);
        let (is_error, _, goal) = call(&server, "goal_create", json!({"title": "Run 100km", "target_value": 100.0})).await;
        assert!(!is_error);

        let (_, _, day) = call(&server, "calendar_view", json!({"view": "day"})).await;
        assert_eq!(day["view"], "day");
        assert_eq!(day["stats"]["total_activities"], 2);
        assert_eq!(day["day_data"]["activities"].as_array().unwrap().len(), 2);

        let goal_id = goal["goal"]["id"].as_str().unwrap().to_string();
        let (_, _, progress) = call(
            &server,
            "goal_progress",
            json!({"goal_id": goal_id, "current_value": 100.0}),
        )
        .await;
        assert_eq!(progress["progress"], 100);
        assert_eq!(progress["goal"]["status"], "completed");
    }

    #[tokio::test]
    async fn test_calendar_validation_errors() {
        let server = server().await;

        let (is_error, code, body) = call(&server, "calendar_view", json!({"view": "year"})).await;
        assert!(is_error);
        assert_eq!(code, Some(error_codes::CALENDAR_VALIDATION));
        assert!(body.as_str().unwrap().contains("year"));

        let (_, code, _) = call(&server, "calendar_view", json!({"timezone": "Nowhere/City"})).await;
        assert_eq!(code, Some(error_codes::CALENDAR_VALIDATION));

        let (_, code, _) = call(&server, "analytics_dashboard", json!({"period": 400})).await;
        assert_eq!(code, Some(error_codes::CALENDAR_VALIDATION));

        let (_, code, _) = call(&server, "analytics_weekly", json!({"week_start": 3})).await;
        assert_eq!(code, Some(error_codes::CALENDAR_VALIDATION));

        let (_, code, _) = call(&server, "no_such_tool", json!({})).await;
        assert_eq!(code, Some(error_codes::METHOD_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_datastore_failure_is_reported() {
        let engine = AnalyticsEngine::new(Arc::new(OfflineStore), CalendarConfig::default());
        let user = User::new("Ada".to_string(), "UTC".to_string());

        let err = engine
            .calendar_view(
                &user,
                &monkpoint_mcp::analytics::CalendarRequest {
                    date: None,
                    view: "month".to_string(),
                    timezone: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CalendarError::DatastoreUnavailable(StorageError::Connection(_))));

        let server = McpServer::new(engine, user);
        let result = serde_json::to_value(server.call_tool("analytics_dashboard", json!({})).await).unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["errorCode"], error_codes::STORAGE_ERROR);
    }
}
