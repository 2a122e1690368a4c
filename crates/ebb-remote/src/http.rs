//! HTTP implementation of the remote service contract
//!
//! The service wraps every reply in a JSON envelope: a string discriminant
//! `success` ("true" marks success, anything else is failure) plus an
//! optional nested `response` payload carrying server-assigned identifiers
//! for creation kinds. Envelope decoding is pure and validated per kind, so
//! a successful creation reply missing its identifier field is an explicit
//! `MalformedResponse`, never an undefined id.

use std::time::Duration;

use async_trait::async_trait;
use ebb_core::{EbbError, EbbResult, GoalId, TodoId, WorkspaceId};
use serde::Deserialize;
use serde_json::json;

use crate::{CreatedGoal, CreatedTodo, CreatedWorkspace, NewGoal, NewTodo, RemoteService, TodoPatch};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reply envelope shared by all endpoints
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: Option<String>,
    #[serde(default)]
    pub response: Option<serde_json::Value>,
}

impl Envelope {
    /// Check the success discriminant
    pub fn expect_success(&self, operation: &'static str) -> EbbResult<()> {
        match self.success.as_deref() {
            Some("true") => Ok(()),
            other => Err(EbbError::Rejected {
                operation,
                discriminant: other.map(str::to_string),
            }),
        }
    }

    /// Extract a string field from the nested response payload
    pub fn response_field(
        &self,
        operation: &'static str,
        field: &'static str,
    ) -> EbbResult<String> {
        self.response
            .as_ref()
            .and_then(|r| r.get(field))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(EbbError::MalformedResponse { operation, field })
    }
}

/// HTTP client against the remote service
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemote {
    pub fn new(base_url: &str) -> EbbResult<Self> {
        if base_url.is_empty() {
            return Err(EbbError::InvalidEndpoint("empty base url".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(transport)?;

        Ok(HttpRemote {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> EbbResult<Envelope> {
        let response = request.send().await.map_err(transport)?;
        let response = response.error_for_status().map_err(transport)?;
        response.json::<Envelope>().await.map_err(transport)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl RemoteService for HttpRemote {
    async fn create_workspace(
        &self,
        temp_id: &WorkspaceId,
        name: &str,
    ) -> EbbResult<CreatedWorkspace> {
        let body = json!({ "tempId": temp_id, "name": name });
        let env = self
            .send(self.client.post(self.url("/api/v1/workspaces/create-workspace")).json(&body))
            .await?;
        env.expect_success("CREATE_WORKSPACE")?;
        let id = env.response_field("CREATE_WORKSPACE", "workspaceId")?;
        Ok(CreatedWorkspace {
            workspace_id: WorkspaceId::new(id),
        })
    }

    async fn update_workspace(&self, id: &WorkspaceId, updated_name: &str) -> EbbResult<()> {
        let body = json!({ "workspaceId": id, "updatedName": updated_name });
        let env = self
            .send(self.client.put(self.url("/api/v1/workspaces/update-workspace")).json(&body))
            .await?;
        env.expect_success("UPDATE_WORKSPACE")
    }

    async fn delete_workspace(&self, id: &WorkspaceId) -> EbbResult<()> {
        let body = json!({ "workspaceId": id });
        let env = self
            .send(self.client.delete(self.url("/api/v1/workspaces/delete-workspace")).json(&body))
            .await?;
        env.expect_success("DELETE_WORKSPACE")
    }

    async fn create_todo(&self, todo: &NewTodo) -> EbbResult<CreatedTodo> {
        let body = json!({
            "id": todo.temp_id,
            "workspaceId": todo.workspace_id,
            "text": todo.text,
            "priority": todo.priority,
        });
        let env = self
            .send(self.client.post(self.url("/api/v1/todos/create-todo")).json(&body))
            .await?;
        env.expect_success("CREATE_TODO")?;
        let id = env.response_field("CREATE_TODO", "_id")?;
        Ok(CreatedTodo {
            todo_id: TodoId::new(id),
        })
    }

    async fn toggle_todo(
        &self,
        id: &TodoId,
        workspace_id: &WorkspaceId,
        completed: bool,
    ) -> EbbResult<()> {
        let body = json!({ "todoId": id, "workspaceId": workspace_id, "completed": completed });
        let env = self
            .send(self.client.put(self.url("/api/v1/todos/toggle-todo")).json(&body))
            .await?;
        env.expect_success("TOGGLE_TODO")
    }

    async fn update_todo(&self, todo: &TodoPatch) -> EbbResult<()> {
        let body = json!({
            "todoId": todo.id,
            "workspaceId": todo.workspace_id,
            "text": todo.text,
            "priority": todo.priority,
        });
        let env = self
            .send(self.client.put(self.url("/api/v1/todos/update-todo")).json(&body))
            .await?;
        env.expect_success("UPDATE_TODO")
    }

    async fn delete_todo(&self, id: &TodoId, workspace_id: &WorkspaceId) -> EbbResult<()> {
        let body = json!({ "todoId": id, "workspaceId": workspace_id });
        let env = self
            .send(self.client.delete(self.url("/api/v1/todos/delete-todo")).json(&body))
            .await?;
        env.expect_success("DELETE_TODO")
    }

    async fn add_goal(&self, goal: &NewGoal) -> EbbResult<CreatedGoal> {
        let body = json!({
            "id": goal.temp_id,
            "workspaceId": goal.workspace_id,
            "title": goal.title,
            "target": goal.target,
        });
        let env = self
            .send(self.client.post(self.url("/api/v1/goals/add-goal")).json(&body))
            .await?;
        env.expect_success("ADD_GOAL")?;
        let id = env.response_field("ADD_GOAL", "_id")?;
        Ok(CreatedGoal {
            goal_id: GoalId::new(id),
        })
    }

    async fn increment_goal(&self, goal_id: &GoalId, magnitude: u32) -> EbbResult<()> {
        // The service expects the count as a string.
        let body = json!({ "count": magnitude.to_string() });
        let path = format!("/api/v1/goals/increament/{goal_id}");
        let env = self.send(self.client.post(self.url(&path)).json(&body)).await?;
        env.expect_success("INCREAMENT_GOAL")
    }

    async fn decrement_goal(&self, goal_id: &GoalId, magnitude: u32) -> EbbResult<()> {
        let body = json!({ "count": magnitude.to_string() });
        let path = format!("/api/v1/goals/decreament/{goal_id}");
        let env = self.send(self.client.post(self.url(&path)).json(&body)).await?;
        env.expect_success("DECREAMENT_GOAL")
    }
}

fn transport(err: reqwest::Error) -> EbbError {
    EbbError::Transport(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: &str) -> Envelope {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_success_discriminant_true() {
        let env = envelope(r#"{ "success": "true" }"#);
        assert!(env.expect_success("TOGGLE_TODO").is_ok());
    }

    #[test]
    fn test_anything_but_true_is_rejection() {
        for body in [
            r#"{ "success": "false" }"#,
            r#"{ "success": "ok" }"#,
            r#"{}"#,
        ] {
            let env = envelope(body);
            let err = env.expect_success("TOGGLE_TODO").unwrap_err();
            assert!(matches!(err, EbbError::Rejected { .. }));
        }
    }

    #[test]
    fn test_creation_reply_carries_server_id() {
        let env = envelope(r#"{ "success": "true", "response": { "workspaceId": "w-42" } }"#);
        assert_eq!(
            env.response_field("CREATE_WORKSPACE", "workspaceId").unwrap(),
            "w-42"
        );
    }

    #[test]
    fn test_missing_identifier_is_malformed_not_undefined() {
        let env = envelope(r#"{ "success": "true", "response": {} }"#);
        let err = env.response_field("CREATE_TODO", "_id").unwrap_err();
        assert!(matches!(
            err,
            EbbError::MalformedResponse {
                operation: "CREATE_TODO",
                field: "_id"
            }
        ));

        let env = envelope(r#"{ "success": "true" }"#);
        assert!(env.response_field("ADD_GOAL", "_id").is_err());
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let remote = HttpRemote::new("http://localhost:8080/").unwrap();
        assert_eq!(
            remote.url("/api/v1/todos/create-todo"),
            "http://localhost:8080/api/v1/todos/create-todo"
        );
    }

    #[test]
    fn test_empty_base_url_is_invalid() {
        assert!(matches!(
            HttpRemote::new(""),
            Err(EbbError::InvalidEndpoint(_))
        ));
    }
}
