//! REST endpoint handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use gfm_rs::{Message, MessageRole};
use gfm_rs::assistant::Assistant;
use gfm_rs::capabilities::{Capabilities, capabilities};
use gfm_rs::request::PredictionRequest;
use gfm_rs::templates::{PredictionResult, TaskType};
use gfm_rs::validation::GenomicRegion;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::ApiError;

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/capabilities: static snapshot of supported tasks and limits.
pub async fn get_capabilities() -> Json<&'static Capabilities> {
    Json(capabilities())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub task_type: TaskType,
    pub region: GenomicRegion,
    pub modalities: Vec<String>,
    pub query: String,
}

/// POST /api/query: validate and format without calling the backend.
pub async fn post_query(Json(body): Json<PredictionRequest>) -> Result<Json<QueryResponse>, ApiError> {
    let formatted = body.format_query()?;
    Ok(Json(QueryResponse {
        task_type: formatted.task_type,
        region: formatted.region,
        modalities: formatted.modalities,
        query: formatted.query,
    }))
}

/// Request body for POST /chat.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    /// Prior turns, sent first.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Prediction query, appended as a user turn after validation.
    #[serde(default)]
    pub query: Option<PredictionRequest>,
    /// Free text, appended as the last user turn.
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub reply: String,
    /// The formatted query text, when the turn included one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl ChatBody {
    /// Conversation order: history, then the query turn, then the free message.
    /// Validation happens here, before anything is sent. A conversation with
    /// no turn besides system messages is rejected.
    fn into_conversation(self) -> Result<(Vec<Message>, Option<String>), ApiError> {
        let mut conversation = self.messages;
        let mut query_text = None;

        if let Some(query) = &self.query {
            let formatted = query.format_query()?;
            conversation.push(Message::user(query.wrap_query(&formatted)));
            query_text = Some(formatted.query);
        }

        if let Some(message) = self.message.filter(|m| !m.trim().is_empty()) {
            conversation.push(Message::user(message));
        }

        if conversation.iter().all(|m| m.role == MessageRole::System) {
            return Err(ApiError::EmptyChat);
        }

        Ok((conversation, query_text))
    }
}

/// POST /chat: one conversation turn through the assistant.
pub async fn post_chat(
    State(app): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatResponse>, ApiError> {
    let (conversation, query) = body.into_conversation()?;
    debug!(messages = conversation.len(), with_query = query.is_some(), "chat turn");
    let reply = app.assistant.chat(conversation).await?;
    Ok(Json(ChatResponse { reply, query }))
}

/// Request body for POST /api/explain.
#[derive(Deserialize)]
pub struct ExplainBody {
    pub result: PredictionResult,
    #[serde(default)]
    pub modality: Option<String>,
}

/// POST /api/explain: ask the model to explain one result.
pub async fn post_explain(
    State(app): State<AppState>,
    Json(body): Json<ExplainBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let reply = app
        .assistant
        .explain(&body.result, body.modality.as_deref())
        .await?;
    Ok(Json(json!({ "reply": reply })))
}

/// Request body for POST /api/compare.
#[derive(Deserialize)]
pub struct CompareBody {
    pub results: Vec<PredictionResult>,
}

/// POST /api/compare: ask the model to compare several results.
pub async fn post_compare(
    State(app): State<AppState>,
    Json(body): Json<CompareBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let reply = app.assistant.compare(&body.results).await?;
    Ok(Json(json!({ "reply": reply })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(chromosome: &str) -> PredictionRequest {
        PredictionRequest {
            task_type: "GEP".into(),
            chromosome: chromosome.into(),
            start: 100,
            end: 5_100,
            cell_type: "HepG2".into(),
            ..Default::default()
        }
    }

    #[test]
    fn chat_body_deserializes_legacy_message_only() {
        let body: ChatBody = serde_json::from_str(r#"{"message":"hello"}"#).unwrap();
        assert!(body.messages.is_empty());
        assert!(body.query.is_none());
        assert_eq!(body.message.as_deref(), Some("hello"));
    }

    #[test]
    fn conversation_orders_history_query_message() {
        let body = ChatBody {
            messages: vec![Message::assistant("earlier")],
            query: Some(query("1")),
            message: Some("and what about GRO-seq?".into()),
        };
        let (conversation, query_text) = body.into_conversation().unwrap();
        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation[0].content, "earlier");
        assert_eq!(conversation[1].role, MessageRole::User);
        assert!(conversation[1].content.contains("- Region Size: 5,000 bp"));
        assert_eq!(conversation[2].content, "and what about GRO-seq?");
        assert!(query_text.unwrap().starts_with("**Genomic Region:**"));
    }

    #[test]
    fn conversation_rejects_invalid_query() {
        let body = ChatBody {
            query: Some(query("23")),
            ..Default::default()
        };
        let err = body.into_conversation().unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn blank_message_skipped() {
        let body = ChatBody {
            messages: vec![Message::user("earlier")],
            message: Some("   ".into()),
            ..Default::default()
        };
        let (conversation, _) = body.into_conversation().unwrap();
        assert_eq!(conversation, vec![Message::user("earlier")]);
    }

    #[test]
    fn nothing_to_answer_rejected() {
        for body in [
            ChatBody::default(),
            ChatBody {
                message: Some("  \n ".into()),
                ..Default::default()
            },
            ChatBody {
                messages: vec![Message::system("rules only")],
                ..Default::default()
            },
        ] {
            let err = body.into_conversation().unwrap_err();
            assert!(matches!(err, ApiError::EmptyChat));
        }
    }
}
