//! The assistant service: pipeline in, one reply out.
//!
//! [`Assistant`] owns the shared [`LazyGateway`] and runs every request
//! through validation, formatting, and system-prompt assembly before the
//! backend sees it. Validation failures return before the gateway is even
//! initialized.

use std::time::Instant;

use tracing::{debug, error, info};

use crate::Message;
use crate::error::GfmError;
use crate::gateway::LazyGateway;
use crate::messages::assemble;
use crate::request::PredictionRequest;
use crate::templates::{PredictionResult, format_comparison_request, format_explanation_request};

pub struct Assistant {
    gateway: LazyGateway,
}

impl Assistant {
    pub fn new(gateway: LazyGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &LazyGateway {
        &self.gateway
    }

    /// Send `messages` (system prompt added if missing) and return the reply.
    pub async fn chat(&self, messages: Vec<Message>) -> Result<String, GfmError> {
        let conversation = assemble(messages);
        let gateway = self.gateway.get().await?;
        let params = self.gateway.params();

        debug!(
            messages = conversation.len(),
            model = %params.model,
            "forwarding conversation"
        );
        let start = Instant::now();

        match gateway.chat(&conversation, params).await {
            Ok(reply) => {
                info!(
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    reply_chars = reply.len(),
                    "assistant reply received"
                );
                Ok(reply)
            }
            Err(e) => {
                error!("assistant call failed: {e}");
                Err(e.into())
            }
        }
    }

    /// Validate and format `request`, append it to `history` as a user turn,
    /// and forward the conversation.
    pub async fn predict(
        &self,
        request: &PredictionRequest,
        mut history: Vec<Message>,
    ) -> Result<String, GfmError> {
        let content = request.user_content()?;
        history.push(Message::user(content));
        self.chat(history).await
    }

    /// Ask the model to explain one prediction result.
    pub async fn explain(
        &self,
        result: &PredictionResult,
        modality: Option<&str>,
    ) -> Result<String, GfmError> {
        let content = format_explanation_request(result, modality);
        self.chat(vec![Message::user(content)]).await
    }

    /// Ask the model to compare several prediction results.
    pub async fn compare(&self, results: &[PredictionResult]) -> Result<String, GfmError> {
        let content = format_comparison_request(results);
        self.chat(vec![Message::user(content)]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::MessageRole;
    use crate::error::{CallFailure, GatewayError, ValidationError};
    use crate::gateway::{GatewayConfig, GatewayFuture, GenerationParams, InferenceGateway};
    use crate::prompt::SYSTEM_PROMPT;

    /// Records every conversation it receives and replies with a fixed text.
    #[derive(Default)]
    struct RecordingGateway {
        calls: Mutex<Vec<Vec<Message>>>,
        fail: bool,
    }

    impl InferenceGateway for RecordingGateway {
        fn chat<'a>(
            &'a self,
            messages: &'a [Message],
            _params: &'a GenerationParams,
        ) -> GatewayFuture<'a> {
            Box::pin(async move {
                self.calls.lock().unwrap().push(messages.to_vec());
                if self.fail {
                    Err(CallFailure::Status {
                        status: 500,
                        body: "boom".into(),
                    }
                    .into())
                } else {
                    Ok("stub reply".to_string())
                }
            })
        }
    }

    fn assistant_with(gateway: Arc<RecordingGateway>) -> Assistant {
        Assistant::new(LazyGateway::with_gateway(GatewayConfig::default(), gateway))
    }

    #[tokio::test]
    async fn chat_injects_system_prompt() {
        let gateway = Arc::new(RecordingGateway::default());
        let assistant = assistant_with(gateway.clone());

        let reply = assistant.chat(vec![Message::user("hi")]).await.unwrap();
        assert_eq!(reply, "stub reply");

        let calls = gateway.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0], Message::system(SYSTEM_PROMPT));
        assert_eq!(calls[0][1], Message::user("hi"));
    }

    #[tokio::test]
    async fn predict_appends_formatted_query_after_history() {
        let gateway = Arc::new(RecordingGateway::default());
        let assistant = assistant_with(gateway.clone());

        let request = PredictionRequest {
            task_type: "EFP".into(),
            chromosome: "7".into(),
            start: 1_000_000,
            end: 1_050_000,
            cell_type: "K562".into(),
            ..Default::default()
        };
        let history = vec![Message::user("earlier"), Message::assistant("answer")];
        assistant.predict(&request, history).await.unwrap();

        let calls = gateway.calls.lock().unwrap();
        let sent = &calls[0];
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[0].role, MessageRole::System);
        assert_eq!(sent[1].content, "earlier");
        assert!(sent[3].content.contains("Region Size: 50,000 bp"));
    }

    #[tokio::test]
    async fn invalid_region_never_reaches_gateway() {
        let gateway = Arc::new(RecordingGateway::default());
        let assistant = assistant_with(gateway.clone());

        let request = PredictionRequest {
            task_type: "EFP".into(),
            chromosome: "23".into(),
            start: 0,
            end: 10,
            cell_type: "K562".into(),
            ..Default::default()
        };
        let err = assistant.predict(&request, vec![]).await.unwrap_err();
        assert!(matches!(
            err,
            GfmError::Validation(ValidationError::InvalidChromosome { .. })
        ));
        assert!(gateway.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_region_does_not_initialize_gateway() {
        let assistant = Assistant::new(LazyGateway::new(GatewayConfig::default()));
        let request = PredictionRequest {
            chromosome: "1".into(),
            start: 0,
            end: 700_000,
            ..Default::default()
        };
        let err = assistant.predict(&request, vec![]).await.unwrap_err();
        assert!(err.is_client_error());
        assert!(!assistant.gateway().is_initialized());
    }

    #[tokio::test]
    async fn unconfigured_backend_surfaces_distinctly() {
        let assistant = Assistant::new(LazyGateway::new(GatewayConfig::default()));
        let err = assistant.chat(vec![Message::user("hi")]).await.unwrap_err();
        assert!(matches!(err, GfmError::Gateway(GatewayError::Unconfigured(_))));
    }

    #[tokio::test]
    async fn call_failure_propagates_without_retry() {
        let gateway = Arc::new(RecordingGateway {
            fail: true,
            ..Default::default()
        });
        let assistant = assistant_with(gateway.clone());
        let err = assistant.chat(vec![Message::user("hi")]).await.unwrap_err();
        assert!(matches!(err, GfmError::Gateway(GatewayError::CallFailed(_))));
        assert_eq!(gateway.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn explain_and_compare_send_formatted_requests() {
        let gateway = Arc::new(RecordingGateway::default());
        let assistant = assistant_with(gateway.clone());

        let result = PredictionResult {
            task_type: Some("GEP".into()),
            ..Default::default()
        };
        assistant.explain(&result, Some("RNA-seq")).await.unwrap();
        assistant.compare(&[result.clone(), result]).await.unwrap();

        let calls = gateway.calls.lock().unwrap();
        assert!(calls[0][1].content.starts_with("Explain the following prediction result:"));
        assert!(calls[0][1].content.contains("- Modality: RNA-seq"));
        assert!(calls[1][1].content.starts_with("Compare the following 2 prediction results:"));
    }
}
