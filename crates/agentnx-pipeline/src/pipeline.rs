//! Dual-stage pipeline — model A outlines, model B writes the reply.
//!
//! Stage B's prompt is built from stage A's output, so the two calls are
//! strictly sequential. Any failure aborts the run; nothing is retried.

use std::sync::Arc;

use tracing::{debug, info};

use agentnx_core::config::PipelineConfig;
use agentnx_core::{style, Error, ModelReference, Result};
use agentnx_providers::traits::ModelInvoker;

use crate::prompt::{outline_prompt, reply_prompt};

/// Message used when model A or model B is unset.
pub const MODELS_NOT_CONFIGURED: &str = "models not configured: set model A and model B";

// ─────────────────────────────────────────────
// DualStagePipeline
// ─────────────────────────────────────────────

/// Runs one message through model A then model B.
#[derive(Clone)]
pub struct DualStagePipeline {
    invoker: Arc<dyn ModelInvoker>,
}

impl DualStagePipeline {
    pub fn new(invoker: Arc<dyn ModelInvoker>) -> Self {
        Self { invoker }
    }

    /// Turn `message` into a reply using the models and templates in `config`.
    ///
    /// 1. Fail with a configuration error if either model is unset or unresolvable
    /// 2. Pin both models to their endpoints; registry edits after this point
    ///    do not affect the run
    /// 3. Parse `[style=...]` directives from the message
    /// 4. Stage A: template A + raw message + styles → outline
    /// 5. Stage B: template B + outline + styles → reply, returned verbatim
    pub async fn process(&self, config: &PipelineConfig, message: &str) -> Result<String> {
        let (model_a, model_b) = required_models(config)?;
        let target_a = self.invoker.resolve(model_a)?;
        let target_b = self.invoker.resolve(model_b)?;

        let styles = style::parse(message);
        debug!(styles = styles.len(), "parsed style directives");

        info!(model = %model_a, "stage A: generating outline");
        let outline = self
            .invoker
            .invoke_target(&target_a, &outline_prompt(config, message, &styles))
            .await?;

        info!(model = %model_b, outline_len = outline.len(), "stage B: generating reply");
        let reply = self
            .invoker
            .invoke_target(&target_b, &reply_prompt(config, &outline, &styles))
            .await?;

        Ok(reply)
    }
}

fn required_models(config: &PipelineConfig) -> Result<(&ModelReference, &ModelReference)> {
    match (&config.model_a, &config.model_b) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(Error::configuration(MODELS_NOT_CONFIGURED)),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use std::time::Duration;

    use agentnx_providers::{HttpInvoker, InvocationTarget, ProviderRegistry, ResolvedEndpoint};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Returns scripted results in order and records every call.
    struct MockInvoker {
        responses: Mutex<Vec<Result<String>>>,
        calls: Mutex<Vec<(ModelReference, String)>>,
    }

    impl MockInvoker {
        fn new(responses: Vec<Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(ModelReference, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelInvoker for MockInvoker {
        fn resolve(&self, reference: &ModelReference) -> Result<InvocationTarget> {
            Ok(InvocationTarget {
                reference: reference.clone(),
                endpoint: ResolvedEndpoint {
                    base_url: format!("mock://{}", reference.provider),
                    credential: "mock".into(),
                },
            })
        }

        async fn invoke_target(&self, target: &InvocationTarget, prompt: &str) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((target.reference.clone(), prompt.to_string()));
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok("(no more scripted responses)".to_string())
            } else {
                responses.remove(0)
            }
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            model_a: Some(ModelReference::new("anthropic", "claude-3-sonnet")),
            model_b: Some(ModelReference::new("openai", "gpt-4-turbo")),
            prompt_a: "Outline the reply.".into(),
            prompt_b: "Write the reply.".into(),
        }
    }

    #[tokio::test]
    async fn test_unset_models_make_no_calls() {
        for (a, b) in [(false, true), (true, false), (false, false)] {
            let mock = MockInvoker::new(vec![]);
            let pipeline = DualStagePipeline::new(mock.clone());
            let mut cfg = config();
            if !a {
                cfg.model_a = None;
            }
            if !b {
                cfg.model_b = None;
            }

            let err = pipeline.process(&cfg, "hello").await.unwrap_err();
            assert!(err.is_configuration());
            assert!(err.to_string().contains("models not configured"));
            assert!(mock.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn test_two_stages_in_order() {
        let mock = MockInvoker::new(vec![
            Ok("OUTLINE: 1. greet 2. explain closures".into()),
            Ok("Hi! Closures capture their environment.".into()),
        ]);
        let pipeline = DualStagePipeline::new(mock.clone());

        let message = "Can you explain closures? [style=technical,tone:warm]";
        let reply = pipeline.process(&config(), message).await.unwrap();
        assert_eq!(reply, "Hi! Closures capture their environment.");

        let calls = mock.calls();
        assert_eq!(calls.len(), 2);

        let (ref_a, prompt_a) = &calls[0];
        assert_eq!(ref_a.model_id, "claude-3-sonnet");
        assert!(prompt_a.starts_with("Outline the reply."));
        assert!(prompt_a.contains(message));
        assert!(prompt_a.contains(r#"{"technical":"true","tone":"warm"}"#));

        let (ref_b, prompt_b) = &calls[1];
        assert_eq!(ref_b.model_id, "gpt-4-turbo");
        assert!(prompt_b.starts_with("Write the reply."));
        assert!(prompt_b.contains("OUTLINE: 1. greet 2. explain closures"));
        assert!(prompt_b.contains(r#"{"technical":"true","tone":"warm"}"#));
        assert!(!prompt_b.contains("Can you explain closures?"));
    }

    #[tokio::test]
    async fn test_stage_a_failure_skips_stage_b() {
        let mock = MockInvoker::new(vec![Err(Error::upstream_status(500, "boom"))]);
        let pipeline = DualStagePipeline::new(mock.clone());

        let err = pipeline.process(&config(), "hi").await.unwrap_err();
        assert!(err.is_upstream());
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_stage_b_failure_propagates() {
        let mock = MockInvoker::new(vec![
            Ok("outline".into()),
            Err(Error::upstream("connection reset")),
        ]);
        let pipeline = DualStagePipeline::new(mock.clone());

        let err = pipeline.process(&config(), "hi").await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(mock.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_reply_returned_verbatim() {
        let raw = "  reply with [style=kept] tag and trailing space \n";
        let mock = MockInvoker::new(vec![Ok("o".into()), Ok(raw.into())]);
        let pipeline = DualStagePipeline::new(mock);
        assert_eq!(pipeline.process(&config(), "m").await.unwrap(), raw);
    }

    // ── Over HTTP ──

    fn completion(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "content": content } }]
        }))
    }

    fn http_pipeline(registry: Arc<ProviderRegistry>) -> DualStagePipeline {
        DualStagePipeline::new(Arc::new(HttpInvoker::new(registry)))
    }

    #[tokio::test]
    async fn test_http_two_providers() {
        let server_a = MockServer::start().await;
        let server_b = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({ "model": "claude-3-sonnet" })))
            .respond_with(completion("T1-outline"))
            .expect(1)
            .mount(&server_a)
            .await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({ "model": "gpt-4-turbo" })))
            .respond_with(completion("final reply"))
            .expect(1)
            .mount(&server_b)
            .await;

        let registry = Arc::new(ProviderRegistry::new(reqwest::Client::new()));
        registry.save_provider("anthropic", &server_a.uri(), "sk-test-anthropic");
        registry.save_provider("openai", &server_b.uri(), "sk-test-openai");

        let reply = http_pipeline(registry)
            .process(&config(), "hello [style=friendly,warm]")
            .await
            .unwrap();
        assert_eq!(reply, "final reply");

        let requests = server_b.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let content = body["messages"][0]["content"].as_str().unwrap();
        assert!(content.contains("T1-outline"));
        assert!(content.contains(r#"{"friendly":"true","warm":"true"}"#));
    }

    #[tokio::test]
    async fn test_http_stage_a_failure_one_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let registry = Arc::new(ProviderRegistry::new(reqwest::Client::new()));
        registry.save_provider("anthropic", &server.uri(), "k");
        registry.save_provider("openai", &server.uri(), "k");

        let err = http_pipeline(registry)
            .process(&config(), "hello")
            .await
            .unwrap_err();
        assert!(err.is_upstream());
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_http_unresolvable_model_b_makes_no_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(completion("never"))
            .expect(0)
            .mount(&server)
            .await;

        let registry = Arc::new(ProviderRegistry::new(reqwest::Client::new()));
        registry.save_provider("anthropic", &server.uri(), "k");
        // "openai" is missing its credential.
        registry.set_endpoint("openai", &server.uri());

        let err = http_pipeline(registry)
            .process(&config(), "hello")
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }

    fn two_server_registry(a: &MockServer, b: &MockServer) -> Arc<ProviderRegistry> {
        let registry = Arc::new(ProviderRegistry::new(reqwest::Client::new()));
        registry.save_provider("anthropic", &a.uri(), "k");
        registry.save_provider("openai", &b.uri(), "k");
        registry
    }

    async fn slow_outline_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(completion("outline").set_delay(Duration::from_millis(400)))
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_endpoint_change_during_stage_a_keeps_stage_b_target() {
        let server_a = slow_outline_server().await;
        let server_b = MockServer::start().await;
        let moved_to = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(completion("from original"))
            .expect(1)
            .mount(&server_b)
            .await;
        Mock::given(method("POST"))
            .respond_with(completion("from moved"))
            .expect(0)
            .mount(&moved_to)
            .await;

        let registry = two_server_registry(&server_a, &server_b);
        let pipeline = http_pipeline(registry.clone());
        let config = config();

        let edit = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            registry.save_provider("openai", &moved_to.uri(), "k2");
        };
        let (reply, ()) = tokio::join!(pipeline.process(&config, "hello"), edit);

        assert_eq!(reply.unwrap(), "from original");
        assert!(moved_to.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provider_removed_during_stage_a_still_runs_stage_b() {
        let server_a = slow_outline_server().await;
        let server_b = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(completion("final"))
            .expect(1)
            .mount(&server_b)
            .await;

        let registry = two_server_registry(&server_a, &server_b);
        let pipeline = http_pipeline(registry.clone());
        let config = config();

        let edit = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            assert!(registry.remove_provider("openai"));
        };
        let (reply, ()) = tokio::join!(pipeline.process(&config, "hello"), edit);

        assert_eq!(reply.unwrap(), "final");
    }
}
