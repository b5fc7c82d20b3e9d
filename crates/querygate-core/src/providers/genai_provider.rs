//! GenaiProvider: every remote/local LLM API through the `genai` crate

use std::sync::Arc;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use genai::chat::{ChatRequest, ChatStreamEvent};

use super::error::{ProviderError, ProviderResult};
use super::genai_adapter::{
    create_client, extract_model_name, from_genai_event, is_genai_supported, to_genai_messages,
    to_genai_options, to_genai_tools,
};
use super::traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};
use crate::logging::Logger;
use crate::secrets::{resolve_api_key, SecretStore};
use crate::types::{CancellationToken, ChatMessage};

pub struct GenaiProvider {
    provider_id: String,
    secrets: Arc<dyn SecretStore>,
    logger: Arc<dyn Logger>,
}

impl GenaiProvider {
    pub fn new(
        provider_id: impl Into<String>,
        secrets: Arc<dyn SecretStore>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            secrets,
            logger,
        }
    }

    pub fn supports(provider_id: &str) -> bool {
        is_genai_supported(provider_id)
    }
}

#[async_trait]
impl Provider for GenaiProvider {
    fn name(&self) -> &str {
        &self.provider_id
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        model_config: ProviderModelConfig,
        options: StreamChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse> {
        let model_name = extract_model_name(&model_config.model).to_string();
        self.logger.debug(&format!(
            "[GenaiProvider] stream_chat provider={} model={} messages={}",
            self.provider_id,
            model_name,
            messages.len()
        ));

        let api_key = resolve_api_key(
            model_config.api_key.as_deref(),
            &self.provider_id,
            self.secrets.as_ref(),
        );
        if api_key.is_none() {
            self.logger.debug(&format!(
                "[GenaiProvider] No API key for {}, continuing unauthenticated",
                self.provider_id
            ));
        }
        let client = create_client(&self.provider_id, api_key, model_config.api_base.clone());

        let mut chat_req = ChatRequest::new(to_genai_messages(messages));
        if let Some(tools) = &options.tools {
            chat_req = chat_req.with_tools(to_genai_tools(tools.clone()));
        }
        let genai_options = to_genai_options(&options);

        let chat_stream = client
            .exec_chat_stream(&model_name, chat_req, Some(&genai_options))
            .await
            .map_err(|e| ProviderError::api_error(&self.provider_id, 500, e.to_string()))?;

        let logger = Arc::clone(&self.logger);
        let provider_id = self.provider_id.clone();

        let stream = chat_stream.stream.flat_map(move |result| {
            if cancel_token.is_cancelled() {
                logger.info("[GenaiProvider] Stream cancelled");
                return stream::iter(vec![Err(ProviderError::Cancelled)]);
            }
            let items = match result {
                Ok(event) => {
                    if matches!(event, ChatStreamEvent::End(_)) {
                        logger.debug("[GenaiProvider] Stream event: End");
                    }
                    from_genai_event(event).into_iter().map(Ok).collect()
                }
                Err(e) => {
                    logger.error(&format!("[GenaiProvider] Stream error: {}", e));
                    vec![Err(ProviderError::api_error(&provider_id, 500, e.to_string()))]
                }
            };
            stream::iter(items)
        });

        Ok(Box::pin(stream))
    }
}
