//! Bounded tool-calling loop over a bridge session

use std::sync::Arc;

use super::outcome::{AgentOutcome, AgentResult, TraceEntry};
use crate::bridge::{BridgeError, BridgeSession};
use crate::logging::Logger;
use crate::providers::{Generator, ProviderError};
use crate::types::{CancellationToken, ChatMessage, ToolResult};

pub struct ToolAgent {
    generator: Generator,
    max_steps: usize,
    language: Option<String>,
    logger: Arc<dyn Logger>,
}

impl ToolAgent {
    pub fn new(generator: Generator, max_steps: usize, logger: Arc<dyn Logger>) -> Self {
        Self {
            generator,
            max_steps: max_steps.max(1),
            language: None,
            logger,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    fn system_prompt(&self) -> String {
        let mut prompt = String::from(
            "You answer questions using the tools available to you. \
             Call a tool whenever its description matches the question, \
             then answer from its result.",
        );
        if let Some(language) = &self.language {
            prompt.push_str(&format!(" Answer in {}.", language));
        }
        prompt
    }

    /// Ask, call the tools the model picks one at a time, feed results back
    ///
    /// Stops on the first turn without tool calls or after `max_steps` turns.
    pub async fn run(
        &self,
        query: &str,
        session: &mut dyn BridgeSession,
        cancel: CancellationToken,
    ) -> AgentResult<AgentOutcome> {
        let tools = session.catalogue().await?;
        self.logger.debug(&format!(
            "[Agent] {} tools on offer, up to {} steps",
            tools.len(),
            self.max_steps
        ));

        let mut messages = vec![ChatMessage::system(self.system_prompt()), ChatMessage::user(query)];
        let mut outcome = AgentOutcome::default();

        for step in 1..=self.max_steps {
            if cancel.is_cancelled() {
                return Err(ProviderError::Cancelled.into());
            }

            let turn = self
                .generator
                .chat(messages.clone(), tools.clone(), cancel.clone())
                .await?;
            outcome.answer = turn.text.clone();

            if turn.tool_calls.is_empty() {
                self.logger.debug(&format!("[Agent] Answered after {} step(s)", step));
                return Ok(outcome);
            }

            messages.push(ChatMessage::assistant_tool_calls(&turn.text, &turn.tool_calls));

            let mut results = Vec::with_capacity(turn.tool_calls.len());
            for call in &turn.tool_calls {
                let (output, failed) = match session.invoke(&call.name, call.input.clone()).await {
                    Ok(text) => (text, false),
                    Err(e @ (BridgeError::ToolCall(_) | BridgeError::Timeout(_))) => {
                        self.logger
                            .warn(&format!("[Agent] Tool '{}' failed: {}", call.name, e));
                        (e.to_string(), true)
                    }
                    Err(e) => return Err(e.into()),
                };

                results.push(if failed {
                    ToolResult::error(&call.id, &output)
                } else {
                    ToolResult::success(&call.id, &output)
                });
                outcome.trace.push(TraceEntry {
                    name: call.name.clone(),
                    args: call.input.clone(),
                    output,
                    failed,
                });
            }
            messages.push(ChatMessage::tool_results(&results));
        }

        self.logger.warn(&format!(
            "[Agent] Step limit ({}) reached with {} tool calls",
            self.max_steps,
            outcome.trace.len()
        ));
        Ok(outcome)
    }
}

impl std::fmt::Debug for ToolAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolAgent")
            .field("generator", &self.generator)
            .field("max_steps", &self.max_steps)
            .finish()
    }
}
