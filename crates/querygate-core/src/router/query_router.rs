//! Per-query strategy selection and the fragment stream

use std::sync::Arc;

use async_stream::stream;
use futures::StreamExt;

use super::error::{RouteError, RouteResult};
use super::fragment::{Fragment, FragmentStream};
use super::literal::{
    catalogue_text, detail_target, is_catalogue_query, split_arguments, split_literal,
};
use super::prompt::grounded_prompt;
use crate::agent::{AgentOutcome, ToolAgent};
use crate::bridge::{BridgeSnapshot, SessionFactory};
use crate::config::{AnswerSettings, AppConfig, CatalogueSettings};
use crate::invoker::{bind_positional, Arguments, DynamicInvoker, InvokerSettings};
use crate::logging::Logger;
use crate::providers::Generator;
use crate::retrieval::{RetrievedDocument, VectorStore};
use crate::tools::{ToolDefinition, ToolRegistry};
use crate::types::CancellationToken;

/// How one query will be answered
#[derive(Debug, Clone)]
pub enum RoutingDecision {
    /// Answered from the registry alone (catalogue, detail, usage hint)
    Reply(String),
    ToolInvocation {
        tool: ToolDefinition,
        args: Arguments,
    },
    GroundedAnswer {
        docs: Vec<RetrievedDocument>,
    },
    AgentFallback,
}

impl RoutingDecision {
    pub fn label(&self) -> &'static str {
        match self {
            RoutingDecision::Reply(_) => "reply",
            RoutingDecision::ToolInvocation { .. } => "tool",
            RoutingDecision::GroundedAnswer { .. } => "grounded",
            RoutingDecision::AgentFallback => "agent",
        }
    }
}

/// Router knobs, usually taken from [`AppConfig`]
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub score_threshold: f32,
    pub answer: AnswerSettings,
    pub catalogue: CatalogueSettings,
    pub invoker: InvokerSettings,
    pub agent_max_steps: usize,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl RouterSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            score_threshold: config.retrieval.score_threshold,
            answer: config.answer.clone(),
            catalogue: config.catalogue.clone(),
            invoker: config.invoker,
            agent_max_steps: config.agent.max_steps,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }
}

/// Chooses, per query: registry reply, literal tool call, grounded answer, agent fallback
///
/// Cloning is cheap; every collaborator is shared.
#[derive(Clone)]
pub struct QueryRouter {
    registry: Arc<ToolRegistry>,
    invoker: Arc<DynamicInvoker>,
    retriever: Arc<dyn VectorStore>,
    generator: Generator,
    sessions: Arc<dyn SessionFactory>,
    settings: Arc<RouterSettings>,
    logger: Arc<dyn Logger>,
}

impl QueryRouter {
    pub fn new(
        registry: Arc<ToolRegistry>,
        retriever: Arc<dyn VectorStore>,
        generator: Generator,
        sessions: Arc<dyn SessionFactory>,
        settings: RouterSettings,
        logger: Arc<dyn Logger>,
    ) -> RouteResult<Self> {
        let invoker = DynamicInvoker::new(settings.invoker, logger.clone())?;
        Ok(Self {
            registry,
            invoker: Arc::new(invoker),
            retriever,
            generator,
            sessions,
            settings: Arc::new(settings),
            logger,
        })
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    /// Decide without producing output
    ///
    /// Only the retrieval step touches the network.
    pub async fn decide(&self, query: &str) -> RouteResult<RoutingDecision> {
        if let Some(reply) = self.registry_reply(query)? {
            return Ok(reply);
        }

        let docs = self
            .retriever
            .retrieve(query, self.settings.score_threshold)
            .await?;
        // The store enforces the threshold; this keeps a lax store honest
        let docs: Vec<RetrievedDocument> = docs
            .into_iter()
            .filter(|d| d.score >= self.settings.score_threshold)
            .collect();

        if docs.is_empty() {
            Ok(RoutingDecision::AgentFallback)
        } else {
            Ok(RoutingDecision::GroundedAnswer { docs })
        }
    }

    /// Catalogue, detail and literal forms
    fn registry_reply(&self, query: &str) -> RouteResult<Option<RoutingDecision>> {
        let catalogue = &self.settings.catalogue;
        if is_catalogue_query(query, catalogue) {
            let text = catalogue_text(&self.registry.list_all());
            return Ok(Some(RoutingDecision::Reply(text)));
        }
        if let Some(name) = detail_target(query, catalogue) {
            return match self.registry.get(name) {
                Some(tool) => Ok(Some(RoutingDecision::Reply(tool.detail()))),
                None => Err(RouteError::UnknownTool(name.to_string())),
            };
        }

        let literal = split_literal(query);
        let Some(tool) = self.registry.get(literal.name) else {
            return Ok(None);
        };
        let Some(raw) = literal.args else {
            return Ok(Some(RoutingDecision::Reply(tool.usage_hint())));
        };

        let parts = split_arguments(raw);
        let expected = tool.input_schema.len();
        if parts.len() != expected {
            return Err(RouteError::ParameterCount {
                tool: tool.name.clone(),
                expected,
                got: parts.len(),
            });
        }
        let args = bind_positional(&tool, &parts);
        Ok(Some(RoutingDecision::ToolInvocation { tool, args }))
    }

    /// Answer a query as a lazy fragment stream
    pub fn route(&self, query: impl Into<String>) -> FragmentStream {
        self.route_with_cancel(query, CancellationToken::new())
    }

    /// Like [`route`](Self::route); cancelling the token stops generation at the next fragment
    pub fn route_with_cancel(&self, query: impl Into<String>, cancel: CancellationToken) -> FragmentStream {
        let router = self.clone();
        let query = query.into();

        Box::pin(stream! {
            let decision = match router.decide(&query).await {
                Ok(decision) => decision,
                Err(e) => {
                    router.logger.warn(&format!("[Router] {}", e));
                    yield Fragment::error(e);
                    return;
                }
            };
            router.logger.info(&format!("[Router] '{}' -> {}", query, decision.label()));

            match decision {
                RoutingDecision::Reply(text) => {
                    yield Fragment::Text(text);
                }
                RoutingDecision::ToolInvocation { tool, args } => {
                    yield router.invoke_literal(&tool, &args).await;
                }
                RoutingDecision::GroundedAnswer { docs } => {
                    let prompt = grounded_prompt(&query, &docs, &router.settings.answer);
                    match router.generator.stream(&prompt, cancel.clone()).await {
                        Ok(mut text) => {
                            while let Some(item) = text.next().await {
                                if cancel.is_cancelled() {
                                    break;
                                }
                                match item {
                                    Ok(fragment) => {
                                        yield Fragment::Text(fragment);
                                    }
                                    Err(e) => {
                                        yield Fragment::error(RouteError::from(e));
                                        break;
                                    }
                                }
                            }
                        }
                        Err(e) => {
                            yield Fragment::error(RouteError::from(e));
                        }
                    }
                }
                RoutingDecision::AgentFallback => {
                    yield router.agent_fallback(&query, cancel.clone()).await;
                }
            }
        })
    }

    async fn invoke_literal(&self, tool: &ToolDefinition, args: &Arguments) -> Fragment {
        match self.invoker.invoke_formatted(tool, args).await {
            Ok(text) => Fragment::Text(text),
            Err(e) => {
                self.logger
                    .warn(&format!("[Router] Tool '{}' failed: {}", tool.name, e));
                Fragment::error(RouteError::from(e))
            }
        }
    }

    /// One bridge session, opened and closed here
    async fn agent_fallback(&self, query: &str, cancel: CancellationToken) -> Fragment {
        let snapshot = BridgeSnapshot::of_registry(&self.registry, self.settings.invoker);
        let mut session = match self.sessions.open(snapshot).await {
            Ok(session) => session,
            Err(e) => return Fragment::error(RouteError::from(e)),
        };

        let agent = ToolAgent::new(
            self.generator.clone(),
            self.settings.agent_max_steps,
            self.logger.clone(),
        )
        .with_language(self.settings.answer.language.clone());
        let result = agent.run(query, session.as_mut(), cancel).await;

        if let Err(e) = session.close().await {
            self.logger
                .warn(&format!("[Router] Closing bridge session failed: {}", e));
        }

        match result {
            Ok(outcome) => Fragment::Text(self.agent_answer(outcome)),
            Err(e) => Fragment::error(RouteError::from(e)),
        }
    }

    /// Untraced answers are not trusted
    fn agent_answer(&self, outcome: AgentOutcome) -> String {
        if !outcome.used_tools() {
            self.logger
                .info("[Router] Agent used no tool, answering with the insufficient-context phrase");
            return self.settings.answer.insufficient_context.clone();
        }
        if outcome.answer.trim().is_empty() {
            return outcome
                .last_output()
                .map(str::to_string)
                .unwrap_or_else(|| self.settings.answer.insufficient_context.clone());
        }
        outcome.answer
    }
}

impl std::fmt::Debug for QueryRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryRouter")
            .field("tools", &self.registry.len())
            .field("generator", &self.generator)
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::{json, Value};

    use crate::bridge::{BridgeResult, BridgeSession, SessionState};
    use crate::logging::NoOpLogger;
    use crate::providers::{MockProvider, MockTurn, ProviderModelConfig};
    use crate::retrieval::{MemoryVectorStore, RetrievalResult};
    use crate::tools::{HttpMethod, ToolKind};
    use crate::types::{Tool, ToolCall};

    #[derive(Default)]
    struct SessionLog {
        opened: AtomicUsize,
        closed: AtomicUsize,
        dropped: AtomicUsize,
        calls: Mutex<Vec<(String, Value)>>,
    }

    struct FakeSession {
        log: Arc<SessionLog>,
        state: SessionState,
    }

    #[async_trait]
    impl BridgeSession for FakeSession {
        fn state(&self) -> SessionState {
            self.state
        }

        async fn catalogue(&mut self) -> BridgeResult<Vec<Tool>> {
            self.state = SessionState::CatalogueFetched;
            Ok(vec![Tool::new("weather", "Current weather")])
        }

        async fn invoke(&mut self, name: &str, args: Value) -> BridgeResult<String> {
            self.log.calls.lock().push((name.to_string(), args));
            if name != "weather" {
                let error = json!({ "error": format!("unknown tool: {}", name) });
                return Err(crate::bridge::BridgeError::ToolCall(error.to_string()));
            }
            Ok("Temp: 20".to_string())
        }

        async fn close(&mut self) -> BridgeResult<()> {
            self.state = SessionState::Closed;
            self.log.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl Drop for FakeSession {
        fn drop(&mut self) {
            self.log.dropped.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FakeFactory(Arc<SessionLog>);

    #[async_trait]
    impl SessionFactory for FakeFactory {
        async fn open(&self, _snapshot: BridgeSnapshot) -> BridgeResult<Box<dyn BridgeSession>> {
            self.0.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeSession {
                log: self.0.clone(),
                state: SessionState::Initialized,
            }))
        }
    }

    struct FailingStore;

    #[async_trait]
    impl VectorStore for FailingStore {
        async fn retrieve(&self, _query: &str, _threshold: f32) -> RetrievalResult<Vec<RetrievedDocument>> {
            Err(crate::retrieval::RetrievalError::Backend("index offline".into()))
        }
    }

    struct Harness {
        router: QueryRouter,
        sessions: Arc<SessionLog>,
        provider: Arc<MockProvider>,
    }

    async fn harness(provider: MockProvider, docs: MemoryVectorStore) -> Harness {
        let logger: Arc<dyn Logger> = Arc::new(NoOpLogger::new());
        let registry = Arc::new(ToolRegistry::in_memory(logger.clone()));
        registry
            .upsert(
                ToolDefinition::new("weather", ToolKind::Api, HttpMethod::Get, "http://127.0.0.1:9/weather")
                    .with_description("Current weather")
                    .with_param("city", "string", true)
                    .with_param("days", "int", false),
            )
            .await
            .unwrap();

        let provider = Arc::new(provider);
        let generator = Generator::new(provider.clone(), ProviderModelConfig::new("mock"), logger.clone());
        let sessions = Arc::new(SessionLog::default());
        let router = QueryRouter::new(
            registry,
            Arc::new(docs),
            generator,
            Arc::new(FakeFactory(sessions.clone())),
            RouterSettings::default().with_threshold(0.6),
            logger,
        )
        .unwrap();

        Harness {
            router,
            sessions,
            provider,
        }
    }

    fn nolog() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    async fn collect(stream: FragmentStream) -> Vec<Fragment> {
        stream.collect().await
    }

    #[tokio::test]
    async fn test_usage_hint_without_separator() {
        let h = harness(MockProvider::echo(nolog()), MemoryVectorStore::new()).await;

        let fragments = collect(h.router.route("weather")).await;
        assert_eq!(fragments.len(), 1);
        let text = fragments[0].as_text().unwrap();
        assert!(text.contains("city"));
        assert!(text.contains("days"));
        assert_eq!(h.provider.request_count(), 0);
        assert_eq!(h.sessions.opened.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wrong_argument_count() {
        let h = harness(MockProvider::echo(nolog()), MemoryVectorStore::new()).await;

        let err = h.router.decide("weather:Paris").await.unwrap_err();
        assert!(matches!(
            err,
            RouteError::ParameterCount { expected: 2, got: 1, .. }
        ));

        let fragments = collect(h.router.route("weather:Paris,3,x")).await;
        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].is_error());
    }

    #[tokio::test]
    async fn test_literal_binds_positionally() {
        let h = harness(MockProvider::echo(nolog()), MemoryVectorStore::new()).await;

        match h.router.decide("weather：Paris，3").await.unwrap() {
            RoutingDecision::ToolInvocation { tool, args } => {
                assert_eq!(tool.name, "weather");
                assert_eq!(args["city"], json!("Paris"));
                assert_eq!(args["days"], json!("3"));
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_error_fragment() {
        let h = harness(MockProvider::echo(nolog()), MemoryVectorStore::new()).await;

        let fragments = collect(h.router.route("weather:Paris,1")).await;
        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].is_error());
    }

    #[tokio::test]
    async fn test_catalogue_and_detail() {
        let h = harness(MockProvider::echo(nolog()), MemoryVectorStore::new()).await;

        let list = collect(h.router.route("工具")).await;
        assert!(list[0].as_text().unwrap().contains("weather"));

        let detail = collect(h.router.route("tool weather")).await;
        let text = detail[0].as_text().unwrap();
        assert!(text.contains("http://127.0.0.1:9/weather"));
        assert!(text.contains("GET"));

        let detail = collect(h.router.route("工具weather")).await;
        assert!(detail[0].as_text().unwrap().contains("GET"));
    }

    #[tokio::test]
    async fn test_detail_of_unknown_tool_is_an_error() {
        let h = harness(MockProvider::echo(nolog()), MemoryVectorStore::new()).await;

        let fragments = collect(h.router.route("tool nosuch")).await;
        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].is_error());
        assert!(fragments[0].to_string().contains("nosuch"));
        assert_eq!(h.sessions.opened.load(Ordering::SeqCst), 0);

        assert!(matches!(
            h.router.decide("工具nosuch").await,
            Err(RouteError::UnknownTool(name)) if name == "nosuch"
        ));
    }

    #[tokio::test]
    async fn test_grounded_answer_streams() {
        let docs = MemoryVectorStore::new();
        docs.add("Paris is the capital of France", "geo.md");
        let provider = MockProvider::chunked(
            vec!["Paris ".into(), "is the ".into(), "capital.".into()],
            0,
            nolog(),
        );
        let h = harness(provider, docs).await;

        let fragments = collect(h.router.route("capital of France")).await;
        assert_eq!(fragments.len(), 3);
        let text: String = fragments.iter().filter_map(Fragment::as_text).collect();
        assert_eq!(text, "Paris is the capital.");
        assert_eq!(h.sessions.opened.load(Ordering::SeqCst), 0);

        let requests = h.provider.requests();
        let prompt = requests[0][0].text().unwrap();
        assert!(prompt.contains("Paris is the capital of France"));
    }

    #[tokio::test]
    async fn test_below_threshold_falls_back_to_agent() {
        let docs = MemoryVectorStore::new();
        // One of two query tokens shared: score 0.5 < 0.6
        docs.add("alpha only", "a.md");
        let h = harness(MockProvider::scripted(vec![MockTurn::text("guess")], nolog()), docs).await;

        let decision = h.router.decide("alpha beta").await.unwrap();
        assert!(matches!(decision, RoutingDecision::AgentFallback));
    }

    #[tokio::test]
    async fn test_agent_without_tools_yields_insufficient_phrase() {
        let h = harness(
            MockProvider::scripted(vec![MockTurn::text("made-up answer")], nolog()),
            MemoryVectorStore::new(),
        )
        .await;

        let fragments = collect(h.router.route("what is the weather on mars")).await;
        assert_eq!(
            fragments,
            vec![Fragment::text(AnswerSettings::default().insufficient_context)]
        );
        assert_eq!(h.sessions.opened.load(Ordering::SeqCst), 1);
        assert_eq!(h.sessions.closed.load(Ordering::SeqCst), 1);
        assert_eq!(h.sessions.dropped.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_agent_with_tool_returns_answer() {
        let call = ToolCall::new("call_1", "weather", json!({"city": "Paris"}));
        let h = harness(
            MockProvider::scripted(
                vec![MockTurn::calls(vec![call]), MockTurn::text("It is 20 degrees in Paris")],
                nolog(),
            ),
            MemoryVectorStore::new(),
        )
        .await;

        let fragments = collect(h.router.route("how warm is Paris")).await;
        assert_eq!(fragments, vec![Fragment::text("It is 20 degrees in Paris")]);
        assert_eq!(h.sessions.calls.lock().len(), 1);
        assert_eq!(h.sessions.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_agent_with_only_failed_tools_yields_insufficient_phrase() {
        let call = ToolCall::new("call_1", "stock_price", json!({"ticker": "ACME"}));
        let h = harness(
            MockProvider::scripted(
                vec![MockTurn::calls(vec![call]), MockTurn::text("ACME trades at $42")],
                nolog(),
            ),
            MemoryVectorStore::new(),
        )
        .await;

        let fragments = collect(h.router.route("what does ACME trade at")).await;
        assert_eq!(
            fragments,
            vec![Fragment::text(AnswerSettings::default().insufficient_context)]
        );
        assert_eq!(h.sessions.calls.lock().len(), 1);
        assert_eq!(h.sessions.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_abandoned_stream_releases_session() {
        let h = harness(
            MockProvider::chunked(vec!["slow ".into(), "answer".into()], 500, nolog()),
            MemoryVectorStore::new(),
        )
        .await;

        let mut stream = h.router.route("anything at all");
        let pending = tokio::time::timeout(std::time::Duration::from_millis(50), stream.next()).await;
        assert!(pending.is_err());
        drop(stream);

        assert_eq!(h.sessions.opened.load(Ordering::SeqCst), 1);
        assert_eq!(h.sessions.dropped.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retrieval_failure_is_error_fragment() {
        let logger = nolog();
        let registry = Arc::new(ToolRegistry::in_memory(logger.clone()));
        let provider = Arc::new(MockProvider::echo(logger.clone()));
        let generator = Generator::new(provider, ProviderModelConfig::new("mock"), logger.clone());
        let router = QueryRouter::new(
            registry,
            Arc::new(FailingStore),
            generator,
            Arc::new(FakeFactory(Arc::new(SessionLog::default()))),
            RouterSettings::default(),
            logger,
        )
        .unwrap();

        let fragments = collect(router.route("anything")).await;
        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].as_text().is_none());
    }
}
