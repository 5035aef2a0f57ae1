//! Run Generation use case.
//!
//! Drives the tool-augmented generation loop: build the prompt, stream the
//! model, execute requested tools, feed results back, and repeat until the
//! model answers without asking for a tool.
//!
//! # Phases
//!
//! ```text
//! BuildingPrompt ─▶ StreamingModel ─▶ Finishing ─▶ Done
//!                     ▲        │
//!                     │        ▼
//!            ExecutingTool ◀─ ToolRequested ──(round limit)──▶ Finishing
//! ```
//!
//! A [`Generation`] is lazy: nothing happens until the caller pulls the next
//! event, and the model is not asked for more output while a tool runs.
//! Dropping it is the only cancellation signal.

use super::tool_invoker::ToolInvoker;
use crate::config::ExecutionParams;
use crate::ports::diagnostics::{ComponentSnapshot, DiagnosticsSink, NoDiagnostics};
use crate::ports::llm_gateway::{GatewayError, LlmGateway, StreamHandle};
use crate::ports::retriever::{Retriever, RetrieverError};
use crate::ports::tool_loader::ToolLoader;
use crate::ports::tool_store::{ToolStore, ToolStoreError};
use docent_domain::util::truncate_str;
use docent_domain::{
    ConversationBuilder, ConversationTurn, ExposedToolSchema, GenerationEvent, Message,
    ParseError, Query, RetrievedDocument, StreamEvent, ToolCallParser, ToolCallRecord,
    ToolCallRequest, ToolSet, UnrepresentableOutput,
};
use futures::Stream;
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that halt a generation.
///
/// Tool execution failures are not listed here: they are recorded as the
/// call's result and the loop continues.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Model stream error: {0}")]
    ModelStream(String),

    #[error("Tool store error: {0}")]
    ToolStore(#[from] ToolStoreError),

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrieverError),

    #[error("Result of '{action}' cannot be embedded in the transcript: {source}")]
    UnrepresentableResult {
        action: String,
        #[source]
        source: UnrepresentableOutput,
    },
}

impl From<GatewayError> for GenerationError {
    fn from(e: GatewayError) -> Self {
        GenerationError::ModelStream(e.to_string())
    }
}

/// Input for the [`RunGenerationUseCase`].
#[derive(Debug, Clone)]
pub struct RunGenerationInput {
    pub query: Query,
    /// Stored history; never modified by the generation.
    pub history: Vec<ConversationTurn>,
    /// User whose enabled tools are loaded.
    pub user: String,
}

impl RunGenerationInput {
    pub fn new(query: Query) -> Self {
        Self {
            query,
            history: Vec::new(),
            user: "local".to_string(),
        }
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }
}

/// Use case for running generations.
///
/// Holds only read-only shared collaborators, so one instance can serve
/// any number of concurrent generations.
pub struct RunGenerationUseCase {
    gateway: Arc<dyn LlmGateway>,
    tool_store: Arc<dyn ToolStore>,
    tool_loader: Arc<dyn ToolLoader>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    builder: ConversationBuilder,
    params: ExecutionParams,
}

impl Clone for RunGenerationUseCase {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            tool_store: self.tool_store.clone(),
            tool_loader: self.tool_loader.clone(),
            diagnostics: self.diagnostics.clone(),
            builder: self.builder.clone(),
            params: self.params.clone(),
        }
    }
}

impl RunGenerationUseCase {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        tool_store: Arc<dyn ToolStore>,
        tool_loader: Arc<dyn ToolLoader>,
        builder: ConversationBuilder,
    ) -> Self {
        Self {
            gateway,
            tool_store,
            tool_loader,
            diagnostics: Arc::new(NoDiagnostics),
            builder,
            params: ExecutionParams::default(),
        }
    }

    /// Create with a diagnostics sink.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &ExecutionParams {
        &self.params
    }

    /// Start a generation. No work happens until the first event is pulled.
    pub fn execute(&self, input: RunGenerationInput, retriever: Arc<dyn Retriever>) -> Generation {
        let parser = ToolCallParser::for_provider(self.gateway.provider());
        info!(
            "Starting generation for user '{}': {}",
            input.user,
            truncate_str(input.query.content(), 100)
        );

        Generation {
            gateway: self.gateway.clone(),
            tool_store: self.tool_store.clone(),
            diagnostics: self.diagnostics.clone(),
            invoker: ToolInvoker::new(self.tool_loader.clone(), parser),
            builder: self.builder.clone(),
            params: self.params.clone(),
            input,
            retriever,
            phase: Phase::BuildingPrompt,
            messages: Vec::new(),
            tools: ToolSet::new(),
            schemas: Vec::new(),
            stream: None,
            pending: VecDeque::new(),
            rounds: 0,
            retrieved: Vec::new(),
            records: Vec::new(),
            trailing: VecDeque::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    BuildingPrompt,
    StreamingModel,
    ToolRequested,
    ExecutingTool,
    Finishing,
    Done,
}

/// One in-flight generation.
///
/// Owns its transcript and the append-only log of executed tool calls.
pub struct Generation {
    gateway: Arc<dyn LlmGateway>,
    tool_store: Arc<dyn ToolStore>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    invoker: ToolInvoker,
    builder: ConversationBuilder,
    params: ExecutionParams,
    input: RunGenerationInput,
    retriever: Arc<dyn Retriever>,

    phase: Phase,
    messages: Vec<Message>,
    tools: ToolSet,
    schemas: Vec<ExposedToolSchema>,
    stream: Option<StreamHandle>,
    /// Calls requested in the current model turn, executed once it ends
    pending: VecDeque<ToolCallRequest>,
    rounds: usize,
    retrieved: Vec<RetrievedDocument>,
    records: Vec<ToolCallRecord>,
    trailing: VecDeque<GenerationEvent>,
}

impl Generation {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Every tool call fully executed so far, in order.
    pub fn tool_calls(&self) -> &[ToolCallRecord] {
        &self.records
    }

    /// Current transcript (grows with each executed tool call).
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Pull the next event. `None` once the generation is over.
    ///
    /// An `Err` item is always the last item.
    pub async fn next_event(&mut self) -> Option<Result<GenerationEvent, GenerationError>> {
        loop {
            match self.phase {
                Phase::BuildingPrompt => match self.build_prompt().await {
                    Ok(()) => self.phase = Phase::StreamingModel,
                    Err(e) => return Some(Err(self.fail(e))),
                },
                Phase::StreamingModel => {
                    let Some(stream) = self.stream.as_mut() else {
                        self.phase = Phase::Finishing;
                        continue;
                    };
                    match stream.next_event().await {
                        Some(StreamEvent::Delta(text)) => {
                            if !text.is_empty() {
                                return Some(Ok(GenerationEvent::Answer(text)));
                            }
                        }
                        Some(StreamEvent::ToolCall(call)) => {
                            debug!("Model requested tool: {}", call.name);
                            self.pending.push_back(call);
                        }
                        Some(StreamEvent::Error(message)) => {
                            return Some(Err(self.fail(GenerationError::ModelStream(message))));
                        }
                        None => {
                            return Some(Err(self.fail(GenerationError::ModelStream(
                                "model stream ended before completion".to_string(),
                            ))));
                        }
                        Some(StreamEvent::Completed) => {
                            self.stream = None;
                            self.phase = if self.pending.is_empty() {
                                Phase::Finishing
                            } else {
                                Phase::ToolRequested
                            };
                        }
                    }
                }
                Phase::ToolRequested => {
                    self.rounds += 1;
                    let limit = self.params.max_tool_rounds;
                    if self.rounds > limit {
                        warn!(
                            "Generation exceeded max_tool_rounds ({}); dropping {} requested call(s)",
                            limit,
                            self.pending.len()
                        );
                        self.pending.clear();
                        self.phase = Phase::Finishing;
                        return Some(Ok(GenerationEvent::RoundLimitReached { limit }));
                    }
                    debug!(
                        "Tool round {}/{}: {} call(s)",
                        self.rounds,
                        limit,
                        self.pending.len()
                    );
                    self.phase = Phase::ExecutingTool;
                }
                Phase::ExecutingTool => match self.pending.pop_front() {
                    Some(call) => match self.invoker.handle(&self.tools, call).await {
                        Ok(record) => {
                            ConversationBuilder::append_tool_exchange(&mut self.messages, &record);
                            self.records.push(record.clone());
                            return Some(Ok(GenerationEvent::ToolCall(record)));
                        }
                        Err(e) => return Some(Err(self.fail(e))),
                    },
                    None => {
                        self.diagnostics.record(ComponentSnapshot::new(
                            "llm_handler",
                            serde_json::json!({
                                "parser": format!("{:?}", self.invoker.parser()),
                                "round": self.rounds,
                                "tool_calls": self.records.len(),
                            }),
                        ));
                        match self.start_stream().await {
                            Ok(()) => self.phase = Phase::StreamingModel,
                            Err(e) => return Some(Err(self.fail(e))),
                        }
                    }
                },
                Phase::Finishing => {
                    if !self.retrieved.is_empty() {
                        self.trailing
                            .push_back(GenerationEvent::Sources(self.retrieved.clone()));
                    }
                    if !self.records.is_empty() {
                        self.trailing
                            .push_back(GenerationEvent::ToolCalls(self.records.clone()));
                    }
                    info!("Generation completed in {} tool round(s)", self.rounds);
                    self.phase = Phase::Done;
                }
                Phase::Done => return self.trailing.pop_front().map(Ok),
            }
        }
    }

    /// Turn the generation into a [`Stream`] of events.
    pub fn into_stream(self) -> impl Stream<Item = Result<GenerationEvent, GenerationError>> + Send {
        futures::stream::unfold(self, |mut generation| async move {
            generation
                .next_event()
                .await
                .map(|event| (event, generation))
        })
    }

    async fn build_prompt(&mut self) -> Result<(), GenerationError> {
        let query = self.input.query.content().to_string();

        self.retrieved = self.retriever.search(&query).await?;
        self.diagnostics
            .record(ComponentSnapshot::new("retriever", self.retriever.snapshot()));
        debug!("Retrieved {} document(s)", self.retrieved.len());

        self.tools = self.tool_store.list_active_tools(&self.input.user).await?;
        self.schemas = self.tools.exposed_schemas();
        debug!(
            "{} active tool(s), {} exposed function(s)",
            self.tools.len(),
            self.schemas.len()
        );

        self.messages = self
            .builder
            .build(&query, &self.retrieved, &self.input.history);

        self.start_stream().await
    }

    async fn start_stream(&mut self) -> Result<(), GenerationError> {
        let handle = self
            .gateway
            .stream_generate(&self.params.model, &self.messages, &self.schemas)
            .await?;
        self.diagnostics
            .record(ComponentSnapshot::new("llm", self.gateway.snapshot()));
        self.stream = Some(handle);
        Ok(())
    }

    fn fail(&mut self, error: GenerationError) -> GenerationError {
        warn!("Generation halted: {}", error);
        self.stream = None;
        self.pending.clear();
        self.trailing.clear();
        self.phase = Phase::Done;
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::retriever::NoRetriever;
    use crate::ports::tool_loader::Tool;
    use async_trait::async_trait;
    use docent_domain::{
        ContentPart, ParamLocation, ParameterField, ParameterGroup, ProviderKind, Role,
        ToolAction, ToolDefinition, ToolError, ToolOutput,
    };
    use futures::StreamExt;
    use serde_json::{Map, Value, json};
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    // ==================== Test Mocks ====================

    struct MockGateway {
        provider: ProviderKind,
        turns: Mutex<VecDeque<Vec<StreamEvent>>>,
        requests: Mutex<Vec<Vec<Message>>>,
    }

    impl MockGateway {
        fn new(turns: Vec<Vec<StreamEvent>>) -> Self {
            Self {
                provider: ProviderKind::OpenAi,
                turns: Mutex::new(VecDeque::from(turns)),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn with_provider(mut self, provider: ProviderKind) -> Self {
            self.provider = provider;
            self
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn request(&self, index: usize) -> Vec<Message> {
            self.requests.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl LlmGateway for MockGateway {
        fn provider(&self) -> ProviderKind {
            self.provider
        }

        async fn stream_generate(
            &self,
            _model: &str,
            messages: &[Message],
            _tools: &[ExposedToolSchema],
        ) -> Result<StreamHandle, GatewayError> {
            self.requests.lock().unwrap().push(messages.to_vec());
            let events = self
                .turns
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| GatewayError::Other("No more responses".to_string()))?;
            let (tx, rx) = mpsc::channel(events.len() + 1);
            for event in events {
                tx.try_send(event).unwrap();
            }
            Ok(StreamHandle::new(rx))
        }
    }

    struct MockStore {
        tools: ToolSet,
    }

    #[async_trait]
    impl ToolStore for MockStore {
        async fn list_active_tools(&self, _user: &str) -> Result<ToolSet, ToolStoreError> {
            Ok(self.tools.clone())
        }
    }

    #[derive(Clone)]
    enum Behavior {
        Succeed(ToolOutput),
        Fail(ToolError),
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Executed {
        kind: String,
        config: Value,
        action: String,
        arguments: Map<String, Value>,
    }

    struct MockLoader {
        behavior: Behavior,
        executed: Arc<Mutex<Vec<Executed>>>,
    }

    impl MockLoader {
        fn new(behavior: Behavior) -> Self {
            Self {
                behavior,
                executed: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    struct MockTool {
        kind: String,
        config: Value,
        behavior: Behavior,
        executed: Arc<Mutex<Vec<Executed>>>,
    }

    #[async_trait]
    impl Tool for MockTool {
        async fn execute(
            &self,
            action_name: &str,
            arguments: &Map<String, Value>,
        ) -> Result<ToolOutput, ToolError> {
            self.executed.lock().unwrap().push(Executed {
                kind: self.kind.clone(),
                config: self.config.clone(),
                action: action_name.to_string(),
                arguments: arguments.clone(),
            });
            match &self.behavior {
                Behavior::Succeed(output) => Ok(output.clone()),
                Behavior::Fail(e) => Err(e.clone()),
            }
        }
    }

    impl ToolLoader for MockLoader {
        fn load(&self, kind: &str, config: &Value) -> Result<Box<dyn Tool>, ToolError> {
            Ok(Box::new(MockTool {
                kind: kind.to_string(),
                config: config.clone(),
                behavior: self.behavior.clone(),
                executed: self.executed.clone(),
            }))
        }
    }

    struct MockRetriever {
        docs: Vec<RetrievedDocument>,
    }

    #[async_trait]
    impl Retriever for MockRetriever {
        async fn search(&self, _query: &str) -> Result<Vec<RetrievedDocument>, RetrieverError> {
            Ok(self.docs.clone())
        }

        fn snapshot(&self) -> Value {
            json!({"chunks": self.docs.len()})
        }
    }

    #[derive(Default)]
    struct RecordingDiagnostics {
        components: Mutex<Vec<&'static str>>,
    }

    impl DiagnosticsSink for RecordingDiagnostics {
        fn record(&self, snapshot: ComponentSnapshot) {
            self.components.lock().unwrap().push(snapshot.component);
        }
    }

    // ==================== Helpers ====================

    fn forecast_tools() -> ToolSet {
        ToolSet::new().register(
            ToolDefinition::new("abc123", "api_tool").with_action(
                ToolAction::new("get_forecast", "Weather forecast")
                    .with_endpoint("GET", "https://api.example.com/forecast")
                    .with_group(
                        ParamLocation::QueryParams,
                        ParameterGroup::new()
                            .with_field("city", ParameterField::new("string"))
                            .with_field("units", ParameterField::fixed("string", "metric")),
                    ),
            ),
        )
    }

    fn forecast_call(id: Option<&str>) -> StreamEvent {
        let call = ToolCallRequest::new("get_forecast_abc123", r#"{"city":"Oslo"}"#);
        StreamEvent::ToolCall(match id {
            Some(id) => call.with_id(id),
            None => call,
        })
    }

    fn answer(text: &str) -> Vec<StreamEvent> {
        vec![StreamEvent::Delta(text.to_string()), StreamEvent::Completed]
    }

    fn use_case(
        gateway: Arc<MockGateway>,
        tools: ToolSet,
        loader: Arc<MockLoader>,
    ) -> RunGenerationUseCase {
        RunGenerationUseCase::new(
            gateway,
            Arc::new(MockStore { tools }),
            loader,
            ConversationBuilder::new("Sources:\n{summaries}"),
        )
    }

    fn input(query: &str) -> RunGenerationInput {
        RunGenerationInput::new(Query::new(query).unwrap())
    }

    async fn drain(
        generation: &mut Generation,
    ) -> Vec<Result<GenerationEvent, GenerationError>> {
        let mut items = Vec::new();
        while let Some(item) = generation.next_event().await {
            items.push(item);
        }
        items
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_plain_answer_streams_fragments() {
        let gateway = Arc::new(MockGateway::new(vec![vec![
            StreamEvent::Delta("Hel".into()),
            StreamEvent::Delta("lo".into()),
            StreamEvent::Completed,
        ]]));
        let loader = Arc::new(MockLoader::new(Behavior::Succeed(json!({}).into())));
        let uc = use_case(gateway.clone(), ToolSet::new(), loader);

        let mut generation = uc.execute(input("hi"), Arc::new(NoRetriever));
        let items = drain(&mut generation).await;

        let events: Vec<_> = items.into_iter().map(Result::unwrap).collect();
        assert_eq!(
            events,
            vec![
                GenerationEvent::Answer("Hel".into()),
                GenerationEvent::Answer("lo".into()),
            ]
        );
        assert_eq!(gateway.request_count(), 1);
        assert_eq!(generation.phase(), Phase::Done);
        assert!(generation.tool_calls().is_empty());
    }

    #[tokio::test]
    async fn test_tool_call_then_answer() {
        let gateway = Arc::new(MockGateway::new(vec![
            vec![forecast_call(Some("call_1")), StreamEvent::Completed],
            answer("Sunny in Oslo"),
        ]));
        let loader = Arc::new(MockLoader::new(Behavior::Succeed(
            json!({"status_code": 200, "data": {"sky": "clear"}}).into(),
        )));
        let uc = use_case(gateway.clone(), forecast_tools(), loader.clone());

        let mut generation = uc.execute(input("weather in Oslo?"), Arc::new(NoRetriever));
        let events: Vec<_> = drain(&mut generation)
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();

        assert_eq!(events.len(), 3);
        let GenerationEvent::ToolCall(record) = &events[0] else {
            panic!("expected tool call notice, got {:?}", events[0]);
        };
        assert_eq!(record.tool_name, "api_tool");
        assert_eq!(record.call_id.as_deref(), Some("call_1"));
        assert_eq!(record.action_name, "get_forecast_abc123");
        assert_eq!(record.arguments["city"], "Oslo");
        assert_eq!(record.result["data"]["sky"], "clear");
        assert_eq!(events[1], GenerationEvent::Answer("Sunny in Oslo".into()));
        assert_eq!(events[2], GenerationEvent::ToolCalls(vec![record.clone()]));

        // api_tool: endpoint and bound query params in config, body as arguments
        let executed = loader.executed.lock().unwrap().clone();
        assert_eq!(executed.len(), 1);
        assert_eq!(executed[0].kind, "api_tool");
        assert_eq!(executed[0].action, "get_forecast");
        assert_eq!(executed[0].config["url"], "https://api.example.com/forecast");
        assert_eq!(
            executed[0].config["query_params"],
            json!({"city": "Oslo", "units": "metric"})
        );
        assert!(executed[0].arguments.is_empty());

        // Second model turn sees the query followed by the call/response pair
        let second = gateway.request(1);
        assert_eq!(second.len(), 4);
        assert_eq!(second[1], Message::user("weather in Oslo?"));
        assert_eq!(second[2].role, Role::Assistant);
        assert_eq!(second[3].role, Role::Tool);
        assert_eq!(second[2].parts()[0].call_id(), "call_1");
        assert_eq!(second[3].parts()[0].call_id(), "call_1");
    }

    #[tokio::test]
    async fn test_unknown_tool_halts_without_record() {
        let gateway = Arc::new(MockGateway::new(vec![vec![
            forecast_call(Some("call_1")),
            StreamEvent::Completed,
        ]]));
        let loader = Arc::new(MockLoader::new(Behavior::Succeed(json!({}).into())));
        let uc = use_case(gateway.clone(), ToolSet::new(), loader.clone());

        let mut generation = uc.execute(input("weather?"), Arc::new(NoRetriever));
        let items = drain(&mut generation).await;

        assert_eq!(items.len(), 1);
        assert!(matches!(
            &items[0],
            Err(GenerationError::Parse(ParseError::UnknownTool(name))) if name == "get_forecast_abc123"
        ));
        assert!(generation.tool_calls().is_empty());
        assert!(loader.executed.lock().unwrap().is_empty());
        assert_eq!(gateway.request_count(), 1);
    }

    #[tokio::test]
    async fn test_inactive_action_is_configuration_error() {
        let tools = ToolSet::new().register(
            ToolDefinition::new("abc123", "api_tool").with_action(
                ToolAction::new("get_forecast", "")
                    .with_endpoint("GET", "https://api.example.com")
                    .inactive(),
            ),
        );
        let gateway = Arc::new(MockGateway::new(vec![vec![
            forecast_call(None),
            StreamEvent::Completed,
        ]]));
        let loader = Arc::new(MockLoader::new(Behavior::Succeed(json!({}).into())));
        let uc = use_case(gateway, tools, loader);

        let items = drain(&mut uc.execute(input("q"), Arc::new(NoRetriever))).await;
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(GenerationError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_execution_error_is_recorded_and_loop_continues() {
        let gateway = Arc::new(MockGateway::new(vec![
            vec![forecast_call(Some("call_1")), StreamEvent::Completed],
            answer("The weather service is down."),
        ]));
        let loader = Arc::new(MockLoader::new(Behavior::Fail(ToolError::execution_failed(
            "network error: connection refused",
        ))));
        let uc = use_case(gateway.clone(), forecast_tools(), loader);

        let mut generation = uc.execute(input("weather?"), Arc::new(NoRetriever));
        let events: Vec<_> = drain(&mut generation)
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();

        assert_eq!(gateway.request_count(), 2);
        let record = &generation.tool_calls()[0];
        assert!(record.is_error());
        assert!(
            record.result["error"]
                .as_str()
                .unwrap()
                .contains("connection refused")
        );
        assert_eq!(
            events[1],
            GenerationEvent::Answer("The weather service is down.".into())
        );

        // The failure is fed back to the model
        let second = gateway.request(1);
        let ContentPart::FunctionResponse(response) = &second[3].parts()[0] else {
            panic!("expected function response");
        };
        assert!(response.response.result.get("error").is_some());
    }

    #[tokio::test]
    async fn test_missing_call_id_gets_stable_placeholder() {
        let gateway = Arc::new(MockGateway::new(vec![
            vec![forecast_call(None), StreamEvent::Completed],
            answer("done"),
        ]));
        let loader = Arc::new(MockLoader::new(Behavior::Succeed(json!("ok").into())));
        let uc = use_case(gateway.clone(), forecast_tools(), loader);

        let mut generation = uc.execute(input("q"), Arc::new(NoRetriever));
        drain(&mut generation).await;

        let call_id = generation.tool_calls()[0].call_id.clone().unwrap();
        assert!(call_id.starts_with("call_"));
        let second = gateway.request(1);
        assert_eq!(second[2].parts()[0].call_id(), call_id);
        assert_eq!(second[3].parts()[0].call_id(), call_id);
    }

    #[tokio::test]
    async fn test_round_limit_stops_generation() {
        let gateway = Arc::new(MockGateway::new(vec![
            vec![forecast_call(Some("a")), StreamEvent::Completed],
            vec![forecast_call(Some("b")), StreamEvent::Completed],
        ]));
        let loader = Arc::new(MockLoader::new(Behavior::Succeed(json!(1).into())));
        let uc = use_case(gateway.clone(), forecast_tools(), loader.clone())
            .with_params(ExecutionParams::default().with_max_tool_rounds(1));

        let mut generation = uc.execute(input("q"), Arc::new(NoRetriever));
        let events: Vec<_> = drain(&mut generation)
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();

        assert!(matches!(events[0], GenerationEvent::ToolCall(_)));
        assert_eq!(events[1], GenerationEvent::RoundLimitReached { limit: 1 });
        assert!(matches!(&events[2], GenerationEvent::ToolCalls(records) if records.len() == 1));
        assert_eq!(events.len(), 3);
        assert_eq!(loader.executed.lock().unwrap().len(), 1);
        assert_eq!(gateway.request_count(), 2);
    }

    #[tokio::test]
    async fn test_calls_in_one_turn_run_in_order_as_one_round() {
        let gateway = Arc::new(MockGateway::new(vec![
            vec![
                StreamEvent::Delta("Checking".into()),
                forecast_call(Some("a")),
                StreamEvent::ToolCall(
                    ToolCallRequest::new("get_forecast_abc123", r#"{"city":"Bergen"}"#)
                        .with_id("b"),
                ),
                StreamEvent::Completed,
            ],
            answer("Both sunny"),
        ]));
        let loader = Arc::new(MockLoader::new(Behavior::Succeed(json!("ok").into())));
        let uc = use_case(gateway.clone(), forecast_tools(), loader.clone())
            .with_params(ExecutionParams::default().with_max_tool_rounds(1));

        let mut generation = uc.execute(input("q"), Arc::new(NoRetriever));
        let events: Vec<_> = drain(&mut generation)
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();

        assert_eq!(events[0], GenerationEvent::Answer("Checking".into()));
        assert_eq!(events[3], GenerationEvent::Answer("Both sunny".into()));
        let ids: Vec<_> = generation
            .tool_calls()
            .iter()
            .map(|r| r.call_id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(gateway.request(1).len(), 2 + 4);
    }

    #[tokio::test]
    async fn test_model_stream_error_is_fatal() {
        let gateway = Arc::new(MockGateway::new(vec![vec![
            StreamEvent::Delta("Par".into()),
            StreamEvent::Error("upstream 500".into()),
        ]]));
        let loader = Arc::new(MockLoader::new(Behavior::Succeed(json!({}).into())));
        let uc = use_case(gateway, ToolSet::new(), loader);

        let items = drain(&mut uc.execute(input("q"), Arc::new(NoRetriever))).await;
        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(GenerationError::ModelStream(ref m)) if m == "upstream 500"));
    }

    #[tokio::test]
    async fn test_stream_closed_before_completion_is_fatal() {
        let gateway = Arc::new(MockGateway::new(vec![vec![StreamEvent::Delta(
            "partial".into(),
        )]]));
        let loader = Arc::new(MockLoader::new(Behavior::Succeed(json!({}).into())));
        let uc = use_case(gateway, ToolSet::new(), loader);

        let mut generation = uc.execute(input("q"), Arc::new(NoRetriever));
        let items = drain(&mut generation).await;
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].as_ref().unwrap(),
            &GenerationEvent::Answer("partial".into())
        );
        assert!(matches!(
            items[1],
            Err(GenerationError::ModelStream(ref m)) if m == "model stream ended before completion"
        ));
        assert_eq!(generation.phase(), Phase::Done);
    }

    #[tokio::test]
    async fn test_google_object_arguments_without_call_id() {
        let gateway = Arc::new(
            MockGateway::new(vec![
                vec![
                    StreamEvent::ToolCall(ToolCallRequest::new(
                        "get_forecast_abc123",
                        json!({"city": "Oslo"}),
                    )),
                    StreamEvent::Completed,
                ],
                answer("Cloudy"),
            ])
            .with_provider(ProviderKind::Google),
        );
        let loader = Arc::new(MockLoader::new(Behavior::Succeed(json!("ok").into())));
        let uc = use_case(gateway.clone(), forecast_tools(), loader.clone());

        let mut generation = uc.execute(input("q"), Arc::new(NoRetriever));
        assert_eq!(generation.invoker.parser(), ToolCallParser::Google);
        let items = drain(&mut generation).await;
        assert!(items.iter().all(Result::is_ok));

        let record = &generation.tool_calls()[0];
        assert_eq!(record.arguments["city"], "Oslo");
        let call_id = record.call_id.clone().unwrap();
        assert!(call_id.starts_with("call_"));

        let second = gateway.request(1);
        assert_eq!(second[2].parts()[0].call_id(), call_id);
        assert_eq!(second[3].parts()[0].call_id(), call_id);
        assert_eq!(loader.executed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unrepresentable_result_is_generation_error() {
        let gateway = Arc::new(MockGateway::new(vec![vec![
            forecast_call(Some("c")),
            StreamEvent::Completed,
        ]]));
        let loader = Arc::new(MockLoader::new(Behavior::Succeed(ToolOutput::Binary(vec![
            0xff, 0xd8, 0xff,
        ]))));
        let uc = use_case(gateway, forecast_tools(), loader);

        let mut generation = uc.execute(input("q"), Arc::new(NoRetriever));
        let items = drain(&mut generation).await;
        assert_eq!(items.len(), 1);
        assert!(matches!(
            &items[0],
            Err(GenerationError::UnrepresentableResult { action, .. }) if action == "get_forecast_abc123"
        ));
        assert!(generation.tool_calls().is_empty());
    }

    #[tokio::test]
    async fn test_stopping_early_keeps_executed_records() {
        let gateway = Arc::new(MockGateway::new(vec![
            vec![forecast_call(Some("call_1")), StreamEvent::Completed],
            answer("never pulled"),
        ]));
        let loader = Arc::new(MockLoader::new(Behavior::Succeed(json!("ok").into())));
        let uc = use_case(gateway.clone(), forecast_tools(), loader);

        let mut generation = uc.execute(input("q"), Arc::new(NoRetriever));
        let first = generation.next_event().await.unwrap().unwrap();

        assert!(matches!(first, GenerationEvent::ToolCall(_)));
        assert_eq!(generation.tool_calls().len(), 1);
        // The next model turn has not been requested yet
        assert_eq!(gateway.request_count(), 1);
    }

    #[tokio::test]
    async fn test_sources_and_diagnostics() {
        let gateway = Arc::new(MockGateway::new(vec![
            vec![forecast_call(Some("c")), StreamEvent::Completed],
            answer("ok"),
        ]));
        let loader = Arc::new(MockLoader::new(Behavior::Succeed(json!("ok").into())));
        let diagnostics = Arc::new(RecordingDiagnostics::default());
        let uc = use_case(gateway.clone(), forecast_tools(), loader)
            .with_diagnostics(diagnostics.clone());
        let docs = vec![RetrievedDocument::new("Oslo is in Norway")];

        let events: Vec<_> = uc
            .execute(input("q"), Arc::new(MockRetriever { docs: docs.clone() }))
            .into_stream()
            .map(Result::unwrap)
            .collect()
            .await;

        assert_eq!(events[2], GenerationEvent::Sources(docs));
        assert!(matches!(events[3], GenerationEvent::ToolCalls(_)));
        assert_eq!(
            gateway.request(0)[0].as_text(),
            Some("Sources:\nOslo is in Norway")
        );
        assert_eq!(
            *diagnostics.components.lock().unwrap(),
            vec!["retriever", "llm", "llm_handler", "llm"]
        );
    }

    #[tokio::test]
    async fn test_history_is_not_modified() {
        let history = vec![ConversationTurn::exchange("hi", "hello")];
        let gateway = Arc::new(MockGateway::new(vec![
            vec![forecast_call(Some("c")), StreamEvent::Completed],
            answer("ok"),
        ]));
        let loader = Arc::new(MockLoader::new(Behavior::Succeed(json!("ok").into())));
        let uc = use_case(gateway.clone(), forecast_tools(), loader);

        let mut generation = uc.execute(
            input("what's the weather").with_history(history.clone()),
            Arc::new(NoRetriever),
        );
        drain(&mut generation).await;

        assert_eq!(generation.input.history, history);
        assert_eq!(gateway.request(0).len(), 4);
        assert_eq!(gateway.request(1).len(), 6);
    }
}
