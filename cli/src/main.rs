//! CLI entrypoint for docent
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use colored::Colorize;
use docent_application::{
    DiagnosticsSink, NoDiagnostics, NoRetriever, NoToolStore, Retriever, RunGenerationInput,
    RunGenerationUseCase, ToolStore,
};
use docent_domain::{ConversationBuilder, OutputFormat, Query};
use docent_infrastructure::{
    ConfigLoader, FileConfig, FileKeywordRetriever, HistoryStore, JsonFileToolStore,
    JsonlDiagnosticsSink, ProviderSettings, ToolManager, create_gateway,
};
use docent_presentation::{
    Cli, ConsoleFormatter, EventFormatter, JsonLinesFormatter, render_events, set_color_enabled,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        println!();
        println!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let issues = config.validate();
    for issue in &issues {
        if issue.is_error() {
            eprintln!("{} {}", "config:".red().bold(), issue);
        } else {
            eprintln!("{} {}", "config:".yellow().bold(), issue);
        }
    }
    if issues.iter().any(|issue| issue.is_error()) {
        bail!("Invalid configuration");
    }

    let Some(query_text) = cli.query.clone() else {
        bail!("A query is required. Run with --help for usage.");
    };
    let query = Query::new(query_text)?;
    let prompt = query.content().to_string();

    set_color_enabled(config.output.color_enabled(cli.no_color));

    // === Dependency Injection ===
    let use_case = build_use_case(&cli, &config)?;
    let retriever = build_retriever(&config)?;

    let history_store = cli.history.as_ref().map(HistoryStore::new);
    let history = match &history_store {
        Some(store) => store.load()?,
        None => Vec::new(),
    };

    let user = cli.user.clone().unwrap_or_else(|| config.agent.user.clone());
    info!(
        "Starting docent (model: {}, user: {}, history: {} turns)",
        use_case.params().model,
        user,
        history.len()
    );

    let input = RunGenerationInput::new(query)
        .with_history(history)
        .with_user(user);
    let generation = use_case.execute(input, retriever);

    // === Output ===
    let format = config
        .output
        .resolve_format(cli.output.map(OutputFormat::from));
    let mut formatter: Box<dyn EventFormatter> = match format {
        OutputFormat::Text => Box::new(ConsoleFormatter::new()),
        OutputFormat::Json => Box::new(JsonLinesFormatter),
    };

    let mut stdout = std::io::stdout();
    let outcome = render_events(generation.into_stream(), formatter.as_mut(), &mut stdout).await?;

    if let Some(limit) = outcome.round_limit {
        warn!("Generation stopped after {} tool rounds", limit);
    }

    if cli.save_history {
        if let Some(store) = &history_store {
            store
                .append(outcome.into_turn(prompt))
                .with_context(|| format!("Failed to save history to {}", store.path().display()))?;
        }
    }

    Ok(())
}

fn build_use_case(cli: &Cli, config: &FileConfig) -> Result<RunGenerationUseCase> {
    let (provider, _) = config.model.parse_provider();
    let timeout = Duration::from_secs(config.tools.timeout_secs);

    let mut settings = ProviderSettings::new(provider).with_connect_timeout(timeout);
    if let Some(base_url) = &config.model.base_url {
        settings = settings.with_base_url(base_url);
    }
    match config.model.resolve_api_key(provider) {
        Some(key) => settings = settings.with_api_key(key),
        None => warn!(
            "No API key found (set {})",
            config.model.api_key_env_name(provider)
        ),
    }
    let gateway = create_gateway(&settings)?;

    let tool_store: Arc<dyn ToolStore> = match &config.tools.store_path {
        Some(path) => Arc::new(JsonFileToolStore::new(path)),
        None => Arc::new(NoToolStore),
    };
    let tool_loader = Arc::new(ToolManager::with_timeout(timeout)?);

    let diagnostics: Arc<dyn DiagnosticsSink> = match config
        .logging
        .diagnostics_path
        .as_ref()
        .and_then(JsonlDiagnosticsSink::new)
    {
        Some(sink) => Arc::new(sink),
        None => Arc::new(NoDiagnostics),
    };

    let mut params = config.execution_params();
    if let Some(model) = &cli.model {
        params = params.with_model(model.clone());
    }

    let builder = ConversationBuilder::new(config.agent.system_prompt());
    Ok(
        RunGenerationUseCase::new(gateway, tool_store, tool_loader, builder)
            .with_params(params)
            .with_diagnostics(diagnostics),
    )
}

fn build_retriever(config: &FileConfig) -> Result<Arc<dyn Retriever>> {
    Ok(match &config.retrieval.documents_path {
        Some(path) => Arc::new(FileKeywordRetriever::load(path, config.retrieval.top_k)?),
        None => Arc::new(NoRetriever),
    })
}
