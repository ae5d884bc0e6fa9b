//! CLI entrypoint for redraft
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use redraft_application::{
    AgentPorts, AgentRegistry, Classifier, EventSink, Guardrail, GuardrailSet, ModelClient,
    ModelGuardrail, ModelProfile, PipelineEvent, PipelineOutput, PromptRenderer, ReviewPanel,
    Reviewer, RevisionController, RuleGuardrail, StopReason,
};
use redraft_domain::{Category, QualityScore, StoppingPolicy, TaskInput};
use redraft_infrastructure::{
    ConfigLoader, FileConfig, HttpModelClient, JsonlEventSink, KeywordMemoryStore,
    TemplateCatalog, TracingEventSink,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Final draft plus provenance
    Full,
    /// Draft body only
    Draft,
    /// Machine-readable JSON
    Json,
}

/// Run a writing task through specialist drafting, panel review, and
/// guarded revision rounds.
#[derive(Debug, Parser)]
#[command(name = "redraft", version, about)]
struct Cli {
    /// The task to draft content for
    task: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Trusted category hint; skips classification
    #[arg(long)]
    category: Option<Category>,

    /// Maximum revision rounds after the first review
    #[arg(long)]
    max_rounds: Option<usize>,

    /// Path to an explicit config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Full)]
    output: OutputFormat,

    /// Generate and review once, without revising
    #[arg(long)]
    no_revision: bool,

    /// Append pipeline events to this JSONL file
    #[arg(long)]
    events: Option<PathBuf>,
}

/// Delivers every event to each attached sink
struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl EventSink for FanoutSink {
    fn record(&self, event: PipelineEvent) {
        for sink in &self.sinks {
            sink.record(event.clone());
        }
    }
}

fn build_event_sink(cli: &Cli, config: &FileConfig) -> Arc<dyn EventSink> {
    let mut sinks: Vec<Arc<dyn EventSink>> = vec![Arc::new(TracingEventSink)];

    let jsonl_path = cli
        .events
        .clone()
        .or_else(|| config.events.jsonl_path.as_ref().map(PathBuf::from));
    if let Some(path) = jsonl_path
        && let Some(sink) = JsonlEventSink::new(&path)
    {
        info!("Recording pipeline events to {}", path.display());
        sinks.push(Arc::new(sink));
    }

    Arc::new(FanoutSink { sinks })
}

fn build_controller(
    cli: &Cli,
    config: &FileConfig,
    events: Arc<dyn EventSink>,
) -> RevisionController {
    let mut model = HttpModelClient::new(&config.model.endpoint);
    if let Ok(api_key) = std::env::var(&config.model.api_key_env) {
        model = model.with_api_key(api_key);
    }
    if let Some(secs) = config.model.timeout_seconds {
        model = model.with_timeout(Duration::from_secs(secs));
    }
    let model: Arc<dyn ModelClient> = Arc::new(model);
    let renderer: Arc<dyn PromptRenderer> = Arc::new(TemplateCatalog::new());
    let memory = Arc::new(KeywordMemoryStore::new(config.memory.passages.clone()));
    let profile = ModelProfile::new(&config.model.name, config.model.temperature as f32);

    let classifier = Classifier::new(
        model.clone(),
        renderer.clone(),
        events.clone(),
        profile.clone(),
    );
    let registry = AgentRegistry::new(
        AgentPorts {
            model: model.clone(),
            renderer: renderer.clone(),
        },
        memory,
        profile.clone(),
    );

    let reviewers = config
        .review
        .reviewers_or_default()
        .into_iter()
        .map(|r| {
            Arc::new(Reviewer::new(
                r.persona.as_str(),
                r.focus,
                model.clone(),
                renderer.clone(),
                profile.clone(),
            ))
        })
        .collect();
    let panel = ReviewPanel::new(reviewers, events.clone())
        .with_min_delivered(config.review.min_delivered);

    let input_rules: Arc<dyn Guardrail> = Arc::new(
        RuleGuardrail::new("input-rules", config.guardrails.max_input_len)
            .with_deny_phrases(config.guardrails.deny_phrases.clone()),
    );
    let input_guardrails = GuardrailSet::new(vec![input_rules], events.clone());

    let output_checks: Vec<Arc<dyn Guardrail>> = config
        .guardrails
        .output_checks
        .iter()
        .map(|c| {
            Arc::new(ModelGuardrail::new(
                c.name.clone(),
                c.condition.clone(),
                model.clone(),
                renderer.clone(),
                profile.clone(),
            )) as Arc<dyn Guardrail>
        })
        .collect();
    let output_guardrails = GuardrailSet::new(output_checks, events.clone());

    let max_rounds = if cli.no_revision {
        0
    } else {
        cli.max_rounds.unwrap_or(config.pipeline.max_rounds)
    };
    let mut policy = StoppingPolicy::new(max_rounds);
    if let Some(threshold) = config.pipeline.quality_threshold {
        policy = policy.with_quality_threshold(QualityScore::new(threshold));
    }
    if !config.pipeline.regression_guard {
        policy = policy.without_regression_guard();
    }

    let mut controller = RevisionController::new(classifier, registry, panel, events)
        .with_input_guardrails(input_guardrails)
        .with_output_guardrails(output_guardrails)
        .with_policy(policy)
        .with_review_retries(config.pipeline.review_retries);
    if let Some(secs) = config.pipeline.deadline_seconds {
        controller = controller.with_deadline(Duration::from_secs(secs));
    }
    controller
}

fn describe_stop(reason: StopReason) -> String {
    match reason {
        StopReason::MaxRounds => "revision limit reached".to_string(),
        StopReason::QualityMet => "quality threshold met".to_string(),
        StopReason::Regressed { returned_round } => {
            format!("quality regressed; returned round {}", returned_round)
        }
        StopReason::DeadlineReached => "deadline reached; best reviewed draft".to_string(),
    }
}

fn print_output(output: &PipelineOutput, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Draft => {
            println!("{}", output.draft.body);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(output)?);
        }
        OutputFormat::Full => {
            println!("# {}", output.draft.title);
            println!();
            println!("{}", output.draft.body);
            if !output.draft.metadata.is_empty() {
                println!();
                for (key, value) in &output.draft.metadata {
                    println!("{}: {}", key, value);
                }
            }
            let p = &output.provenance;
            println!();
            println!(
                "[{} | rounds: {} | reviewers: {} ok / {} failed | quality: {:.2} | {}]",
                p.category,
                p.rounds,
                p.contributed,
                p.failed,
                p.quality.value(),
                describe_stop(p.stop_reason),
            );
        }
    }
    Ok(())
}

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
        .with_target(false)
        .init();

    let config = ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow::anyhow!(e))
        .context("Could not load configuration")?;
    config.validate().context("Invalid configuration")?;

    let task = match &cli.task {
        Some(t) => t.clone(),
        None => bail!("A task is required. See --help for usage."),
    };
    let Some(mut input) = TaskInput::try_new(task) else {
        bail!("Task cannot be empty.");
    };
    if let Some(category) = cli.category {
        input = input.with_hint(category);
    }

    // === Dependency Injection ===
    let events = build_event_sink(&cli, &config);
    let controller = build_controller(&cli, &config, events);

    info!("Starting redraft pipeline");

    match controller.run(&input).await {
        Ok(output) => print_output(&output, cli.output),
        Err(e) => {
            eprintln!("Pipeline aborted at stage '{}': {}", e.stage(), e);
            if let Some(draft) = e.last_good_draft() {
                eprintln!();
                eprintln!("Last good draft:");
                println!("# {}", draft.title);
                println!();
                println!("{}", draft.body);
            }
            std::process::exit(1)
        }
    }
}
