use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use studyplan::layers::{CancellationToken, LoggingLayer, RetryLayer};
use studyplan::provider::http_transport;
use studyplan::{
    sources_html, GeneratedPlan, PlanError, PlanExecutor, PlannerConfig, SessionContext,
    StudyRequest,
};

const DEFAULT_LOG_LEVEL: &str = "warn";
const ENV_LOG: &str = "STUDYPLAN_LOG";

/// Generate a grounded study plan and print it as HTML
#[derive(Debug, Parser)]
#[command(name = "studyplan", version, about)]
struct Cli {
    /// What you want to learn
    #[arg(long, default_value = "")]
    goal: String,

    /// Number of days the plan should cover
    #[arg(long, default_value = "")]
    days: String,

    /// Study hours available per day
    #[arg(long, default_value = "")]
    hours: String,

    /// Gemini API key
    #[arg(long, env = "STUDYPLAN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model name
    #[arg(long)]
    model: Option<String>,

    /// API base URL
    #[arg(long)]
    api_base: Option<String>,

    /// Maximum attempts per request, including the first
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Per-attempt timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// User id reported by the sign-in backend
    #[arg(long, env = "STUDYPLAN_USER_ID")]
    user_id: Option<String>,

    /// Print the plan as JSON instead of HTML
    #[arg(long)]
    json: bool,

    /// Write output to a file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Log filter directive (overridden by STUDYPLAN_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_level.as_deref()) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("{}", user_facing(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let (study, config) = prepare(&cli)?;
    debug!(
        model = %config.endpoint.model,
        api_base = %config.endpoint.api_base,
        max_attempts = config.retry.max_attempts(),
        timeout = ?config.request_timeout,
        "config loaded"
    );

    let session = match cli.user_id.clone() {
        Some(uid) => SessionContext::signed_in(Some(config.app_id.clone()), Some(uid)),
        None => SessionContext::unauthenticated(Some(config.app_id.clone())),
    };
    eprintln!("{}", session.status_line());

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    let executor = PlanExecutor::builder(http_transport(&config)?, config.endpoint.clone())
        .layer(LoggingLayer::new())
        .layer(
            RetryLayer::new()
                .with_policy(config.retry.clone())
                .with_cancellation(cancel),
        )
        .finish();

    let plan = executor.generate_plan(&study).await?;

    let rendered = if cli.json {
        serde_json::to_string_pretty(&plan)?
    } else {
        render_document(&plan)
    };

    if let Some(path) = &cli.output {
        std::fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display()))?;
    } else {
        println!("{rendered}");
    }

    Ok(())
}

/// Form fields are checked before the configuration is loaded.
fn prepare(cli: &Cli) -> Result<(StudyRequest, PlannerConfig), PlanError> {
    let study = StudyRequest::new(&cli.goal, &cli.days, &cli.hours)?;
    let config = load_config(cli)?;
    Ok((study, config))
}

fn load_config(cli: &Cli) -> Result<PlannerConfig, PlanError> {
    let mut builder = PlannerConfig::env_builder()?;
    if let Some(key) = &cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(model) = &cli.model {
        builder = builder.model(model);
    }
    if let Some(base) = &cli.api_base {
        builder = builder.api_base(base);
    }
    if let Some(n) = cli.max_attempts {
        builder = builder.max_attempts(n);
    }
    if let Some(secs) = cli.timeout_secs {
        builder = builder.request_timeout(Duration::from_secs(secs));
    }
    builder.build()
}

/// Plan body followed by a Sources section when the model cited anything
fn render_document(plan: &GeneratedPlan) -> String {
    if plan.citations.is_empty() {
        return plan.rendered_html.clone();
    }
    format!(
        "{}\n<h3>Sources</h3>\n<ul>{}</ul>",
        plan.rendered_html,
        sources_html(&plan.citations)
    )
}

/// Message shown to the user; internal error kinds only go to the log.
fn user_facing(err: &anyhow::Error) -> String {
    match err.downcast_ref::<PlanError>() {
        Some(PlanError::Configuration(msg)) => format!("Configuration error: {msg}"),
        Some(plan_err) => plan_err.user_message().to_string(),
        None => format!("{err:#}"),
    }
}

fn init_logging(log_level: Option<&str>) -> anyhow::Result<()> {
    // STUDYPLAN_LOG takes precedence over --log-level.
    let filter = EnvFilter::try_from_env(ENV_LOG)
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or(DEFAULT_LOG_LEVEL)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}
