use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

use chapter_ops::config::{AppConfig, PropertiesHandle};
use chapter_ops::error::AppError;
use chapter_ops::events::{events_router, EventsState, TracingMessenger};
use chapter_ops::members::{members_router, MembersState};
use chapter_ops::store::{
    MemoryChallenges, MemoryCommitteeships, MemoryCoursesurveys, MemoryEvents, MemoryKlasses,
    MemoryPeople, MemorySurveyRecords,
};
use chapter_ops::surveys::{
    surveys_router, ImportFormat, SurveyAdmin, SurveyImportError, SurveyImporter,
    SurveyRecordRepository, SurveysState,
};
use chapter_ops::telemetry;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "chapter-ops",
    about = "Run the chapter administration service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Course-survey administration without the HTTP server
    Surveys {
        #[command(subcommand)]
        command: SurveysCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum SurveysCommand {
    /// Parse a survey export, report problems, and optionally commit it
    Import(ImportArgs),
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// Path to the CSV export
    #[arg(long)]
    csv: PathBuf,
    /// Persist the parsed rows instead of dry-running
    #[arg(long)]
    commit: bool,
    /// Treat the rows as teaching-assistant surveys
    #[arg(long)]
    ta: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Surveys {
            command: SurveysCommand::Import(args),
        } => run_survey_import(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let properties = PropertiesHandle::new(config.chapter);
    let people = Arc::new(MemoryPeople::default());

    let events_state = EventsState {
        events: Arc::new(MemoryEvents::default()),
        people: people.clone(),
        messenger: Arc::new(TracingMessenger),
        properties: properties.clone(),
    };
    let members_state = MembersState {
        committeeships: Arc::new(MemoryCommitteeships::default()),
        people,
        challenges: Arc::new(MemoryChallenges::default()),
        properties: properties.clone(),
    };
    let surveys_state = SurveysState {
        admin: Arc::new(SurveyAdmin::new(
            Arc::new(MemoryKlasses::default()),
            Arc::new(MemoryCoursesurveys::default()),
            properties,
        )),
        records: Arc::new(MemorySurveyRecords::default()),
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(events_router(events_state))
        .merge(members_router(members_state))
        .merge(surveys_router(surveys_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, semester = %config.chapter.semester, "chapter administration service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_survey_import(args: ImportArgs) -> Result<(), AppError> {
    let records = MemorySurveyRecords::default();
    let mut report =
        SurveyImporter::import_path(ImportFormat::Csv, &args.csv, args.commit, args.ta, &records)?;

    let success = report.errors.is_empty();
    if !success && args.commit {
        report
            .errors
            .push("No data was imported because of the above errors.".to_string());
    }

    if report.errors.is_empty() {
        println!("No problems found.");
    } else {
        println!("Problems:");
        for error in &report.errors {
            println!("- {error}");
        }
    }

    println!();
    for line in &report.info {
        println!("{line}");
    }

    if args.commit && success {
        let stored = records
            .count()
            .map_err(SurveyImportError::from)?;
        println!("{stored} record(s) now in the store.");
    }

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
