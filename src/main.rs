use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use casework_triage::config::AppConfig;
use casework_triage::error::AppError;
use casework_triage::telemetry;
use casework_triage::workflows::assessment::{
    AssessmentImportService, IssueTypeId, MemoryDirectory, MemoryResultStore, MemoryRuleStore,
    UserId,
};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

type TriageImportService =
    AssessmentImportService<MemoryDirectory, MemoryRuleStore, MemoryResultStore>;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
    service: Arc<TriageImportService>,
}

#[derive(Parser, Debug)]
#[command(
    name = "Casework Triage",
    about = "Score assessment sheets and classify beneficiaries for triage",
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
    /// Run one import offline and print the written results
    Import(ImportArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
    /// Priority rule seed CSV (id,issue_type_id,min_score,max_score,priority,is_active)
    #[arg(long)]
    rules: Option<PathBuf>,
    /// Beneficiary directory seed CSV (national_id,beneficiary_id)
    #[arg(long)]
    directory: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// Uploaded score sheet (.csv or .xlsx); deleted after a completed run
    #[arg(long)]
    sheet: PathBuf,
    /// Issue type the sheet was collected for
    #[arg(long)]
    issue_type: i64,
    /// Priority rule seed CSV
    #[arg(long)]
    rules: PathBuf,
    /// Beneficiary directory seed CSV
    #[arg(long)]
    directory: PathBuf,
    /// Case worker id to attribute the run to
    #[arg(long)]
    assessed_by: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ImportRequest {
    sheet_path: String,
    issue_type_id: i64,
    #[serde(default)]
    assessed_by: Option<i64>,
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
        Command::Import(args) => run_import(args),
    }
}

fn build_service(
    rules: Option<&Path>,
    directory: Option<&Path>,
) -> Result<(Arc<TriageImportService>, Arc<MemoryResultStore>), AppError> {
    let rules = match rules {
        Some(path) => MemoryRuleStore::from_csv_path(path)?,
        None => MemoryRuleStore::default(),
    };
    let directory = match directory {
        Some(path) => MemoryDirectory::from_csv_path(path)?,
        None => MemoryDirectory::default(),
    };
    let results = Arc::new(MemoryResultStore::default());

    let service = Arc::new(AssessmentImportService::new(
        Arc::new(directory),
        Arc::new(rules),
        results.clone(),
    ));
    Ok((service, results))
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.host = host;
    }
    if let Some(port) = args.port.take() {
        config.port = port;
    }

    telemetry::init(&config)?;

    let (service, _results) = build_service(args.rules.as_deref(), args.directory.as_deref())?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
        service,
    };

    let app = app_router(state, prometheus_layer);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "casework triage service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn app_router(state: AppState, prometheus_layer: PrometheusMetricLayer<'static>) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/assessments/import", post(import_endpoint))
        .layer(prometheus_layer)
        .with_state(state)
}

fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let ImportArgs {
        sheet,
        issue_type,
        rules,
        directory,
        assessed_by,
    } = args;

    let (service, results) = build_service(Some(&rules), Some(&directory))?;
    service.import_path(
        &sheet,
        IssueTypeId(issue_type),
        assessed_by.map(UserId),
    )?;

    let written = results.results();
    println!("Assessment import for issue type {issue_type}");
    println!("Results written: {}", written.len());
    for result in &written {
        println!(
            "- beneficiary {} | {}/{} | normalized {:.2} | priority {}{}",
            result.beneficiary_id.0,
            result.score,
            result.max_score,
            result.normalized_score,
            result.priority_suggested.label(),
            if result.is_latest { " | latest" } else { "" }
        );
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

/// Acknowledge the upload and hand the batch to the task runtime. The caller
/// never blocks on the import; task-level failures surface in the logs.
async fn import_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<ImportRequest>,
) -> impl IntoResponse {
    let sheet_path = PathBuf::from(&payload.sheet_path);
    if !sheet_path.is_file() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("no uploaded sheet at '{}'", payload.sheet_path) })),
        );
    }

    // Fire-and-forget: the task runtime owns completion, retry, and alerting.
    let _task = state.service.clone().spawn(
        sheet_path,
        IssueTypeId(payload.issue_type_id),
        payload.assessed_by.map(UserId),
    );

    (StatusCode::ACCEPTED, Json(json!({ "status": "accepted" })))
}
