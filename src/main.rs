use std::path::Path;
use std::process::ExitCode;

use clap::Parser; // for cli
use thiserror::Error;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crpt_client::config::Args;
use crpt_client::{
    ConfigError, DispatchError, Dispatcher, Document, HttpTransport, TransportError, metrics,
};

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build http client: {0}")]
    Client(#[from] TransportError),
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("invalid document: {0}")]
    Document(#[from] serde_json::Error),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("failed to render metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    // parse cli arguments
    let args = Args::parse();
    init_logging(&args.log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "client stopped");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(args: Args) -> Result<(), AppError> {
    let window = args.window()?;
    let transport = HttpTransport::with_timeout(args.http_timeout())?;
    let dispatcher = Dispatcher::new(window, transport);

    let document = load_document(args.document.as_deref())?;
    debug!(?document, "document loaded");

    info!(endpoint = %args.endpoint, "submitting to registry");
    info!(
        "Rate limit: {} documents per one {:?}",
        window.limit(),
        window.unit()
    );

    for round in 1..=args.repeat {
        let report = dispatcher
            .submit(&args.endpoint, document.clone(), args.signature.as_str())
            .await?;
        info!(round, sent = report.sent, pending = report.pending, "submit finished");
    }

    if args.print_metrics {
        println!("{}", metrics::render()?);
    }
    Ok(())
}

fn load_document(path: Option<&Path>) -> Result<Document, AppError> {
    let Some(path) = path else {
        return Ok(Document::sample()?);
    };
    let raw = std::fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}
