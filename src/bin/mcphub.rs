//! Command-line front end for the mcphub registry and launcher.
//!
//! Usage:
//!
//! ```text
//! mcphub list
//! mcphub get <name>
//! mcphub upsert <payload.json>
//! mcphub pull <name>
//! mcphub run <name>
//! mcphub verify-payment --order-id <id> --payment-id <id> --signature <hex> --server <name>
//! ```
//!
//! Every command prints one JSON body to stdout. Service errors print
//! `{"error", "kind"}` and exit with status 1; runs that fail or time out
//! print their outcome body and exit with status 2.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use mcphub::{
    ErrorKind,
    config::HubConfig,
    hub::{HubService, HubServiceError},
    launcher::{
        adapters::{GitCliFetcher, TokioProcessExecutor},
        services::{Fetcher, Launcher},
    },
    payment::{
        adapters::InMemoryPaymentGateway,
        services::{PaymentService, VerifyPaymentRequest},
    },
    registry::{adapters::FilesystemBlobStore, services::RegistryStore},
    telemetry::init_tracing,
};
use mockable::DefaultClock;
use serde::Serialize;
use serde_json::{Value, json};
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Builder;

/// Boxed error type for setup failures.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

type Hub = HubService<FilesystemBlobStore, DefaultClock, GitCliFetcher, TokioProcessExecutor>;

#[derive(Debug, Parser)]
#[command(name = "mcphub", version, about = "Register, fetch and run MCP server packages")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List registered servers.
    List,
    /// Show one server record.
    Get {
        /// Server name.
        name: String,
    },
    /// Register or replace a server from a JSON payload file.
    Upsert {
        /// Path to the payload.
        payload: Utf8PathBuf,
    },
    /// Clone a server's repository into a workspace.
    Pull {
        /// Server name.
        name: String,
    },
    /// Clone and run a server's entrypoint.
    Run {
        /// Server name.
        name: String,
    },
    /// Check a gateway checkout signature.
    VerifyPayment {
        /// Gateway order identifier.
        #[arg(long)]
        order_id: String,
        /// Gateway payment identifier.
        #[arg(long)]
        payment_id: String,
        /// Hex signature from the checkout.
        #[arg(long)]
        signature: String,
        /// Server that was paid for.
        #[arg(long = "server")]
        server_name: String,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read payload '{path}': {source}")]
    PayloadRead {
        path: Utf8PathBuf,
        source: std::io::Error,
    },
    #[error("payload '{path}' is not valid JSON: {source}")]
    PayloadParse {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },
    #[error("payments are not configured; set MCPHUB_PAYMENT_KEY_ID and MCPHUB_PAYMENT_KEY_SECRET")]
    PaymentsDisabled,
    #[error("{message}")]
    Service { kind: ErrorKind, message: String },
}

impl CliError {
    const fn kind(&self) -> ErrorKind {
        match self {
            Self::PayloadRead { .. } | Self::PayloadParse { .. } | Self::PaymentsDisabled => {
                ErrorKind::Validation
            }
            Self::Service { kind, .. } => *kind,
        }
    }
}

enum Reply {
    Body(Value),
    RunFailed(Value),
}

fn main() -> ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(err) => {
            writeln!(std::io::stderr().lock(), "mcphub: {err}").ok();
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> Result<ExitCode, BoxError> {
    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        return Err(err.into());
    }
    let cli = Cli::parse();
    let config = HubConfig::from_env()?;
    init_tracing(config.log_format)?;

    let runtime = Builder::new_multi_thread().enable_all().build()?;
    let outcome = runtime.block_on(execute(cli.command, &config));

    let mut stdout = std::io::stdout().lock();
    let code = match outcome {
        Ok(Reply::Body(body)) => {
            write_json(&mut stdout, &body)?;
            ExitCode::SUCCESS
        }
        Ok(Reply::RunFailed(body)) => {
            write_json(&mut stdout, &body)?;
            ExitCode::from(2)
        }
        Err(err) => {
            tracing::debug!(error = %err, kind = %err.kind(), "command failed");
            write_json(
                &mut stdout,
                &json!({"error": err.to_string(), "kind": err.kind()}),
            )?;
            ExitCode::FAILURE
        }
    };
    Ok(code)
}

fn write_json(out: &mut impl Write, body: &impl Serialize) -> Result<(), BoxError> {
    serde_json::to_writer_pretty(&mut *out, body)?;
    writeln!(out)?;
    Ok(())
}

fn build_hub(config: &HubConfig) -> Result<Hub, CliError> {
    let blobs = FilesystemBlobStore::open(config.storage_dir.clone())
        .map_err(|err| service_error(ErrorKind::DependencyFailure, &err))?;
    let store = RegistryStore::with_settings(
        Arc::new(blobs),
        Arc::new(DefaultClock),
        config.store.clone(),
    );
    let fetcher = Fetcher::new(
        Arc::new(GitCliFetcher::new(
            config.git_program.clone(),
            config.clone_timeout,
        )),
        config.workspace_dir.clone(),
    );
    let launcher = Launcher::new(Arc::new(TokioProcessExecutor::new()), config.launcher.clone());
    Ok(HubService::new(store, fetcher, launcher, config.workspace_policy))
}

fn to_body(value: &impl Serialize) -> Result<Value, CliError> {
    serde_json::to_value(value).map_err(|err| service_error(ErrorKind::Internal, &err))
}

fn service_error(kind: ErrorKind, err: &impl std::fmt::Display) -> CliError {
    CliError::Service {
        kind,
        message: err.to_string(),
    }
}

async fn read_payload(path: &Utf8PathBuf) -> Result<Value, CliError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| CliError::PayloadRead {
        path: path.clone(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| CliError::PayloadParse {
        path: path.clone(),
        source,
    })
}

fn verify_payment(config: &HubConfig, request: &VerifyPaymentRequest) -> Result<Reply, CliError> {
    let credentials = config.payment.clone().ok_or(CliError::PaymentsDisabled)?;
    let payments = PaymentService::new(Arc::new(InMemoryPaymentGateway::new()), credentials);
    let verification = payments
        .verify_payment(request)
        .map_err(|err| service_error(err.kind(), &err))?;
    Ok(Reply::Body(to_body(&verification)?))
}

async fn execute(command: Command, config: &HubConfig) -> Result<Reply, CliError> {
    let hub_error = |err: HubServiceError| service_error(err.kind(), &err);
    match command {
        Command::VerifyPayment {
            order_id,
            payment_id,
            signature,
            server_name,
        } => verify_payment(
            config,
            &VerifyPaymentRequest {
                order_id,
                payment_id,
                signature,
                server_name,
            },
        ),
        Command::List => {
            let listing = build_hub(config)?.list_servers().await.map_err(hub_error)?;
            Ok(Reply::Body(to_body(&listing)?))
        }
        Command::Get { name } => {
            let record = build_hub(config)?.get_server(&name).await.map_err(hub_error)?;
            Ok(Reply::Body(to_body(&record)?))
        }
        Command::Upsert { payload } => {
            let value = read_payload(&payload).await?;
            let record = build_hub(config)?
                .create_or_upsert_server(&value)
                .await
                .map_err(hub_error)?;
            Ok(Reply::Body(to_body(&record)?))
        }
        Command::Pull { name } => {
            let receipt = build_hub(config)?.pull(&name).await.map_err(hub_error)?;
            Ok(Reply::Body(to_body(&receipt)?))
        }
        Command::Run { name } => {
            let outcome = build_hub(config)?.run(&name).await.map_err(hub_error)?;
            if outcome.is_success() {
                Ok(Reply::Body(outcome.into_body()))
            } else {
                Ok(Reply::RunFailed(outcome.into_body()))
            }
        }
    }
}
