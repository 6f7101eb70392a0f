use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use studio_canvas::background::{BackgroundClient, BackgroundError, GenerationOutcome, interpret_response};
use studio_canvas::catalog::{self, Template};
use studio_wire::{DataUrl, GenerateRequest, GenerateResponse};

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned HTTP {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("{0}")]
    Background(#[from] BackgroundError),
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("invalid image payload: {0}")]
    Payload(#[from] studio_wire::WireError),
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "studio-cli", about = "Creative studio generation proxy CLI")]
struct Cli {
    #[arg(long, env = "STUDIO_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    /// Overall request timeout in seconds.
    #[arg(long, env = "STUDIO_TIMEOUT_SECS", default_value_t = 120)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    base_url: String,
    timeout: Duration,
}

impl CliContext {
    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    fn client(&self) -> Result<reqwest::Client, CliError> {
        Ok(reqwest::Client::builder().timeout(self.timeout).build()?)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the proxy is up.
    Ping,
    /// List the ad templates as JSON.
    Templates,
    /// Generate a background sized for a template and save it.
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[arg(long)]
    prompt: String,

    #[arg(long, default_value = "facebook-feed", value_parser = parse_template)]
    template: &'static Template,

    /// Output file. Defaults to `<template>.<ext>` in the working directory.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let ctx = CliContext { base_url: cli.base_url, timeout: Duration::from_secs(cli.timeout_secs) };

    let result = match cli.command {
        Command::Ping => run_ping(&ctx).await,
        Command::Templates => run_templates(),
        Command::Generate(args) => run_generate(&ctx, args).await,
    };
    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        std::process::exit(1);
    }
}

async fn run_ping(cli: &CliContext) -> Result<(), CliError> {
    let response = cli.client()?.get(cli.endpoint("/healthz")).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::ServerError {
            status: status.as_u16(),
            message: "health check failed".to_owned(),
        });
    }
    println!("ok");
    Ok(())
}

fn run_templates() -> Result<(), CliError> {
    print_json(&serde_json::to_value(catalog::all())?)
}

async fn run_generate(cli: &CliContext, args: GenerateArgs) -> Result<(), CliError> {
    let mut background = BackgroundClient::new();
    let pending = background.begin(&args.prompt, args.template)?;
    tracing::info!(
        template = args.template.id,
        width = args.template.design_width,
        height = args.template.design_height,
        "requesting background"
    );

    let result = post_generate(cli, &pending.request).await;
    if let Err(BackgroundError::Rejected { status, message }) = &result {
        tracing::warn!(%status, %message, "proxy rejected the request");
    }
    match background.complete(pending.token, result) {
        GenerationOutcome::Installed => {}
        GenerationOutcome::Failed(message) => return Err(CliError::Generation(message)),
        GenerationOutcome::Discarded => return Err(CliError::Generation("response was discarded".to_owned())),
    }

    let image = background.image().ok_or_else(|| CliError::Generation("no image returned".to_owned()))?;
    let data = DataUrl::parse(image)?;
    let path = output_path(args.out, args.template, &data);
    tokio::fs::write(&path, &data.bytes)
        .await
        .map_err(|source| CliError::Write { path: path.clone(), source })?;

    print_json(&json!({
        "template": args.template.id,
        "path": path.display().to_string(),
        "mime": data.mime,
        "bytes": data.bytes.len(),
    }))
}

/// POST the request to the proxy. Transport failures never reach
/// [`interpret_response`]; every HTTP reply does.
async fn post_generate(cli: &CliContext, request: &GenerateRequest) -> Result<GenerateResponse, BackgroundError> {
    let client = cli.client().map_err(|e| BackgroundError::Transport(e.to_string()))?;
    let response = client
        .post(cli.endpoint("/api/generate"))
        .json(request)
        .send()
        .await
        .map_err(|e| BackgroundError::Transport(e.to_string()))?;
    let status = response.status().as_u16();
    let body = response.text().await.map_err(|e| BackgroundError::Transport(e.to_string()))?;
    interpret_response(status, &body)
}

fn parse_template(id: &str) -> Result<&'static Template, String> {
    catalog::all().iter().find(|t| t.id == id).ok_or_else(|| {
        let known: Vec<&str> = catalog::all().iter().map(|t| t.id).collect();
        format!("unknown template `{id}` (expected one of: {})", known.join(", "))
    })
}

fn output_path(out: Option<PathBuf>, template: &Template, data: &DataUrl) -> PathBuf {
    out.unwrap_or_else(|| PathBuf::from(format!("{}.{}", template.id, data.extension())))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
