//! Mimic Expectation Checker
//!
//! Compiles an expectation template and evaluates a recorded request against it.
//!
//! Usage:
//!   mimic-check --expectation template.json --request request.json [--options options.yaml]
//!
//! Exits 0 when the request matches, 1 when it does not.

use anyhow::Context;
use clap::Parser;
use mimic_matcher::{HttpRequestTemplate, IncomingRequest, MatcherBuilder, MatcherOptions};
use serde::Deserialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Check whether a request matches an expectation
#[derive(Parser, Debug)]
#[command(name = "mimic-check")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Expectation template (JSON)
    #[arg(short, long)]
    expectation: PathBuf,

    /// Request to evaluate (JSON)
    #[arg(short, long)]
    request: PathBuf,

    /// Matcher options (YAML)
    #[arg(short, long, env = "MIMIC_MATCHER_OPTIONS")]
    options: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct NameValue {
    name: String,
    value: String,
}

/// Request document as written by hand or captured from a proxy log.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestDocument {
    method: String,
    path: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    query_string_parameters: Vec<NameValue>,
    #[serde(default)]
    headers: Vec<NameValue>,
    #[serde(default)]
    cookies: Vec<NameValue>,
    #[serde(default)]
    body: String,
}

impl From<RequestDocument> for IncomingRequest {
    fn from(doc: RequestDocument) -> Self {
        IncomingRequest {
            method: doc.method,
            path: doc.path,
            url: doc.url,
            query: doc
                .query_string_parameters
                .into_iter()
                .map(|p| (p.name, p.value))
                .collect(),
            headers: doc.headers.into_iter().map(|h| (h.name, h.value)).collect(),
            cookies: doc.cookies.into_iter().map(|c| (c.name, c.value)).collect(),
            body: doc.body.into(),
        }
    }
}

fn read(path: &PathBuf) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn run(args: &Args) -> anyhow::Result<bool> {
    let options = match &args.options {
        Some(path) => MatcherOptions::from_file(path)?,
        None => MatcherOptions::default(),
    };

    let template = HttpRequestTemplate::from_json(&read(&args.expectation)?)?;
    let document: RequestDocument = serde_json::from_str(&read(&args.request)?)
        .with_context(|| format!("Invalid request document {}", args.request.display()))?;
    let request = IncomingRequest::from(document);

    let matcher = MatcherBuilder::new(options).build(&template)?;
    let mismatches = matcher.mismatches(&request);

    if mismatches.is_empty() {
        println!("MATCH");
        return Ok(true);
    }

    println!("NO MATCH");
    for mismatch in &mismatches {
        println!("  - {mismatch}");
    }
    Ok(false)
}

/// The `RUST_LOG` directives when set and valid, otherwise warnings only.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    Ok(if run(&args)? {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
