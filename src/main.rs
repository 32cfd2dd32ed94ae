//! CLI driver for the GitHub tool.
//!
//! Reads one `{operation, parameters}` request as JSON from stdin, executes
//! it, and prints the result envelope to stdout. Settings are loaded from a
//! JSON file given as the first argument (defaults apply when omitted).
//!
//! ```text
//! echo '{"operation": "list_issues", "parameters": {"repository": "octocat/Hello-World"}}' \
//!     | github-tool settings.json
//! ```

use std::io::Read;
use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use github_tool::{GitHubConfig, GitHubTool, ToolRequest};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "github_tool=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => match load_config(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to load settings from {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => GitHubConfig::default(),
    };

    let tool = match GitHubTool::connect(&config).await {
        Ok(tool) => tool,
        Err(e) => {
            eprintln!("failed to initialize GitHub tool: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        eprintln!("failed to read request from stdin: {}", e);
        return ExitCode::FAILURE;
    }

    let request: ToolRequest = match serde_json::from_str(&input) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("invalid request (expected {{\"operation\", \"parameters\"}}): {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = tool.execute(request).await;
    match serde_json::to_string_pretty(&result) {
        Ok(rendered) => {
            println!("{}", rendered);
            if result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("failed to render result: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: &str) -> Result<GitHubConfig, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
