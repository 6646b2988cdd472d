//! Agent-driver example binary: wires an LLM provider to an MCP server over
//! stdio or SSE and drives a simple interactive chat loop.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use mcp_core::agent::{ChatSession, ChatSessionEvent, LlmClient, LlmResponse};
use mcp_core::tools::ToolRegistry;

#[derive(Parser)]
#[command(name = "mcp-agent")]
#[command(about = "Agent-driver example binary for mcp-core")]
#[command(version)]
struct Cli {
    /// LLM provider to use
    #[arg(long, env = "LLM_PROVIDER")]
    provider: Option<String>,

    /// Model name
    #[arg(short = 'm', long, env = "LLM_MODEL")]
    model: Option<String>,

    /// Logging verbosity
    #[arg(long, env = "LLM_LOG_LEVEL")]
    log_level: Option<String>,

    /// Shorthand for --log-level debug
    #[arg(long)]
    debug: bool,

    /// Shorthand for --log-level trace
    #[arg(long)]
    verbose: bool,
}

fn resolve_log_level(cli: &Cli) -> String {
    if cli.verbose {
        return "trace".to_string();
    }
    if cli.debug {
        return "debug".to_string();
    }
    cli.log_level.clone().unwrap_or_else(|| "info".to_string())
}

fn init_logging(level: &str) {
    let filter = format!("mcp_agent={level},mcp_core={level}");
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .init();
}

/// Resolve which provider API key is required and fail fast if absent, per
/// spec §6's "missing API key" unrecoverable startup error.
fn require_api_key(provider: &str) -> Result<String, String> {
    let var = match provider {
        "openai" => "OPENAI_API_KEY",
        "anthropic" => "ANTHROPIC_API_KEY",
        other => return Err(format!("unknown provider '{other}', expected 'openai' or 'anthropic'")),
    };
    std::env::var(var).map_err(|_| format!("missing required environment variable {var}"))
}

/// Placeholder LLM client used until a real provider HTTP client is wired in.
/// Always asks the model to answer directly, with no tool calls.
struct EchoLlmClient;

#[async_trait::async_trait]
impl LlmClient for EchoLlmClient {
    async fn send_user_message(&self, text: &str) -> mcp_core::McpResult<Vec<LlmResponse>> {
        Ok(vec![LlmResponse::assistant(format!("(echo) {text}"))])
    }

    async fn send_tool_results(
        &self,
        _results: Vec<mcp_core::agent::ToolCallResult>,
    ) -> mcp_core::McpResult<Vec<LlmResponse>> {
        Ok(vec![])
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&resolve_log_level(&cli));

    let provider = cli.provider.unwrap_or_else(|| "openai".to_string());
    if let Err(message) = require_api_key(&provider) {
        error!("{message}");
        return ExitCode::FAILURE;
    }

    let model = cli.model.unwrap_or_else(|| "default".to_string());
    info!(provider = %provider, model = %model, "starting mcp-agent");

    let registry: Arc<dyn mcp_core::integration::ToolProvider> = Arc::new(ToolRegistry::new());
    let llm_client: Arc<dyn LlmClient> = Arc::new(EchoLlmClient);

    let (session, mut events) = ChatSession::new("cli-session", None, llm_client, registry);
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let ChatSessionEvent::AssistantMessageReceived(text) = event {
                println!("{text}");
            }
        }
    });

    if let Err(err) = session.refresh_known_tools().await {
        error!(error = %err, "failed to list tools from MCP server");
        return ExitCode::FAILURE;
    }

    let stdin = io::stdin();
    print!("> ");
    let _ = io::stdout().flush();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                error!(error = %err, "failed to read stdin");
                return ExitCode::FAILURE;
            }
        };
        if line.trim().is_empty() {
            print!("> ");
            let _ = io::stdout().flush();
            continue;
        }
        if let Err(err) = session.send_user_message(&line).await {
            error!(error = %err, "chat turn failed");
        }
        print!("> ");
        let _ = io::stdout().flush();
    }

    ExitCode::SUCCESS
}
