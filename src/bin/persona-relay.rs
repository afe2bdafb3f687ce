//! persona-relay CLI: run the chat endpoint, talk to it, inspect memory.

use clap::{Parser, Subcommand};
use persona_relay::client::{RelayClient, Transcript};
use persona_relay::config::Config;
use persona_relay::persona::Persona;
use persona_relay::relay::ChatRelay;
use persona_relay::server;
use persona_relay::telemetry::{TelemetryConfig, TelemetryGuard, init_telemetry};
use std::io::Write as _;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "persona-relay", about = "Answer visitors as the site owner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP chat endpoint
    Serve {
        /// Listen address (overrides BIND_ADDR)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Ask the relay a question; interactive when no message is given
    Ask {
        /// Relay endpoint URL
        #[arg(long, default_value = "http://127.0.0.1:3000/chat")]
        url: String,
        /// Message to send
        message: Vec<String>,
    },
    /// Load the memory page once and print the record as JSON
    Memory,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Serve { bind } => {
            let _guard = telemetry(config.otel_endpoint.clone(), &config.log_level)?;
            cmd_serve(&config, bind).await
        }
        Command::Ask { url, message } => {
            let _guard = telemetry(None, "warn")?;
            cmd_ask(&config, url, message.join(" ")).await
        }
        Command::Memory => {
            let _guard = telemetry(None, "warn")?;
            cmd_memory(&config).await
        }
    }
}

fn telemetry(endpoint: Option<String>, default_filter: &str) -> anyhow::Result<TelemetryGuard> {
    Ok(init_telemetry(TelemetryConfig {
        endpoint,
        service_name: "persona-relay".to_string(),
        default_filter: default_filter.to_string(),
    })?)
}

async fn cmd_serve(config: &Config, bind: Option<String>) -> anyhow::Result<()> {
    let relay = Arc::new(ChatRelay::from_config(config)?);
    tracing::info!(
        candidates = ?relay.memory().candidates(),
        persona = %relay.persona().name,
        "relay configured"
    );
    let app = server::router(relay, config.max_body_bytes);
    let addr = bind.unwrap_or_else(|| config.bind_addr.clone());
    server::serve(&addr, app).await?;
    Ok(())
}

async fn cmd_ask(config: &Config, url: String, message: String) -> anyhow::Result<()> {
    let persona = Persona::load(config.persona_file.as_deref())?;
    let client = RelayClient::new(url);
    let mut transcript = Transcript::for_persona(&persona);

    if !message.trim().is_empty() {
        if let Some(reply) = client.ask(&mut transcript, &message).await {
            println!("{reply}");
        }
        return Ok(());
    }

    println!("{}", persona.greeting);
    println!("(/clear resets the conversation, /quit exits)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "/quit" | "/exit" => break,
            "/clear" => {
                transcript.clear();
                println!("{}", persona.greeting);
            }
            question => {
                if let Some(reply) = client.ask(&mut transcript, question).await {
                    println!("{}: {reply}", persona.name);
                }
            }
        }
    }
    Ok(())
}

async fn cmd_memory(config: &Config) -> anyhow::Result<()> {
    let relay = ChatRelay::from_config(config)?;
    let loader = relay.memory();
    let record = loader.load(loader.candidates(), config.memory.max_chars).await;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
