mod config;
mod error;

use std::io::{self, BufRead, Write};

use clap::Parser;
use lookup::{StocksClient, WeatherClient};
use runtime::{LookupToolHost, OpenAiBackend, Session};
use tracing_subscriber::EnvFilter;

use config::Config;
use error::Result;

const SYSTEM_PROMPT: &str = "You are Almanac, a chatbot designed to answer questions about the \
weather and stock prices. If a user asks a question about anything other than the weather or \
stock prices, respond with a message indicating that you are unable to answer the question.";

#[derive(Parser)]
#[command(name = "almanac")]
#[command(about = "A chat assistant for weather and stock-price questions", long_about = None)]
#[command(version)]
struct Cli {
    /// Model to use (overrides ALMANAC_MODEL)
    #[arg(short, long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    let model = cli.model.unwrap_or_else(|| config.model.clone());

    println!("almanac v{}", env!("CARGO_PKG_VERSION"));

    let backend = OpenAiBackend::builder(&config.model_api_key, &model).build();
    let tools = LookupToolHost::new(
        WeatherClient::new(&config.openweather_key),
        StocksClient::new(&config.polygon_key),
    );
    let mut session = Session::new(backend, tools, SYSTEM_PROMPT);

    println!("Session ID: {}", session.id);
    println!("Model: {model}");
    println!("Ask me about the weather or stock prices! Type 'quit' or Ctrl+D to exit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "exit" {
            break;
        }

        match session.chat(input).await {
            Ok(response) => {
                println!("\n{response}\n");
            }
            Err(e) => {
                tracing::warn!(error = %e, "turn failed");
                eprintln!("\nSorry, something went wrong with that request. Please try again.\n");
            }
        }
    }

    println!("\nGoodbye.");
    Ok(())
}
