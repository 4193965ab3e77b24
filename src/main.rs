use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use astro_guide::advice::AdviceGenerator;
use astro_guide::chart::{ChartProvider, ChartResolver, HttpChartProvider, HttpGeocoder};
use astro_guide::config::Config;
use astro_guide::engine::ConversationEngine;
use astro_guide::llm::{HttpLlmProvider, LlmProvider};
use astro_guide::store::MemoryStore;

const CLI_ADDRESS: &str = "cli:local";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Config::from_env()?;

    eprintln!("🔮 Astro Guide v{}", env!("CARGO_PKG_VERSION"));
    if config.chart_provider.is_none() {
        eprintln!("   Chart provider: not configured (deterministic fallback)");
    }
    match &config.llm {
        Some(llm) => eprintln!("   LLM model: {}", llm.model),
        None => eprintln!("   LLM: not configured (templated fallbacks)"),
    }
    eprintln!("   Type a message and press Enter. /quit to exit.\n");

    let http = reqwest::Client::new();

    let geocoder = Arc::new(HttpGeocoder::new(
        http.clone(),
        config.geocode.search_url.clone(),
        config.geocode.timezone_url.clone(),
    ));

    let chart_provider: Option<Arc<dyn ChartProvider>> =
        config.chart_provider.as_ref().map(|cp| {
            Arc::new(HttpChartProvider::new(
                http.clone(),
                cp.token_url.clone(),
                cp.chart_url.clone(),
                cp.client_id.clone(),
                cp.client_secret.clone(),
            )) as Arc<dyn ChartProvider>
        });

    let llm: Option<Arc<dyn LlmProvider>> = config.llm.as_ref().map(|l| {
        Arc::new(HttpLlmProvider::new(
            http.clone(),
            l.api_url.clone(),
            l.api_key.clone(),
            l.model.clone(),
        )) as Arc<dyn LlmProvider>
    });

    let store = Arc::new(MemoryStore::new());
    let resolver = Arc::new(ChartResolver::new(geocoder, chart_provider));
    let advisor = Arc::new(AdviceGenerator::new(llm, Arc::clone(&resolver)));
    let engine = ConversationEngine::new(
        store.clone(),
        store.clone(),
        store.clone(),
        resolver,
        advisor,
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    stdout.write_all(b"> ").await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text == "/quit" {
            break;
        }
        if !text.is_empty() {
            match engine.process_message(CLI_ADDRESS, text).await {
                Ok(reply) => {
                    stdout.write_all(format!("\n{reply}\n\n").as_bytes()).await?;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Turn failed");
                    stdout
                        .write_all(b"\nSomething went wrong, please try again.\n\n")
                        .await?;
                }
            }
        }
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
    }

    Ok(())
}
