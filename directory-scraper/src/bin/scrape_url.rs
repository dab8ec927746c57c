use anyhow::Result;
use clap::Parser;

use directory_scraper::{
    ApiKeysConfig, LlmScrapeClient, ModelRegistry, ScrapeClient, ScraperSettings,
};

/// API keys come from OPENAI_API_KEY, GEMINI_API_KEY and OPENROUTER_API_KEY.
#[derive(Parser, Debug)]
#[command(name = "scrape_url", about = "Scrape company details from a website with an LLM")]
struct Cli {
    /// Company website to scrape
    url: String,

    /// Model id (or provider model name) from the built-in registry
    #[arg(long)]
    model: Option<String>,

    #[arg(long)]
    user_agent: Option<String>,

    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Cli {
    fn settings(&self) -> ScraperSettings {
        let defaults = ScraperSettings::default();
        ScraperSettings {
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            timeout_secs: self.timeout_secs.unwrap_or(defaults.timeout_secs),
            ..defaults
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let registry = ModelRegistry::new(Vec::new(), ApiKeysConfig::default());
    let client = LlmScrapeClient::new(&cli.settings(), registry)?;

    let output = match client.scrape(&cli.url, cli.model.as_deref()).await {
        Ok(output) => serde_json::json!({
            "success": true,
            "data": output.data,
            "meta": output.meta,
        }),
        Err(err) => serde_json::json!({
            "success": false,
            "error": err.message(),
            "blocked": err.is_blocked(),
        }),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
