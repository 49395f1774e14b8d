use finance_crew::{
    api::start_server,
    config::Settings,
    crew::FinanceCrew,
    llm::build_chat_model,
    oracle::SequentialOracle,
    prompts::PromptLibrary,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables first so RUST_LOG can come from .env
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env()?;

    if let Err(e) = settings.check_credential() {
        warn!("⚠️  {}", e);
    }

    info!("🚀 Finance Crew - API Server");
    info!("📍 Port: {}", settings.port);

    let library = Arc::new(PromptLibrary::load(settings.prompts_dir.as_deref())?);
    let model = build_chat_model(&settings)?;
    let crew = Arc::new(FinanceCrew::new(library, Arc::new(SequentialOracle::new(model))));

    info!(provider = %settings.provider, model = %settings.model, "✅ Crew initialized");
    info!("📡 Starting API server...");

    start_server(crew, settings.port).await?;

    Ok(())
}
