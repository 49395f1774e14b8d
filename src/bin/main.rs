use finance_crew::{
    config::Settings,
    console::Console,
    crew::FinanceCrew,
    llm::build_chat_model,
    oracle::SequentialOracle,
    prompts::PromptLibrary,
};
use std::io;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables first so RUST_LOG can come from .env
    dotenv::dotenv().ok();

    // Logs go to stderr; keep them quiet so the menu stays readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let settings = Settings::from_env()?;
    let library = Arc::new(PromptLibrary::load(settings.prompts_dir.as_deref())?);
    let model = build_chat_model(&settings)?;

    info!(provider = %settings.provider, model = %settings.model, "Finance crew starting");

    let crew = FinanceCrew::new(library, Arc::new(SequentialOracle::new(model)));

    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout());

    if let Err(e) = settings.check_credential() {
        warn!("{}", e);
        console.advise(&e.to_string())?;
    }

    console.run(&crew).await?;

    Ok(())
}
