use finance_crew::{
    config::Settings,
    crew::FinanceCrew,
    demo::run_demo,
    oracle::MockOracle,
    prompts::PromptLibrary,
};
use std::io;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let settings = Settings::from_env()?;
    let library = Arc::new(PromptLibrary::load(settings.prompts_dir.as_deref())?);

    // Nothing is submitted in demo mode
    let crew = FinanceCrew::new(library, Arc::new(MockOracle::new()));

    let mut stdout = io::stdout().lock();
    let summary = run_demo(&mut stdout, &crew, &settings)?;

    if summary.passed == summary.total {
        println!("🎉 All components are working! The Finance Crew is ready to use.");
    } else {
        println!("⚠️ Some components had issues. Check error messages above.");
    }

    Ok(())
}
