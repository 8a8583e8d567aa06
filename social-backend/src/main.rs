use social_backend::prelude::*;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!(error = %e, "Application failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let (config, mut warnings) = Config::load()?;

    if let Err(e) = config.validate() {
        eprintln!(
            "{}",
            social_backend::config::startup_failure_message(e.title(), e.action())
        );
        std::process::exit(1);
    }

    init_tracing(&config)?;
    warnings.flush();

    database::run_migrations(&config).await?;
    let pool = database::create_pool(&config).await?;

    let state = AppState::builder()
        .config(config.clone())
        .db_pool(pool)
        .build()?;

    tracing::info!(
        providers = ?state.oauth().providers().names(),
        base_url = config.base_url(),
        "Application initialized"
    );

    Server::new(config).serve(router(state)).await
}
