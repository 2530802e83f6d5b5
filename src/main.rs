use md_assist::agents::AgentRegistry;
use md_assist::api::{self, AppState};
use md_assist::config::AppConfig;
use md_assist::workspace::WorkspaceStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    let workspace = WorkspaceStore::open(&config.workspace_dir)
        .await
        .unwrap_or_else(|e| {
            eprintln!(
                "Error: Failed to open workspace at {}: {}",
                config.workspace_dir.display(),
                e
            );
            std::process::exit(1);
        });

    let agents = AgentRegistry::from_config(&config);

    eprintln!("📝 md-assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Workspace: {}", workspace.root().display());
    eprintln!("   API: http://{}/api", config.bind);
    eprintln!("   UI origin: {}", config.ui_origin);
    eprintln!(
        "   OpenAI: {} ({})",
        if config.openai.api_key.is_some() { "configured" } else { "no key" },
        config.openai.model
    );
    eprintln!(
        "   Gemini: {} ({})",
        if config.gemini.api_key.is_some() { "configured" } else { "no key" },
        config.gemini.model
    );
    eprintln!("   Agents: {}\n", agents.agent_ids().join(", "));

    let app = api::app(AppState::new(workspace, agents), &config.ui_origin)?;

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %config.bind, "HTTP server started");
    axum::serve(listener, app).await?;

    Ok(())
}
