use anyhow::{Context, Result};
use chatrelay::cli::{Cli, Commands};
use chatrelay::core::llm::GeminiClient;
use chatrelay::server::{self, AppState};
use chatrelay::session::parse_session_id;
use chatrelay::storage::TranscriptStore;
use chatrelay::{build_service, utils, Settings};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut settings = Settings::new().context("Failed to load configuration")?;
    if let Some(log_dir) = cli.log_dir {
        settings.storage.log_dir = log_dir;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Serve { host, port } => handle_serve(settings, host, port).await,
        Commands::Sessions => handle_sessions(&settings).await,
        Commands::History { session_id, last } => {
            handle_history(&settings, &session_id, last).await
        }
        Commands::Chat {
            session_id,
            message,
        } => handle_chat(&settings, &session_id, &message).await,
        Commands::Delete { session_id } => handle_delete(&settings, &session_id).await,
    };

    if let Err(e) = result {
        utils::print_error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }
    Ok(())
}

fn gemini_client(settings: &Settings) -> Result<Arc<GeminiClient>> {
    let api_key = Settings::api_key()?;
    Ok(Arc::new(GeminiClient::new(api_key, settings.llm.clone())))
}

async fn open_store(settings: &Settings) -> Result<Arc<dyn TranscriptStore>> {
    chatrelay::open_store(settings)
        .await
        .context("Failed to open transcript store")
}

async fn handle_serve(
    mut settings: Settings,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(host) = host {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }

    let client = gemini_client(&settings)?;
    let service = Arc::new(build_service(&settings, client).await?);

    utils::print_header("Chatrelay");
    utils::print_info(&format!("Model: {}", settings.llm.model));
    utils::print_info(&format!("Transcripts: {}", settings.storage.log_dir.display()));
    utils::print_success(&format!(
        "Open http://{}:{}/ in a browser (Ctrl+C to stop)\n",
        settings.server.host, settings.server.port
    ));

    let state = AppState::new(service, &settings.sessions)?;
    server::run(state, &settings.server).await
}

async fn handle_sessions(settings: &Settings) -> Result<()> {
    let store = open_store(settings).await?;
    let sessions = store.list_sessions().await?;

    utils::print_header("Sessions");
    if sessions.is_empty() {
        utils::print_info("No stored sessions");
    }
    for summary in sessions {
        println!("{}  {}", summary.id, summary.title);
    }
    Ok(())
}

async fn handle_history(settings: &Settings, session_id: &str, last: Option<usize>) -> Result<()> {
    let session_id = parse_session_id(session_id)?;
    let store = open_store(settings).await?;
    let entries = store.load_all(&session_id).await?;

    let shown = match last {
        Some(n) => chatrelay::pagination::page(&entries, 0, n),
        None => &entries[..],
    };

    utils::print_header(&format!("Session {}", session_id));
    if shown.is_empty() {
        utils::print_info("No messages yet");
    }
    for entry in shown {
        utils::print_entry(entry);
    }
    Ok(())
}

async fn handle_chat(settings: &Settings, session_id: &str, message: &str) -> Result<()> {
    let session_id = parse_session_id(session_id)?;
    let client = gemini_client(settings)?;
    let service = build_service(settings, client).await?;

    let entry = service.send(&session_id, message).await?;
    utils::print_entry(&entry);
    Ok(())
}

async fn handle_delete(settings: &Settings, session_id: &str) -> Result<()> {
    let session_id = parse_session_id(session_id)?;
    let store = open_store(settings).await?;

    if store.delete(&session_id).await? {
        utils::print_success(&format!("Deleted session {}", session_id));
    } else {
        utils::print_info(&format!("Session {} not found", session_id));
    }
    Ok(())
}
