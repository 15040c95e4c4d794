//! DocMeta — document metadata extraction server.

use std::path::PathBuf;
use std::sync::Arc;

use docmeta_server::{build_router, cli, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn resolve_data_dir() -> PathBuf {
    std::env::var("DOCMETA_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "extract" => {
                let code = cli::run(&args[2..], &resolve_data_dir())?;
                std::process::exit(code);
            }
            "--help" | "-h" | "help" => {
                println!("DocMeta — document metadata extraction");
                println!();
                println!("Usage: docmeta [command]");
                println!();
                println!("Commands:");
                println!("  (none)                          Start the server");
                println!("  extract <file> [--out <path>]   Print metadata JSON for one file");
                println!("  help                            Show this help message");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'docmeta help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = docmeta_core::DocMetaConfig::from_env(&data_dir)?;
    let port = config.port;
    info!(
        "Pipeline: entities={}, sections={}, ocr_fallback={}, upload limit {} bytes",
        config.pipeline.entities,
        config.pipeline.sections,
        config.pipeline.ocr_fallback,
        config.max_upload_bytes
    );

    let state = Arc::new(AppState::new(config));
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("DocMeta server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
