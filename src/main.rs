//! radiocast - live audio broadcast server entry point

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use radiocast::config::BroadcastConfig;
use radiocast::controller::BroadcastController;
use radiocast::pipeline::Streamer;
use radiocast::registry::ClientRegistry;
use radiocast::server::{self, AppContext};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "radiocast")]
#[command(about = "Single-source live audio broadcast server")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "RADIOCAST_PORT")]
    port: u16,

    /// Default song played by the start command
    #[arg(
        long,
        default_value = "audio/songs/conversation.mp3",
        env = "RADIOCAST_SONG"
    )]
    song: PathBuf,

    /// Directory of effect clips
    #[arg(long, default_value = "audio/fx", env = "RADIOCAST_FX_DIR")]
    fx_dir: PathBuf,

    /// Directory of static UI assets
    #[arg(long, default_value = "public", env = "RADIOCAST_PUBLIC_DIR")]
    public_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "radiocast=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    let config = Arc::new(
        BroadcastConfig::default()
            .bind(addr)
            .song_path(args.song)
            .fx_dir(args.fx_dir)
            .public_dir(args.public_dir),
    );

    let registry = Arc::new(ClientRegistry::new(config.listener_buffer));
    let streamer = Arc::new(Streamer::new(Arc::clone(&config), Arc::clone(&registry)));
    let controller = Arc::new(BroadcastController::new(
        Arc::clone(&config),
        Arc::clone(&streamer),
    ));

    let app = server::router(AppContext {
        config: Arc::clone(&config),
        registry,
        controller,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "Broadcast server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Release the source reader and any mixer process before exit
    streamer.stop().await;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}
