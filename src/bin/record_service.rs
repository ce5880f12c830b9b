use std::sync::Arc;

use model_compare::ServiceConfig;
use model_compare::records::{MemoryRecordStore, PgRecordStore, RecordStore};
use model_compare::service::{AppState, create_app};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

struct ServiceArgs {
    port: Option<u16>,
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_thread_names(true)
        .init();

    let args = parse_args(std::env::args().skip(1).collect())?;

    let (store, port): (Arc<dyn RecordStore>, u16) = if args.in_memory {
        let port = match args.port {
            Some(port) => port,
            None => ServiceConfig::port_from_env()?,
        };
        info!("using in-memory record store");
        (Arc::new(MemoryRecordStore::new()), port)
    } else {
        let config = ServiceConfig::from_env()?;
        let pool = config.create_database_pool()?;
        let store = PgRecordStore::new(pool);
        store.spawn_idle_reaper(config.idle_timeout);
        (Arc::new(store), args.port.unwrap_or(config.port))
    };

    store.ensure_schema().await?;

    let app = create_app(AppState::new(store));
    let listener = TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_handler())
        .await?;

    info!("record service stopped");
    Ok(())
}

async fn shutdown_handler() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            warn!(%error, "could not install ctrl+c handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                warn!(%error, "could not install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

fn parse_args(args: Vec<String>) -> Result<ServiceArgs, Box<dyn std::error::Error>> {
    let mut parsed = ServiceArgs {
        port: None,
        in_memory: false,
    };

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--port" => {
                let value = args.get(i + 1).ok_or("missing value for --port")?;
                parsed.port = Some(
                    value
                        .parse::<u16>()
                        .map_err(|_| "--port must be a number between 0 and 65535")?,
                );
                i += 2;
            }
            "--in-memory" => {
                parsed.in_memory = true;
                i += 1;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                return Err(format!("unknown argument: {other}").into());
            }
        }
    }

    Ok(parsed)
}

fn print_help() {
    println!(
        "Usage:\n  cargo run --bin record_service -- [--port PORT] [--in-memory]\n\nEnv:\n  DATABASE_URL, or DATABASE_USER / DATABASE_PASSWORD / DATABASE_HOST / DATABASE_PORT / DATABASE_NAME\n  PORT (default 5000)\n  DATABASE_POOL_SIZE / DATABASE_WAIT_TIMEOUT_MS / DATABASE_IDLE_TIMEOUT_MS\n  RUST_LOG (default info)"
    );
}
