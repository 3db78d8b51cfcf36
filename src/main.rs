use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use kiji::{
    Config, admin::SessionStore, create_app, startup_checks, store,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the web server (default if no command specified)
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        #[arg(long)]
        host: Option<String>,

        /// Automatically quit after specified number of seconds (useful for testing)
        #[arg(long)]
        quit_after: Option<u64>,
    },

    /// Export all posts to a JSON interchange file
    Export {
        /// Output file path
        #[arg(short, long, default_value = "posts-export.json")]
        output: PathBuf,
    },

    /// Import posts from a JSON interchange file, replacing the current set
    Import {
        /// Input file path
        file: PathBuf,
    },

    /// Manage admin credentials
    #[command(subcommand)]
    Admin(AdminCommands),
}

#[derive(Subcommand, Debug)]
enum AdminCommands {
    /// Set the admin username and password
    SetPassword {
        username: String,
        password: String,
    },
    /// Print the SHA-256 digest of a password for use in config.toml
    HashPassword { password: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging first
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&cli.config)?;

    match cli.command {
        Some(Commands::Export { output }) => export_posts(config, output).await,
        Some(Commands::Import { file }) => import_posts(config, file).await,
        Some(Commands::Admin(admin_cmd)) => handle_admin_command(config, admin_cmd).await,
        Some(Commands::Serve {
            port,
            host,
            quit_after,
        }) => run_server(config, cli.config, port, host, quit_after).await,
        None => {
            // Default to serve command if no subcommand specified
            run_server(config, cli.config, None, None, None).await
        }
    }
}

fn load_config(config_path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
    if config_path.exists() {
        let config_content = std::fs::read_to_string(config_path)?;
        Ok(toml_edit::de::from_str::<Config>(&config_content)?)
    } else {
        info!("Config file not found at {:?}, using defaults", config_path);
        Ok(Config::default())
    }
}

async fn open_repository(config: &Config) -> store::PostRepository {
    let remote = store::create_remote_store(&config.store.remote).unwrap_or_else(|e| {
        eprintln!("Warning: remote store unusable ({e}), using local cache only");
        store::create_remote_store(&store::RemoteStoreConfig::None)
            .expect("null remote store is infallible")
    });
    let repository =
        store::PostRepository::new(store::LocalCache::new(&config.store.data_directory), remote);
    repository.load().await;
    repository
}

async fn export_posts(config: Config, output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let repository = open_repository(&config).await;
    let export = repository.export().await;
    let json = serde_json::to_string_pretty(&export)?;
    tokio::fs::write(&output, json).await?;
    println!("Exported {} posts to {:?}", export.posts.len(), output);
    Ok(())
}

async fn import_posts(config: Config, file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let contents = tokio::fs::read_to_string(&file).await?;
    let export: store::PostsExport = serde_json::from_str(&contents)?;

    let repository = open_repository(&config).await;
    let (count, synced) = repository.import(export).await?;
    if synced {
        println!("Imported {count} posts");
    } else {
        println!("Imported {count} posts locally (remote sync pending)");
    }
    Ok(())
}

async fn handle_admin_command(
    config: Config,
    cmd: AdminCommands,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        AdminCommands::SetPassword { username, password } => {
            tokio::fs::create_dir_all(&config.store.data_directory).await?;
            SessionStore::set_password(&config.store.data_directory, &username, &password).await?;
            println!("Admin credentials updated for '{username}'");
        }
        AdminCommands::HashPassword { password } => {
            println!("{}", SessionStore::hash_password(&password));
        }
    }
    Ok(())
}

async fn run_server(
    config: Config,
    config_path: PathBuf,
    port: Option<u16>,
    host: Option<String>,
    quit_after: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let host = host.unwrap_or(config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info!("Starting {} server", config.app.name);
    info!("Configuration loaded from: {:?}", config_path);
    info!("Template directory: {:?}", config.templates.directory);
    info!(
        "Static files directory: {:?}",
        config.static_files.directory
    );
    info!("Data directory: {:?}", config.store.data_directory);

    // Perform startup checks
    match startup_checks::perform_startup_checks(&config).await {
        Ok(()) => info!("All startup checks passed"),
        Err(errors) => {
            for error in &errors {
                tracing::error!("Startup check failed: {}", error);
            }
            let critical_error = errors.iter().any(|e| {
                matches!(
                    e,
                    startup_checks::StartupCheckError::DataDirectoryCreationFailed(_)
                )
            });

            if critical_error {
                tracing::error!("Critical startup check failed, exiting");
                return Err("Critical startup check failed".into());
            } else {
                tracing::warn!("Non-critical startup checks failed, continuing");
            }
        }
    }

    let app = create_app(config).await;

    let addr = SocketAddr::from((host.parse::<std::net::IpAddr>()?, port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Add ConnectInfo layer to track client IPs
    let app = app.into_make_service_with_connect_info::<SocketAddr>();

    let server = axum::serve(listener, app);
    let graceful = server.with_graceful_shutdown(shutdown_signal(quit_after));

    if let Err(e) = graceful.await {
        tracing::error!("Server error: {}", e);
    }

    info!("Shutting down");
    Ok(())
}

async fn shutdown_signal(quit_after: Option<u64>) {
    use tokio::signal;
    use tokio::time::{Duration, sleep};

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let quit_timer = async {
        if let Some(seconds) = quit_after {
            info!(
                "Server will automatically shut down after {} seconds",
                seconds
            );
            sleep(Duration::from_secs(seconds)).await;
            info!("Quit timer expired, shutting down");
        } else {
            std::future::pending::<()>().await
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        },
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        },
        _ = quit_timer => {},
    }
}
