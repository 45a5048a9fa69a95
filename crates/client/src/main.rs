//! `genstudio` command-line client.
//!
//! Usage:
//!   genstudio login --email me@example.com --password ...
//!   genstudio generate --prompt "a lighthouse at dusk" --style watercolor --file in.png
//!   genstudio history --limit 10

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use genstudio_client::api::GenerationApi;
use genstudio_client::config::ClientConfig;
use genstudio_client::coordinator::RequestCoordinator;
use genstudio_client::credentials::FileCredentialStore;
use genstudio_client::error::ClientError;
use genstudio_client::events::CoordinatorEvent;
use genstudio_client::http::HttpClient;
use genstudio_client::model::{GenerationRequest, GenerationResult, UploadFile};
use genstudio_core::credentials::Credentials;
use genstudio_core::generation::{validate_history_limit, Style};
use genstudio_core::overload::OverloadSimulator;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "genstudio", version, about = "Image generation client")]
struct Cli {
    /// Server base URL (overrides GENSTUDIO_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Session token file (overrides GENSTUDIO_TOKEN_PATH)
    #[arg(long, global = true, value_name = "FILE")]
    token_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and store its session token
    Signup(AuthArgs),
    /// Log in and store the session token
    Login(AuthArgs),
    /// Forget the stored session token
    Logout,
    /// Show who the stored token belongs to
    Whoami,
    /// Generate an image from a prompt and a source picture
    Generate(GenerateArgs),
    /// List recent generations, newest first
    History {
        /// Number of entries (1-50)
        #[arg(long)]
        limit: Option<i64>,
    },
}

#[derive(clap::Args, Debug)]
struct AuthArgs {
    #[arg(long)]
    email: String,
    #[arg(long, env = "GENSTUDIO_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    #[arg(long)]
    prompt: String,
    /// One of: realistic, anime, oil-painting, watercolor, digital-art, 3d-render
    #[arg(long, default_value = "realistic")]
    style: String,
    /// JPEG or PNG source image, at most 10 MiB
    #[arg(long, value_name = "FILE")]
    file: PathBuf,
    /// Total attempts (overrides GENSTUDIO_MAX_RETRIES)
    #[arg(long)]
    max_retries: Option<u32>,
    /// Delay between attempts in ms (overrides GENSTUDIO_RETRY_DELAY_MS)
    #[arg(long)]
    retry_delay_ms: Option<u64>,
    /// Disable the client-side overload simulation
    #[arg(long)]
    no_simulated_overload: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "genstudio_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }
    if let Some(path) = cli.token_path {
        config.token_path = path;
    }

    let credentials = Arc::new(FileCredentialStore::new(config.token_path.clone()));
    let client = Arc::new(HttpClient::new(config.api_url.clone(), credentials));

    match cli.command {
        Command::Signup(args) => {
            client
                .signup(&Credentials::new(args.email, args.password))
                .await?;
            println!("Account created. You are logged in.");
        }
        Command::Login(args) => {
            client
                .login(&Credentials::new(args.email, args.password))
                .await?;
            println!("Login successful.");
        }
        Command::Logout => {
            let message = client.logout().await?;
            println!("{message}");
        }
        Command::Whoami => {
            let user = client.verify().await?;
            println!("{} (id {})", user.email, user.id);
        }
        Command::History { limit } => {
            let limit = validate_history_limit(limit).map_err(ClientError::from)?;
            let entries = client.history(limit).await?;
            if entries.is_empty() {
                println!("No generations yet.");
            }
            for entry in &entries {
                print_generation(entry);
            }
        }
        Command::Generate(args) => run_generate(client, config, args).await?,
    }

    Ok(())
}

async fn run_generate(client: Arc<HttpClient>, mut config: ClientConfig, args: GenerateArgs) -> Result<()> {
    if let Some(max_retries) = args.max_retries {
        config.max_retries = max_retries;
    }
    if let Some(delay) = args.retry_delay_ms {
        config.retry_delay_ms = delay;
    }
    let mut options = config.coordinator_options();
    if args.no_simulated_overload {
        options.overload = OverloadSimulator::disabled();
    }

    let style: Style = args.style.parse().map_err(ClientError::from)?;
    let file = UploadFile::from_path(&args.file)
        .await
        .with_context(|| format!("loading {}", args.file.display()))?;
    let request = GenerationRequest::new(args.prompt, style, file);

    let coordinator = RequestCoordinator::new(client, options);
    let printer = tokio::spawn(print_progress(coordinator.subscribe_events()));

    let outcome = {
        let run = coordinator.generate(request);
        tokio::pin!(run);
        tokio::select! {
            outcome = &mut run => outcome,
            _ = tokio::signal::ctrl_c() => {
                coordinator.abort().await;
                run.await
            }
        }
    };
    let history = coordinator.history().entries();
    drop(coordinator);
    let _ = printer.await;

    match outcome {
        Ok(result) => {
            print_generation(&result);
            if !history.is_empty() {
                println!("\nRecent generations:");
                for entry in &history {
                    print_generation(entry);
                }
            }
            Ok(())
        }
        Err(ClientError::Cancelled) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Print coordinator events until the coordinator is dropped.
async fn print_progress(mut events: tokio::sync::broadcast::Receiver<CoordinatorEvent>) {
    loop {
        match events.recv().await {
            Ok(CoordinatorEvent::Started { style, .. }) => {
                eprintln!("Generating ({})...", style.label());
            }
            Ok(CoordinatorEvent::Retrying { attempt, max_retries }) => {
                eprintln!("Model is currently overloaded. Retrying... ({attempt}/{max_retries})");
            }
            Ok(CoordinatorEvent::MaxRetriesReached { .. }) => {
                eprintln!("Model is overloaded. Maximum retries reached. Please try again later.");
            }
            Ok(CoordinatorEvent::Succeeded(_)) => eprintln!("Image generated successfully!"),
            Ok(CoordinatorEvent::Aborted) => eprintln!("Generation aborted"),
            Ok(CoordinatorEvent::Failed { message }) => {
                eprintln!("Error while generating: {message}");
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

fn print_generation(entry: &GenerationResult) {
    println!(
        "#{:<5} {}  [{}]  {}  {}",
        entry.id,
        entry.created_at.format("%Y-%m-%d %H:%M:%S"),
        entry.style,
        entry.prompt,
        entry.image_url,
    );
}
