use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use toolhub_client::api::{ClientAppUpdate, NewClientApp};
use toolhub_client::auth::Credentials;
use toolhub_client::config::{self, ClientConfig};
use toolhub_client::logging;
use toolhub_client::notifications::{Notification, NotificationLevel, Notifier};
use toolhub_client::App;

#[derive(Parser, Debug)]
#[command(name = "toolhub", version, about = "Toolhub API client")]
struct Cli {
    /// Toolhub instance, e.g. https://toolhub.wikimedia.org/
    #[arg(
        long,
        global = true,
        env = config::ENV_BASE_URL,
        default_value = config::DEFAULT_BASE_URL
    )]
    base_url: String,

    /// Django session cookie of a signed-in browser session
    #[arg(long, global = true, env = config::ENV_SESSION_ID, hide_env_values = true)]
    session_id: Option<String>,

    /// OAuth bearer token; wins over --session-id
    #[arg(long, global = true, env = config::ENV_ACCESS_TOKEN, hide_env_values = true)]
    access_token: Option<String>,

    #[arg(long, global = true, env = config::ENV_TIMEOUT_SECS)]
    timeout_secs: Option<u64>,

    /// banana-i18n message file layered over English
    #[arg(long, global = true, env = config::ENV_MESSAGES)]
    messages: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the current user
    Whoami,

    /// Crawler URLs registered by the current user
    Urls {
        #[command(subcommand)]
        cmd: UrlsCommand,
    },

    /// OAuth client applications owned by the current user
    Apps {
        #[command(subcommand)]
        cmd: AppsCommand,
    },

    /// Applications the current user has authorized
    Authorized {
        #[command(subcommand)]
        cmd: AuthorizedCommand,
    },
}

#[derive(Subcommand, Debug)]
enum UrlsCommand {
    List,
    Register { url: String },
    Unregister { url: String },
}

#[derive(Subcommand, Debug)]
enum AppsCommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        redirect_url: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Change the redirect URL of an application
    Update {
        client_id: String,
        #[arg(long)]
        redirect_url: String,
    },
    Delete { client_id: String },
}

#[derive(Subcommand, Debug)]
enum AuthorizedCommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Revoke an authorization by id
    Revoke { id: i64 },
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::new(&self.base_url)?;
        config.credentials =
            Credentials::from_parts(self.session_id.clone(), self.access_token.clone());
        config.timeout = self.timeout_secs.map(Duration::from_secs);
        config.messages_path = self.messages.clone();
        Ok(config)
    }
}

/// Prints notifications to stderr so stdout stays machine-readable.
struct ConsoleNotifier;

#[async_trait::async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        match notification.level {
            NotificationLevel::Success => eprintln!("✓ {}", notification.message),
            NotificationLevel::Error => eprintln!("✗ {}", notification.message),
        }
        Ok(())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.client_config()?;
    let mut app = App::from_config(&config, Arc::new(ConsoleNotifier))?;

    // Every mutation needs the CSRF token that comes with the user record.
    app.get_user_info()
        .await
        .context("failed to fetch the current user")?;

    match cli.cmd {
        Command::Whoami => print_json(app.store().user.user())?,

        Command::Urls { cmd } => run_urls(&mut app, cmd).await?,

        Command::Apps { cmd } => run_apps(&mut app, cmd).await?,

        Command::Authorized { cmd } => run_authorized(&mut app, cmd).await?,
    }
    Ok(())
}

async fn run_urls(app: &mut App, cmd: UrlsCommand) -> Result<()> {
    match cmd {
        UrlsCommand::List => {
            app.get_urls_created_by_user().await?;
            print_json(app.store().user.user_created_urls())
        }
        UrlsCommand::Register { url } => {
            let created = app.register_url(&url).await?;
            print_json(&created)
        }
        UrlsCommand::Unregister { url } => {
            app.get_urls_created_by_user().await?;
            let Some(target) = app.store().user.find_url(&url).cloned() else {
                bail!("{url} is not registered");
            };
            app.unregister_url(&target).await?;
            print_json(&target)
        }
    }
}

async fn run_apps(app: &mut App, cmd: AppsCommand) -> Result<()> {
    match cmd {
        AppsCommand::List { page } => {
            app.list_client_apps(page).await?;
            let oauth = &app.store().oauth;
            print_json(&json!({
                "count": oauth.num_client_apps(),
                "results": oauth.client_apps(),
            }))
        }
        AppsCommand::Register {
            name,
            redirect_url,
            description,
        } => {
            let created = app
                .register_app(&NewClientApp {
                    name,
                    redirect_url,
                    description,
                })
                .await?;
            print_json(&created)
        }
        AppsCommand::Update {
            client_id,
            redirect_url,
        } => {
            let updated = app
                .update_client_app(&ClientAppUpdate {
                    client_id,
                    redirect_url,
                })
                .await?;
            print_json(&updated)
        }
        AppsCommand::Delete { client_id } => {
            app.delete_client_app(&client_id).await?;
            Ok(())
        }
    }
}

async fn run_authorized(app: &mut App, cmd: AuthorizedCommand) -> Result<()> {
    match cmd {
        AuthorizedCommand::List { page } => {
            app.list_authorized_apps(page).await?;
            let oauth = &app.store().oauth;
            print_json(&json!({
                "count": oauth.num_authorized_apps(),
                "results": oauth.authorized_apps(),
            }))
        }
        AuthorizedCommand::Revoke { id } => {
            app.delete_authorized_app(id).await?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    logging::init(logging::DEFAULT_FILTER);

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
