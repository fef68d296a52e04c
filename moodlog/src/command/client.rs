use clap::Parser;
use eyre::Result;
use moodlog_client::app::App;
use moodlog_client::context::AppContext;
use moodlog_client::guard::{ADVICE, HOME, INDEX, OFFLINE};
use moodlog_client::settings::Settings;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod account;
mod entry;
mod info;
mod push;
mod weather;
mod worker;

#[derive(Parser, Debug)]
#[clap(infer_subcommands = true)]
pub enum Cmd {
    /// Render the view at a fragment path, e.g. `/(tabs)/home`
    Open { path: Option<String> },
    /// Greeting, weather, today's entry and the latest entries
    Home,
    /// Entries, optionally limited to a date range
    History(entry::HistoryCmd),
    /// Wellbeing score of the last seven entries
    Advice,
    /// Connection status and the cached entries
    Offline,
    Login(account::LoginCmd),
    Register(account::RegisterCmd),
    Logout,
    /// Record today's mood, energy and stress
    Add(entry::AddCmd),
    /// Change the date, mood or note of an entry
    Edit(entry::EditCmd),
    Delete(entry::DeleteCmd),
    /// Upload a new avatar image
    Avatar(account::AvatarCmd),
    Weather(weather::Cmd),
    #[command(subcommand)]
    Push(push::Cmd),
    #[command(subcommand)]
    Worker(worker::Cmd),
    Info,
}

/// Builds the app at `path` without rendering anything yet.
pub(crate) async fn build_app(settings: Settings, path: &str) -> Result<App> {
    let (ctx, changes) = AppContext::new(settings, &format!("#{path}")).await?;
    Ok(App::new(ctx, changes))
}

/// Opens the app at `path` and settles the startup navigation.
pub(crate) async fn open_app(settings: Settings, path: &str) -> Result<App> {
    let mut app = build_app(settings, path).await?;
    app.start().await?;
    Ok(app)
}

pub(crate) fn print_screen(app: &App) {
    println!("{}", app.context().screen.content());
}

impl Cmd {
    #[tokio::main]
    pub async fn run(self) -> Result<()> {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();

        tracing::trace!(command = ?self, "client command");

        let settings = Settings::new()?;

        match self {
            Self::Open { path } => {
                let app = open_app(settings, path.as_deref().unwrap_or(INDEX)).await?;
                print_screen(&app);
                Ok(())
            }
            Self::Home => {
                let app = open_app(settings, HOME).await?;
                print_screen(&app);
                Ok(())
            }
            Self::Advice => {
                let app = open_app(settings, ADVICE).await?;
                print_screen(&app);
                Ok(())
            }
            Self::Offline => {
                let app = open_app(settings, OFFLINE).await?;
                print_screen(&app);
                Ok(())
            }
            Self::History(cmd) => cmd.run(settings).await,
            Self::Login(cmd) => cmd.run(settings).await,
            Self::Register(cmd) => cmd.run(settings).await,
            Self::Logout => account::logout(settings).await,
            Self::Add(cmd) => cmd.run(settings).await,
            Self::Edit(cmd) => cmd.run(settings).await,
            Self::Delete(cmd) => cmd.run(settings).await,
            Self::Avatar(cmd) => cmd.run(settings).await,
            Self::Weather(cmd) => cmd.run(settings).await,
            Self::Push(cmd) => cmd.run(settings).await,
            Self::Worker(cmd) => cmd.run(settings).await,
            Self::Info => info::run(settings).await,
        }
    }
}
