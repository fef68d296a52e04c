use clap::Parser;
use eyre::Result;
use moodlog_client::context::AppContext;
use moodlog_client::guard::INDEX;
use moodlog_client::push::{disable_push, enable_push};
use moodlog_client::settings::Settings;
use moodlog_client::worker::{resolve_click, ClickAction, DesktopNotifier, Notifier, PushMessage};

#[derive(Parser, Debug)]
#[clap(infer_subcommands = true)]
pub enum Cmd {
    /// Subscribe this machine to reminders
    Enable,
    /// Stop reminders on this machine
    Disable,
    /// Show a notification from a push payload
    Show {
        /// JSON payload or plain text
        payload: Option<String>,
        /// Urls of the windows that are open, used to decide what a click does
        #[arg(long = "window")]
        windows: Vec<String>,
    },
}

impl Cmd {
    pub async fn run(self, settings: Settings) -> Result<()> {
        match self {
            Self::Enable => {
                let (ctx, _) = AppContext::new(settings, INDEX).await?;
                let sub = enable_push(&ctx).await?;
                println!("Reminders enabled.");
                println!("Endpoint: {}", sub.endpoint);
                Ok(())
            }
            Self::Disable => {
                let (ctx, _) = AppContext::new(settings, INDEX).await?;
                disable_push(&ctx).await?;
                println!("Reminders disabled.");
                Ok(())
            }
            Self::Show { payload, windows } => {
                let msg = PushMessage::parse(payload.as_deref());
                DesktopNotifier.show(&msg)?;

                match resolve_click(&windows, &msg.url) {
                    ClickAction::Focus(idx) => println!("Click focuses {}", windows[idx]),
                    ClickAction::Open(url) => println!("Click opens {url}"),
                }
                Ok(())
            }
        }
    }
}
