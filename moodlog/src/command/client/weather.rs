use clap::Parser;
use eyre::Result;
use moodlog_client::context::AppContext;
use moodlog_client::guard::INDEX;
use moodlog_client::settings::Settings;
use moodlog_client::weather::{current_weather, refresh_weather};

#[derive(Parser, Debug)]
pub struct Cmd {
    /// Ignore the cached value
    #[arg(long, short)]
    pub refresh: bool,
}

impl Cmd {
    pub async fn run(self, settings: Settings) -> Result<()> {
        let (ctx, _) = AppContext::new(settings, INDEX).await?;

        let report = if self.refresh {
            refresh_weather(&ctx).await
        } else {
            current_weather(&ctx).await
        };

        let icon = report.icon.as_deref().unwrap_or("⛅");
        if report.from_cache {
            println!("{icon} {} (cached)", report.text);
        } else {
            println!("{icon} {}", report.text);
        }
        Ok(())
    }
}
