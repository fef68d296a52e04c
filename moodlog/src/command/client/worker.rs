use clap::Parser;
use eyre::Result;
use moodlog_client::database::Database;
use moodlog_client::settings::Settings;
use moodlog_client::worker::{Request, Worker, CACHE_NAME};

#[derive(Parser, Debug)]
#[clap(infer_subcommands = true)]
pub enum Cmd {
    /// Precache the app shell
    Install,
    /// Remove caches of older versions
    Activate,
    /// Fetch a url network first, falling back to the cache
    Fetch {
        url: String,
        #[arg(long, short, default_value = "GET")]
        method: String,
    },
}

impl Cmd {
    pub async fn run(self, settings: Settings) -> Result<()> {
        let db = Database::new(&settings.db_path).await?;
        let worker = Worker::new(db, &settings.server_address);

        match self {
            Self::Install => {
                worker.install().await?;
                println!("Installed {CACHE_NAME}.");
            }
            Self::Activate => {
                let removed = worker.activate().await?;
                println!("Activated {CACHE_NAME}, removed {removed} old responses.");
            }
            Self::Fetch { url, method } => {
                let res = worker
                    .fetch(&Request {
                        method: method.to_uppercase(),
                        url,
                    })
                    .await?;

                eprintln!(
                    "status {} ({}) {}",
                    res.status,
                    if res.from_cache { "cache" } else { "network" },
                    res.content_type.as_deref().unwrap_or("")
                );
                println!("{}", String::from_utf8_lossy(&res.body));
            }
        }
        Ok(())
    }
}
