use clap::Subcommand;
use eyre::Result;

mod client;
mod server;

#[derive(Subcommand)]
pub enum MoodlogCmd {
    #[command(flatten)]
    Client(client::Cmd),

    #[command(subcommand)]
    Server(server::Cmd),
}

impl MoodlogCmd {
    pub fn run(self) -> Result<()> {
        match self {
            Self::Server(cmd) => cmd.run(),
            Self::Client(cmd) => cmd.run(),
        }
    }
}
