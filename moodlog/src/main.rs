use clap::Parser;
use eyre::Result;
use moodlog::command::MoodlogCmd;
use moodlog::VERSION;

#[derive(Parser)]
#[command(
    author = "Sam Uherek",
    version = VERSION,
    about = "Daily mood, energy and stress journal",
    )]
struct Moodlog {
    #[command(subcommand)]
    moodlog: MoodlogCmd,
}

impl Moodlog {
    fn run(self) -> Result<()> {
        self.moodlog.run()
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    Moodlog::parse().run()
}
