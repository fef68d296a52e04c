use super::{build_app, open_app, print_screen};
use clap::Parser;
use eyre::{Context, Result};
use moodlog_client::entries::{self, DateFilter, EntryChange, EntryDraft};
use moodlog_client::guard::{HISTORY, HOME, NEW_ENTRY};
use moodlog_client::settings::Settings;
use moodlog_common::domain::{parse_date, today};
use std::path::PathBuf;
use time::Date;
use uuid::Uuid;

fn date_arg(value: &str) -> Result<Date, String> {
    parse_date(value).map_err(|_| format!("expected a YYYY-MM-DD date, got {value:?}"))
}

#[derive(Parser, Debug)]
pub struct HistoryCmd {
    /// First day to show, inclusive
    #[arg(long, value_parser = date_arg)]
    pub from: Option<Date>,
    /// Last day to show, inclusive
    #[arg(long, value_parser = date_arg)]
    pub to: Option<Date>,
}

impl HistoryCmd {
    pub async fn run(self, settings: Settings) -> Result<()> {
        let mut app = build_app(settings, HISTORY).await?;
        app.context().history_filter.send_replace(DateFilter {
            from: self.from,
            to: self.to,
        });
        app.start().await?;

        print_screen(&app);
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct AddCmd {
    #[arg(long, short)]
    pub mood: i64,
    #[arg(long, short)]
    pub energy: i64,
    #[arg(long, short)]
    pub stress: i64,
    #[arg(long, short)]
    pub note: Option<String>,
    /// Defaults to today
    #[arg(long, short, value_parser = date_arg)]
    pub date: Option<Date>,
    /// JPEG photo for the entry
    #[arg(long)]
    pub photo: Option<PathBuf>,
}

impl AddCmd {
    pub async fn run(self, settings: Settings) -> Result<()> {
        let mut app = open_app(settings, NEW_ENTRY).await?;
        let ctx = app.context().clone();

        let photo_path = match &self.photo {
            Some(file) => {
                let bytes = fs_err::read(file).wrap_err("Failed to read the photo")?;
                Some(entries::upload_photo(&ctx, bytes).await?)
            }
            None => None,
        };

        let entry = entries::insert_entry(
            &ctx,
            EntryDraft {
                entry_date: self.date.unwrap_or_else(today),
                mood: self.mood,
                energy: self.energy,
                stress: self.stress,
                note: self.note,
                photo_path,
            },
        )
        .await?;
        tracing::info!(id = %entry.id, "entry saved");

        ctx.location.navigate(HOME);
        app.pump().await?;

        print_screen(&app);
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct EditCmd {
    pub id: Uuid,
    #[arg(long, short)]
    pub mood: i64,
    #[arg(long, short, value_parser = date_arg)]
    pub date: Date,
    /// An empty note clears it
    #[arg(long, short)]
    pub note: Option<String>,
}

impl EditCmd {
    pub async fn run(self, settings: Settings) -> Result<()> {
        let mut app = open_app(settings, HISTORY).await?;
        let ctx = app.context().clone();

        entries::update_entry(
            &ctx,
            self.id,
            EntryChange {
                entry_date: self.date,
                mood: self.mood,
                note: self.note,
            },
        )
        .await?;
        app.refresh().await?;

        print_screen(&app);
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct DeleteCmd {
    pub id: Uuid,
}

impl DeleteCmd {
    pub async fn run(self, settings: Settings) -> Result<()> {
        let mut app = open_app(settings, HISTORY).await?;
        let ctx = app.context().clone();

        entries::delete_entry(&ctx, self.id).await?;
        app.refresh().await?;

        print_screen(&app);
        Ok(())
    }
}
