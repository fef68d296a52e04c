use crate::backend::PHOTOS_BUCKET;
use crate::cache::entries_key;
use crate::context::AppContext;
use eyre::{bail, Result};
use moodlog_common::api::{NewEntryRequest, UpdateEntryRequest};
use moodlog_common::domain::{Entry, Rating, UserId};
use time::Date;
use tracing::{debug, warn};
use uuid::Uuid;

const NO_USER: &str = "No user in session. Log in again.";

/// A new entry as typed by the user, before range validation.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub entry_date: Date,
    pub mood: i64,
    pub energy: i64,
    pub stress: i64,
    pub note: Option<String>,
    pub photo_path: Option<String>,
}

/// Inclusive date range of the history view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFilter {
    pub from: Option<Date>,
    pub to: Option<Date>,
}

#[derive(Debug, Clone)]
pub struct EntryChange {
    pub entry_date: Date,
    pub mood: i64,
    pub note: Option<String>,
}

fn rating(value: i64, name: &str) -> Result<Rating> {
    match Rating::try_from(value) {
        Ok(r) => Ok(r),
        Err(_) => bail!("{name} must be a number 1-10."),
    }
}

fn clean_note(note: Option<String>) -> Option<String> {
    note.map(|x| x.trim().to_string()).filter(|x| !x.is_empty())
}

fn current_user(ctx: &AppContext) -> Result<UserId> {
    match ctx.backend.session() {
        Some(u) => Ok(u.id),
        None => bail!(NO_USER),
    }
}

pub fn cache_key(ctx: &AppContext) -> String {
    entries_key(ctx.backend.session().map(|u| u.id).as_ref())
}

/// Latest entries, newest first. Offline the last list fetched for this user is returned,
/// online every fetch replaces that cached list.
pub async fn fetch_entries(ctx: &AppContext, limit: u32) -> Result<Vec<Entry>> {
    let key = cache_key(ctx);

    if !ctx.network.is_online() {
        debug!("offline, reading entries from {key}");
        return Ok(ctx.cache.get(&key, Vec::new()).await);
    }

    current_user(ctx)?;

    let entries = ctx.backend.list_entries(Some(limit)).await?;
    ctx.cache.set(&key, &entries).await?;

    Ok(entries)
}

pub async fn insert_entry(ctx: &AppContext, draft: EntryDraft) -> Result<Entry> {
    if !ctx.network.is_online() {
        bail!("No internet connection: saving is unavailable offline.");
    }

    let req = NewEntryRequest {
        entry_date: draft.entry_date,
        mood: rating(draft.mood, "Mood")?,
        energy: rating(draft.energy, "Energy")?,
        stress: rating(draft.stress, "Stress")?,
        note: clean_note(draft.note),
        photo_path: draft.photo_path.filter(|x| !x.is_empty()),
    };

    current_user(ctx)?;

    ctx.backend.insert_entry(&req).await
}

/// Only the date, mood and note change. The photo stays as it was.
pub async fn update_entry(ctx: &AppContext, id: Uuid, change: EntryChange) -> Result<Entry> {
    if !ctx.network.is_online() {
        bail!("No internet connection: editing is unavailable offline.");
    }

    let req = UpdateEntryRequest {
        entry_date: change.entry_date,
        mood: rating(change.mood, "Mood")?,
        note: clean_note(change.note),
    };

    current_user(ctx)?;

    ctx.backend.update_entry(id, &req).await
}

/// Deletes the row, then tries to remove its photo. A failed photo removal is only logged
/// and leaves the stored file behind.
pub async fn delete_entry(ctx: &AppContext, id: Uuid) -> Result<()> {
    if !ctx.network.is_online() {
        bail!("No internet connection: deleting is unavailable offline.");
    }

    if ctx.backend.session().is_none() {
        bail!("No user in session.");
    }

    let photo_path = ctx.backend.entry_photo(id).await?;
    ctx.backend.delete_entry(id).await?;

    if let Some(path) = photo_path {
        if let Err(err) = ctx.backend.remove(PHOTOS_BUCKET, &[path]).await {
            warn!("storage remove error: {err}");
        }
    }

    Ok(())
}

/// Uploads a prepared jpeg and returns its storage path.
pub async fn upload_photo(ctx: &AppContext, bytes: Vec<u8>) -> Result<String> {
    if !ctx.network.is_online() {
        bail!("No internet connection: photo upload is unavailable offline.");
    }

    let Some(user) = ctx.backend.session() else {
        bail!("No user in session.");
    };

    let path = format!("{}/{}.jpg", user.id, Uuid::new_v4());
    match ctx
        .backend
        .upload(PHOTOS_BUCKET, &path, bytes, "image/jpeg", false)
        .await
    {
        Ok(path) => Ok(path),
        Err(err) => bail!("Photo upload: {err}"),
    }
}

pub fn photo_url(ctx: &AppContext, photo_path: Option<&str>) -> Option<String> {
    photo_path
        .filter(|x| !x.is_empty())
        .map(|x| ctx.backend.public_url(PHOTOS_BUCKET, x))
}

pub fn today_entry(entries: &[Entry], today: Date) -> Option<&Entry> {
    entries.iter().find(|e| e.entry_date == today)
}
