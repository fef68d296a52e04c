use super::{format_entry, format_scale, line, render_shell, Tab};
use crate::account::{avatar_url, fetch_profile, greeting_name};
use crate::context::AppContext;
use crate::entries::{fetch_entries, photo_url, today_entry};
use crate::weather::current_weather;
use eyre::Result;
use moodlog_common::domain::{format_date, today};
use tracing::debug;

/// Enough entries to find today's one among several per day.
const HOME_LIMIT: u32 = 30;
const RECENT: usize = 7;

pub async fn home(ctx: &AppContext) -> Result<()> {
    let user = ctx.backend.session();

    let profile = match fetch_profile(ctx).await {
        Ok(p) => p,
        Err(err) => {
            debug!("profile unavailable: {err}");
            None
        }
    };
    let name = greeting_name(profile.as_ref(), user.as_ref());
    let avatar = avatar_url(ctx, profile.as_ref()).unwrap_or_else(|| "🙂".to_string());
    let weather = current_weather(ctx).await;

    let (entries, load_error) = match fetch_entries(ctx, HOME_LIMIT).await {
        Ok(e) => (e, None),
        Err(err) => (Vec::new(), Some(err.to_string())),
    };

    let mut out = String::new();
    line(&mut out, format!("Hello, {name}!  {avatar}"));
    line(
        &mut out,
        format!(
            "{} {}",
            weather.icon.as_deref().unwrap_or("⛅"),
            weather.text
        ),
    );
    line(&mut out, "");

    let today = today();
    line(&mut out, format!("TODAY {}", format_date(today)));
    match today_entry(&entries, today) {
        Some(e) => {
            line(
                &mut out,
                format!(
                    "  mood {}  energy {}  stress {}",
                    format_scale(e.mood),
                    format_scale(e.energy),
                    format_scale(e.stress)
                ),
            );
            if let Some(note) = e.note.as_deref().filter(|x| !x.is_empty()) {
                line(&mut out, format!("  {note}"));
            }
            if let Some(url) = photo_url(ctx, e.photo_path.as_deref()) {
                line(&mut out, format!("  photo: {url}"));
            }
        }
        None => {
            line(&mut out, "  You have not added an entry today yet.");
        }
    }
    line(&mut out, "");

    if let Some(err) = load_error {
        line(&mut out, format!("Error: {err}"));
    } else if entries.is_empty() {
        line(&mut out, "No entries yet.");
    } else {
        line(&mut out, "Recent entries");
        for e in entries.iter().take(RECENT) {
            out.push_str(&format_entry(ctx, e));
        }
    }

    render_shell(ctx, "Start", Tab::Home, &out).await;
    Ok(())
}
