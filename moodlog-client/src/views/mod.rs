//! Text views. Each view renders the whole screen in one go.

use crate::cache::LAST_EMAIL_KEY;
use crate::context::AppContext;
use crate::entries;
use crate::guard::{ADVICE, HISTORY, HOME, LOGIN, NEW_ENTRY, REGISTER};
use moodlog_common::domain::{format_date, Entry};

mod advice;
mod auth;
mod entry;
mod home;

pub use advice::advice;
pub use auth::{login, register};
pub use entry::{history, new_entry};
pub use home::home;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    New,
    History,
    Advice,
}

const TABS: [(Tab, &str, &str); 4] = [
    (Tab::Home, "Start", HOME),
    (Tab::New, "New entry", NEW_ENTRY),
    (Tab::History, "History", HISTORY),
    (Tab::Advice, "Advice", ADVICE),
];

/// Frame shared by the private views: title, signed in email and the tab bar.
pub(crate) async fn render_shell(ctx: &AppContext, title: &str, active: Tab, content: &str) {
    let email = match ctx.backend.session() {
        Some(u) => u.email,
        None => ctx.cache.get(LAST_EMAIL_KEY, String::new()).await,
    };

    let mut out = String::new();
    line(&mut out, format!("== {title} =="));
    if !email.is_empty() {
        line(&mut out, format!("Logged in as: {email}"));
    }
    let tabs = TABS
        .iter()
        .map(|(tab, label, path)| {
            if *tab == active {
                format!("[*{label}*]")
            } else {
                format!("[{label} #{path}]")
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    line(&mut out, tabs);
    if ctx.screen.header().logout {
        line(&mut out, "(log out with `moodlog logout`)");
    }
    line(&mut out, "-".repeat(40));
    out.push_str(content);

    ctx.screen.render(out);
}

pub(crate) fn line(out: &mut String, text: impl AsRef<str>) {
    out.push_str(text.as_ref());
    out.push('\n');
}

pub(crate) fn format_scale(value: Option<impl std::fmt::Display>) -> String {
    value.map_or_else(|| "—".to_string(), |v| v.to_string())
}

pub(crate) fn format_entry(ctx: &AppContext, entry: &Entry) -> String {
    let mut out = String::new();
    line(
        &mut out,
        format!(
            "{}  mood {}  energy {}  stress {}  [{}]",
            format_date(entry.entry_date),
            format_scale(entry.mood),
            format_scale(entry.energy),
            format_scale(entry.stress),
            entry.id
        ),
    );
    if let Some(note) = entry.note.as_deref().filter(|x| !x.is_empty()) {
        line(&mut out, format!("    {note}"));
    }
    if let Some(url) = entries::photo_url(ctx, entry.photo_path.as_deref()) {
        line(&mut out, format!("    photo: {url}"));
    }
    out
}

pub async fn index(ctx: &AppContext) -> eyre::Result<()> {
    ctx.screen.render(format!(
        "Moodlog\n\
         A daily journal for your mood, energy and stress.\n\n\
         [Log in #{LOGIN}] [Create account #{REGISTER}]\n"
    ));
    Ok(())
}

pub async fn offline(ctx: &AppContext) -> eyre::Result<()> {
    let key = entries::cache_key(ctx);
    let cached: serde_json::Value = ctx.cache.get(&key, serde_json::Value::Array(vec![])).await;
    let pretty = serde_json::to_string_pretty(&cached).unwrap_or_else(|_| "none".to_string());

    ctx.screen.render(format!(
        "Offline mode\n\
         Status: {}\n\n\
         Entries (cache)\n\
         {pretty}\n\n\
         [Back #/]\n",
        ctx.network.label()
    ));
    Ok(())
}

pub async fn not_found(ctx: &AppContext) -> eyre::Result<()> {
    ctx.screen.render("404\nView not found.\n");
    Ok(())
}
