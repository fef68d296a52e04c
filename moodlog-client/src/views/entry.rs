use super::{format_entry, line, render_shell, Tab};
use crate::context::AppContext;
use crate::entries::fetch_entries;
use eyre::Result;
use moodlog_common::domain::{filter_by_date, format_date, today};

const HISTORY_LIMIT: u32 = 200;

pub async fn new_entry(ctx: &AppContext) -> Result<()> {
    let mut out = String::new();
    line(&mut out, format!("Date: {}", format_date(today())));
    line(&mut out, "");
    line(
        &mut out,
        "moodlog add --mood <1-10> --energy <1-10> --stress <1-10> [--note <TEXT>] [--photo <JPEG>] [--date <YYYY-MM-DD>]",
    );
    if !ctx.network.is_online() {
        line(&mut out, "");
        line(&mut out, "No internet connection: saving is unavailable offline.");
    }

    render_shell(ctx, "New entry", Tab::New, &out).await;
    Ok(())
}

pub async fn history(ctx: &AppContext) -> Result<()> {
    let filter = *ctx.history_filter.borrow();

    let mut out = String::new();
    if filter.from.is_some() || filter.to.is_some() {
        line(
            &mut out,
            format!(
                "Filter: {} .. {}",
                filter.from.map(format_date).unwrap_or_default(),
                filter.to.map(format_date).unwrap_or_default()
            ),
        );
    }

    match fetch_entries(ctx, HISTORY_LIMIT).await {
        Ok(entries) => {
            let entries = filter_by_date(&entries, filter.from, filter.to);
            if entries.is_empty() {
                line(&mut out, "No entries.");
            }
            for e in &entries {
                out.push_str(&format_entry(ctx, e));
            }
        }
        Err(err) => {
            line(&mut out, format!("Error: {err}"));
        }
    }

    render_shell(ctx, "History", Tab::History, &out).await;
    Ok(())
}
