use super::{line, render_shell, Tab};
use crate::context::AppContext;
use crate::entries::fetch_entries;
use eyre::Result;
use moodlog_common::wellbeing::{daily_tip, interpret, score_7_days};
use time::OffsetDateTime;
use tracing::debug;

const DISCLAIMER: &str = "This is a simple suggestion, not a diagnosis. If you have been feeling bad for a longer time, consider talking to a specialist.";

pub async fn advice(ctx: &AppContext) -> Result<()> {
    let entries = match fetch_entries(ctx, 7).await {
        Ok(e) => e,
        Err(err) => {
            debug!("advice without entries: {err}");
            Vec::new()
        }
    };
    let summary = score_7_days(&entries);

    let mut out = String::new();
    match &summary {
        Some(s) => {
            let level = interpret(Some(s));
            line(&mut out, format!("Wellbeing score: {} / 100 ({} days)", s.percent(), s.days));
            line(&mut out, format!("{}: {}", level.label(), level.message()));
        }
        None => {
            let days = OffsetDateTime::now_utc().unix_timestamp().div_euclid(86_400);
            line(&mut out, daily_tip(days));
        }
    }
    line(&mut out, "");
    line(&mut out, DISCLAIMER);

    render_shell(ctx, "Advice for today", Tab::Advice, &out).await;
    Ok(())
}
