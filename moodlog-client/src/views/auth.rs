use crate::context::AppContext;
use crate::guard::{LOGIN, REGISTER};
use eyre::Result;

fn offline_note(ctx: &AppContext, what: &str) -> String {
    if ctx.network.is_online() {
        String::new()
    } else {
        format!("\nNo internet connection: {what} is unavailable offline.\n")
    }
}

pub async fn login(ctx: &AppContext) -> Result<()> {
    ctx.screen.render(format!(
        "Log in\n\n\
         moodlog login --email <EMAIL> [--password <PASSWORD>]\n\
         {}\n\
         [or create an account #{REGISTER}]\n",
        offline_note(ctx, "logging in")
    ));
    Ok(())
}

pub async fn register(ctx: &AppContext) -> Result<()> {
    ctx.screen.render(format!(
        "Create account\n\n\
         moodlog register --first-name <NAME> --last-name <NAME> --email <EMAIL> [--password <PASSWORD>]\n\
         The password needs at least 6 characters.\n\
         {}\n\
         [or log in #{LOGIN}]\n",
        offline_note(ctx, "registration")
    ));
    Ok(())
}
