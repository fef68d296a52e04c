use super::{open_app, print_screen};
use clap::Parser;
use eyre::{Context, Result};
use moodlog_client::account::{self, RegisterForm};
use moodlog_client::guard::{HOME, LOGIN, REGISTER};
use moodlog_client::settings::Settings;
use moodlog_client::utils::{read_input, read_input_hidden};
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct LoginCmd {
    #[arg(long, short)]
    pub email: Option<String>,
    #[arg(long, short)]
    pub password: Option<String>,
}

impl LoginCmd {
    pub async fn run(self, settings: Settings) -> Result<()> {
        let mut app = open_app(settings, LOGIN).await?;
        let ctx = app.context().clone();

        if ctx.backend.session().is_some() {
            println!("You are already logged in.");
            return Ok(());
        }

        let email = match self.email {
            Some(e) => e,
            None => read_input("email")?,
        };
        let password = match self.password {
            Some(p) => p,
            None => read_input_hidden("password")?,
        };

        account::sign_in(&ctx, &email, &password).await?;
        app.pump().await?;

        print_screen(&app);
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct RegisterCmd {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long, short)]
    pub email: Option<String>,
    #[arg(long, short)]
    pub password: Option<String>,
}

impl RegisterCmd {
    pub async fn run(self, settings: Settings) -> Result<()> {
        let mut app = open_app(settings, REGISTER).await?;
        let ctx = app.context().clone();

        let form = RegisterForm {
            first_name: match self.first_name {
                Some(x) => x,
                None => read_input("first name")?,
            },
            last_name: match self.last_name {
                Some(x) => x,
                None => read_input("last name")?,
            },
            email: match self.email {
                Some(x) => x,
                None => read_input("email")?,
            },
            password: match self.password {
                Some(x) => x,
                None => read_input_hidden("password")?,
            },
        };

        let user = account::sign_up(&ctx, form).await?;
        app.pump().await?;

        println!("Account created for {}. You can log in now.\n", user.email);
        print_screen(&app);
        Ok(())
    }
}

pub async fn logout(settings: Settings) -> Result<()> {
    let mut app = open_app(settings, HOME).await?;
    let ctx = app.context().clone();

    account::sign_out(&ctx).await?;
    app.pump().await?;

    print_screen(&app);
    Ok(())
}

#[derive(Parser, Debug)]
pub struct AvatarCmd {
    /// Image file to upload
    pub file: PathBuf,
}

impl AvatarCmd {
    pub async fn run(self, settings: Settings) -> Result<()> {
        let bytes = fs_err::read(&self.file).wrap_err("Failed to read the avatar file")?;
        let file_name = self
            .file
            .file_name()
            .and_then(|x| x.to_str())
            .unwrap_or("avatar.jpg")
            .to_string();

        let mut app = open_app(settings, HOME).await?;
        let ctx = app.context().clone();

        account::upload_avatar(&ctx, &file_name, bytes).await?;
        app.refresh().await?;

        print_screen(&app);
        Ok(())
    }
}
