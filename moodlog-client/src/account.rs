use crate::backend::AVATARS_BUCKET;
use crate::cache::LAST_EMAIL_KEY;
use crate::context::AppContext;
use crate::guard::{HOME, LOGIN};
use eyre::{bail, Result};
use moodlog_common::api::RegisterRequest;
use moodlog_common::domain::{Profile, User};
use std::path::Path;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

pub async fn sign_in(ctx: &AppContext, email: &str, password: &str) -> Result<User> {
    if !ctx.network.is_online() {
        bail!("No internet connection: logging in is unavailable offline.");
    }

    let email = email.trim();
    let user = match ctx.backend.sign_in(email, password).await {
        Ok(u) => u,
        Err(err) => bail!("Login failed: {err}"),
    };

    if let Err(err) = ctx.cache.set(LAST_EMAIL_KEY, email).await {
        warn!("failed to remember last email: {err}");
    }
    ctx.location.navigate(HOME);

    Ok(user)
}

/// Creates the account and sends the user to the login page.
pub async fn sign_up(ctx: &AppContext, form: RegisterForm) -> Result<User> {
    if !ctx.network.is_online() {
        bail!("No internet connection: registration is unavailable offline.");
    }

    let req = RegisterRequest {
        email: form.email.trim().to_string(),
        password: form.password,
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
    };

    let user = match ctx.backend.sign_up(&req).await {
        Ok(u) => u,
        Err(err) => bail!("Registration failed: {err}"),
    };

    ctx.location.navigate(LOGIN);

    Ok(user)
}

pub async fn sign_out(ctx: &AppContext) -> Result<()> {
    ctx.backend.sign_out().await?;
    ctx.screen.set_header_for_auth(false);
    ctx.location.navigate(LOGIN);
    Ok(())
}

/// Profile of the signed in user, `None` without a session.
pub async fn fetch_profile(ctx: &AppContext) -> Result<Option<Profile>> {
    if ctx.backend.session().is_none() {
        return Ok(None);
    }
    Ok(Some(ctx.backend.profile().await?))
}

/// Name used in the greeting: profile first, then sign up metadata.
pub fn greeting_name(profile: Option<&Profile>, user: Option<&User>) -> String {
    let from_profile = profile
        .and_then(|p| p.first_name.as_deref())
        .map(str::trim)
        .filter(|x| !x.is_empty());
    let from_user = user
        .and_then(|u| u.first_name.as_deref())
        .map(str::trim)
        .filter(|x| !x.is_empty());

    from_profile
        .or(from_user)
        .unwrap_or("there")
        .to_string()
}

pub fn avatar_url(ctx: &AppContext, profile: Option<&Profile>) -> Option<String> {
    profile
        .and_then(|p| p.avatar_path.as_deref())
        .filter(|x| !x.is_empty())
        .map(|x| ctx.backend.public_url(AVATARS_BUCKET, x))
}

fn image_content_type(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "image/jpeg",
    }
}

/// Uploads an avatar under a fresh name and points the profile at it.
pub async fn upload_avatar(ctx: &AppContext, file_name: &str, bytes: Vec<u8>) -> Result<String> {
    if !ctx.network.is_online() {
        bail!("No internet connection: avatar upload is unavailable offline.");
    }

    let Some(user) = ctx.backend.session() else {
        bail!("No user in session.");
    };

    let ext = Path::new(file_name)
        .extension()
        .and_then(|x| x.to_str())
        .filter(|x| !x.is_empty())
        .unwrap_or("jpg")
        .to_lowercase();
    let path = format!("{}/{}.{ext}", user.id, Uuid::new_v4());

    debug!("uploading avatar to {path}");
    let path = match ctx
        .backend
        .upload(AVATARS_BUCKET, &path, bytes, image_content_type(&ext), true)
        .await
    {
        Ok(p) => p,
        Err(err) => bail!("Avatar upload: {err}"),
    };

    if let Err(err) = ctx.backend.set_avatar(&path).await {
        bail!("Saving profile: {err}");
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodlog_common::domain::UserId;

    fn profile(first_name: Option<&str>) -> Profile {
        Profile {
            id: UserId::new(),
            first_name: first_name.map(String::from),
            last_name: None,
            email: "a@b.pl".into(),
            avatar_path: None,
        }
    }

    fn user(first_name: Option<&str>) -> User {
        User {
            id: UserId::new(),
            email: "a@b.pl".into(),
            first_name: first_name.map(String::from),
            last_name: None,
        }
    }

    #[test]
    fn greeting_prefers_profile_then_metadata() {
        assert_eq!(
            greeting_name(Some(&profile(Some(" Ola "))), Some(&user(Some("Ala")))),
            "Ola"
        );
        assert_eq!(
            greeting_name(Some(&profile(Some("  "))), Some(&user(Some("Ala")))),
            "Ala"
        );
        assert_eq!(greeting_name(None, None), "there");
    }
}
