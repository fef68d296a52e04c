use crate::cache::PUSH_SUBSCRIPTION_KEY;
use crate::context::AppContext;
use base64::prelude::{Engine as _, BASE64_URL_SAFE_NO_PAD};
use eyre::{bail, Result};
use moodlog_common::api::PushSubscriptionRequest;
use moodlog_common::utils::crypto_random_string;
use tracing::{info, warn};

/// Length of an uncompressed P-256 public key.
const VAPID_KEY_LEN: usize = 65;

/// This machine's push subscription, kept in the local cache.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}

/// Decodes a url-safe base64 application server key. Padding is optional.
pub fn decode_vapid_key(key: &str) -> Result<Vec<u8>> {
    let trimmed = key.trim().trim_end_matches('=');
    let bytes = match BASE64_URL_SAFE_NO_PAD.decode(trimmed) {
        Ok(b) => b,
        Err(_) => bail!("Invalid VAPID public key."),
    };
    if bytes.len() != VAPID_KEY_LEN || bytes[0] != 0x04 {
        bail!("Invalid VAPID public key.");
    }
    Ok(bytes)
}

pub fn user_agent() -> String {
    format!(
        "moodlog/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        whoami::platform(),
        whoami::distro()
    )
}

fn random_key<const N: usize>() -> Result<String> {
    crypto_random_string::<N>().map_err(|err| eyre::eyre!("Failed to generate key: {err}"))
}

async fn local_subscription(ctx: &AppContext) -> Option<PushSubscription> {
    ctx.cache.get(PUSH_SUBSCRIPTION_KEY, None).await
}

/// Subscribes this machine and records the subscription for the signed in user. Enabling
/// again reuses the existing subscription.
pub async fn enable_push(ctx: &AppContext) -> Result<PushSubscription> {
    decode_vapid_key(&ctx.settings.vapid_public_key)?;

    if ctx.backend.session().is_none() {
        bail!("No user.");
    }

    let sub = match local_subscription(ctx).await {
        Some(s) => s,
        None => {
            let s = PushSubscription {
                endpoint: format!(
                    "{}/push/endpoint/{}",
                    ctx.settings.server_address,
                    random_key::<16>()?
                ),
                p256dh: random_key::<65>()?,
                auth: random_key::<16>()?,
            };
            ctx.cache.set(PUSH_SUBSCRIPTION_KEY, &s).await?;
            s
        }
    };

    if sub.endpoint.is_empty() || sub.p256dh.is_empty() || sub.auth.is_empty() {
        bail!("Incomplete push subscription.");
    }

    ctx.backend
        .upsert_push_subscription(&PushSubscriptionRequest {
            endpoint: sub.endpoint.clone(),
            p256dh: sub.p256dh.clone(),
            auth: sub.auth.clone(),
            user_agent: user_agent(),
        })
        .await?;

    info!("push enabled for {}", sub.endpoint);
    Ok(sub)
}

/// Drops the local subscription and marks it inactive remotely. Nothing to do is fine, and
/// a failed remote update is only logged.
pub async fn disable_push(ctx: &AppContext) -> Result<()> {
    let Some(sub) = local_subscription(ctx).await else {
        return Ok(());
    };

    ctx.cache.remove(PUSH_SUBSCRIPTION_KEY).await?;

    if let Err(err) = ctx.backend.deactivate_push_subscription(&sub.endpoint).await {
        warn!("failed to disable push remotely: {err}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str =
        "BP0kz7vkwdiIQ_uygSK2SIcA_nEoDoXFuwKlnXrszPyHLYQRjfCHZVQdbIiGxUhDwaxlvY8yc1ss3miaUzMeDUc";

    #[test]
    fn vapid_key_is_decoded() {
        let bytes = decode_vapid_key(KEY).unwrap();
        assert_eq!(bytes.len(), 65);
        assert_eq!(bytes[0], 4);
    }

    #[test]
    fn bad_vapid_keys_are_rejected() {
        assert!(decode_vapid_key("").is_err());
        assert!(decode_vapid_key("not*base64").is_err());
        assert!(decode_vapid_key("AAAA").is_err());
    }
}
