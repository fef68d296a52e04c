use base64::prelude::{Engine, BASE64_URL_SAFE_NO_PAD};
use std::path::PathBuf;

#[cfg(not(target_os = "windows"))]
pub fn home_dir() -> PathBuf {
    std::env::var("HOME").map_or_else(|_| PathBuf::from("."), PathBuf::from)
}

#[cfg(target_os = "windows")]
pub fn home_dir() -> PathBuf {
    std::env::var("USERPROFILE").map_or_else(|_| PathBuf::from("."), PathBuf::from)
}

pub fn config_dir() -> PathBuf {
    let config_dir =
        std::env::var("XDG_CONFIG_HOME").map_or_else(|_| home_dir().join(".config"), PathBuf::from);
    config_dir.join("moodlog")
}

pub fn data_dir() -> PathBuf {
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map_or_else(|_| home_dir().join(".local").join("share"), PathBuf::from);
    data_dir.join("moodlog")
}

/// Url safe random token of `N` random bytes. Used for session tokens.
pub fn crypto_random_string<const N: usize>() -> Result<String, getrandom::Error> {
    let mut bytes = [0u8; N];
    getrandom::getrandom(&mut bytes)?;
    Ok(BASE64_URL_SAFE_NO_PAD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_strings_differ() {
        let a = crypto_random_string::<24>().unwrap();
        let b = crypto_random_string::<24>().unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }
}
