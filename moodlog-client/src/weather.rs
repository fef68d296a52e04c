//! Weather line of the home screen.
//!
//! The position comes from a [`Geolocation`] source, the forecast from an Open-Meteo
//! compatible endpoint. The last successful result is cached for half an hour.

use crate::cache::WEATHER_KEY;
use crate::context::AppContext;
use crate::settings::WeatherSettings;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, warn};

const TTL_MS: i64 = 30 * 60 * 1000;
const POSITION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoError {
    PermissionDenied,
    Unavailable,
}

#[async_trait::async_trait]
pub trait Geolocation: Send + Sync {
    async fn current_position(&self) -> Result<Position, GeoError>;
}

/// Position taken from the config file.
#[derive(Debug, Clone)]
pub struct FixedPosition(pub Position);

impl FixedPosition {
    pub fn from_settings(settings: &WeatherSettings) -> Option<Self> {
        match (settings.latitude, settings.longitude) {
            (Some(latitude), Some(longitude)) => Some(Self(Position {
                latitude,
                longitude,
            })),
            _ => None,
        }
    }
}

#[async_trait::async_trait]
impl Geolocation for FixedPosition {
    async fn current_position(&self) -> Result<Position, GeoError> {
        Ok(self.0)
    }
}

/// Cached weather, stored under `weather_cache`. `ts` is in unix milliseconds.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WeatherSnapshot {
    pub ts: i64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, rename = "isDay", skip_serializing_if = "Option::is_none")]
    pub is_day: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub text: String,
    pub icon: Option<String>,
    pub code: Option<i64>,
    pub is_day: Option<bool>,
    pub from_cache: bool,
}

impl WeatherReport {
    fn message(text: &str, from_cache: bool) -> Self {
        Self {
            text: text.to_string(),
            icon: None,
            code: None,
            is_day: None,
            from_cache,
        }
    }

    fn cached(snapshot: WeatherSnapshot) -> Self {
        Self {
            text: snapshot.text,
            icon: snapshot.icon,
            code: snapshot.code,
            is_day: snapshot.is_day,
            from_cache: true,
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct ForecastResponse {
    current: Option<CurrentWeather>,
}

#[derive(Debug, serde::Deserialize)]
struct CurrentWeather {
    temperature_2m: Option<f64>,
    weather_code: Option<i64>,
    is_day: Option<i64>,
}

/// WMO weather code to a glyph.
pub fn weather_icon(code: Option<i64>, is_day: bool) -> &'static str {
    match code {
        Some(0) => {
            if is_day {
                "☀️"
            } else {
                "🌙"
            }
        }
        Some(1) => {
            if is_day {
                "🌤️"
            } else {
                "🌙"
            }
        }
        Some(2) => "⛅",
        Some(3) => "☁️",
        Some(45 | 48) => "🌫️",
        Some(51 | 53 | 55) => "🌦️",
        Some(56 | 57 | 61 | 63 | 65 | 66 | 67 | 80 | 81 | 82) => "🌧️",
        Some(71 | 73 | 75 | 77 | 85 | 86) => "🌨️",
        Some(95 | 96 | 99) => "⛈️",
        _ => "🌡️",
    }
}

/// Last component of a zone name like `Europe/Warsaw`.
pub fn guess_city(tz: Option<&str>) -> String {
    tz.and_then(|x| x.rsplit('/').next())
        .map(|x| x.trim().replace('_', " "))
        .filter(|x| !x.is_empty())
        .unwrap_or_else(|| "your area".to_string())
}

fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

fn format_temperature(temp: Option<f64>) -> String {
    match temp {
        Some(t) => format!("{t}"),
        None => "—".to_string(),
    }
}

/// Current weather for the home screen. Failures turn into a message, never an error.
pub async fn current_weather(ctx: &AppContext) -> WeatherReport {
    let cached: Option<WeatherSnapshot> = ctx.cache.get(WEATHER_KEY, None).await;
    let cached = cached.filter(|x| !x.text.is_empty());

    if let Some(snapshot) = &cached {
        if now_ms() - snapshot.ts < TTL_MS {
            return WeatherReport::cached(snapshot.clone());
        }
    }

    if !ctx.network.is_online() {
        return match cached {
            Some(snapshot) => WeatherReport::cached(snapshot),
            None => WeatherReport::message("Offline: no weather data.", true),
        };
    }

    let Some(geolocation) = &ctx.geolocation else {
        return WeatherReport::message("Geolocation unavailable.", false);
    };

    let position = match tokio::time::timeout(POSITION_TIMEOUT, geolocation.current_position()).await
    {
        Ok(Ok(p)) => p,
        Ok(Err(GeoError::PermissionDenied)) => {
            return WeatherReport::message("No permission to use location.", false)
        }
        Ok(Err(GeoError::Unavailable)) | Err(_) => {
            return WeatherReport::message("Could not determine location.", false)
        }
    };

    let current = match fetch_current(ctx, position).await {
        Ok(c) => c,
        Err(err) => {
            warn!("weather request failed: {err}");
            return WeatherReport::message("Weather download failed.", false);
        }
    };

    let is_day = current.is_day == Some(1);
    let city = guess_city(std::env::var("TZ").ok().as_deref());
    let icon = weather_icon(current.weather_code, is_day).to_string();
    let text = format!("{city}: {}°C", format_temperature(current.temperature_2m));

    let snapshot = WeatherSnapshot {
        ts: now_ms(),
        text: text.clone(),
        icon: Some(icon.clone()),
        code: current.weather_code,
        is_day: Some(is_day),
    };
    if let Err(err) = ctx.cache.set(WEATHER_KEY, &snapshot).await {
        warn!("failed to cache weather: {err}");
    }

    WeatherReport {
        text,
        icon: Some(icon),
        code: current.weather_code,
        is_day: Some(is_day),
        from_cache: false,
    }
}

/// Drops the cached value and asks again.
pub async fn refresh_weather(ctx: &AppContext) -> WeatherReport {
    if let Err(err) = ctx.cache.remove(WEATHER_KEY).await {
        warn!("failed to clear weather cache: {err}");
    }
    current_weather(ctx).await
}

async fn fetch_current(ctx: &AppContext, position: Position) -> eyre::Result<CurrentWeather> {
    debug!(?position, "fetching weather");
    let res = ctx
        .http
        .get(&ctx.settings.weather.api_url)
        .query(&[
            ("latitude", position.latitude.to_string()),
            ("longitude", position.longitude.to_string()),
            (
                "current",
                "temperature_2m,weather_code,is_day".to_string(),
            ),
            ("timezone", "auto".to_string()),
        ])
        .send()
        .await?;

    if !res.status().is_success() {
        eyre::bail!("weather service answered {}", res.status());
    }

    let res = res.json::<ForecastResponse>().await?;
    Ok(res.current.unwrap_or(CurrentWeather {
        temperature_2m: None,
        weather_code: None,
        is_day: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icons_follow_wmo_codes() {
        assert_eq!(weather_icon(Some(0), true), "☀️");
        assert_eq!(weather_icon(Some(0), false), "🌙");
        assert_eq!(weather_icon(Some(63), true), "🌧️");
        assert_eq!(weather_icon(Some(75), true), "🌨️");
        assert_eq!(weather_icon(Some(99), true), "⛈️");
        assert_eq!(weather_icon(Some(1234), true), "🌡️");
        assert_eq!(weather_icon(None, true), "🌡️");
    }

    #[test]
    fn city_comes_from_zone_name() {
        assert_eq!(guess_city(Some("Europe/Warsaw")), "Warsaw");
        assert_eq!(guess_city(Some("America/New_York")), "New York");
        assert_eq!(guess_city(Some("")), "your area");
        assert_eq!(guess_city(None), "your area");
    }

    #[test]
    fn snapshot_uses_camel_case_day_flag() {
        let raw = r#"{"ts":1,"text":"Warsaw: 3°C","icon":"☁️","code":3,"isDay":true}"#;
        let snapshot: WeatherSnapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(snapshot.is_day, Some(true));

        let minimal: WeatherSnapshot = serde_json::from_str(r#"{"ts":1,"text":"x"}"#).unwrap();
        assert!(minimal.icon.is_none());
    }

    #[test]
    fn temperature_formatting() {
        assert_eq!(format_temperature(Some(12.5)), "12.5");
        assert_eq!(format_temperature(Some(-3.0)), "-3");
        assert_eq!(format_temperature(None), "—");
    }
}
