use crate::domain::{Rating, User};
use time::Date;

#[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorMessage {
    pub value: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SessionResponse {
    pub session: String,
    pub user: User,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct LogoutResponse {
    pub ok: bool,
}

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ListEntriesQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NewEntryRequest {
    pub entry_date: Date,
    pub mood: Rating,
    pub energy: Rating,
    pub stress: Rating,
    pub note: Option<String>,
    pub photo_path: Option<String>,
}

/// Only the date, mood and note can be changed after an entry has been created.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UpdateEntryRequest {
    pub entry_date: Date,
    pub mood: Rating,
    pub note: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct EntryPhotoResponse {
    pub photo_path: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct SetAvatarRequest {
    pub avatar_path: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct UploadResponse {
    pub path: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct RemoveObjectsRequest {
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PushSubscriptionRequest {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub user_agent: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct DeactivatePushRequest {
    pub endpoint: String,
}
