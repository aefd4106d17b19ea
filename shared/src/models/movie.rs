//! Movie Model

use serde::{Deserialize, Serialize};

/// Movie entity (read-only fact source for slot allocation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    /// Runtime in minutes, used to derive showing end times
    pub duration_minutes: i64,
    #[serde(default)]
    pub genres: Vec<String>,
    pub is_active: bool,
}

/// Create movie payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieCreate {
    pub title: String,
    pub duration_minutes: i64,
    pub genres: Option<Vec<String>>,
}

/// Update movie payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieUpdate {
    pub title: Option<String>,
    pub duration_minutes: Option<i64>,
    pub genres: Option<Vec<String>>,
    pub is_active: Option<bool>,
}
