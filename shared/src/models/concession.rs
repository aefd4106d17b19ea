//! Concession Item Model

use serde::{Deserialize, Serialize};

/// Concession item (combo, snack, drink) sold alongside tickets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concession {
    pub id: i64,
    pub name: String,
    /// Unit price
    pub price: f64,
    pub is_active: bool,
}

/// Create concession payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcessionCreate {
    pub name: String,
    pub price: f64,
}

/// Update concession payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcessionUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub is_active: Option<bool>,
}
