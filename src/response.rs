use serde::Serialize;

use crate::model::Place;
use crate::providers::openweather::WeatherReport;

/// `POST /translate` success body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub success: bool,
    pub original_text: String,
    pub translated_text: String,
    pub from_language: String,
    pub to_language: String,
    pub provider: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub rate_limited: bool,
}

/// `POST /chatbot` success body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotResponse {
    pub success: bool,
    pub message: String,
    pub context: String,
    pub provider: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub rate_limited: bool,
    /// RFC 3339, UTC.
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct PlacesResponse {
    pub success: bool,
    pub places: Vec<Place>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct WeatherResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: WeatherReport,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "OK",
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            timestamp: now_rfc3339(),
        }
    }
}

pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
