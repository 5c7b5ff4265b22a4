use serde::Deserialize;

use crate::error::ApiError;
use crate::model::{AssistantRequest, PlaceQuery, TranslationRequest};

/// Upper bound on text sent to translation providers.
pub const MAX_TEXT_CHARS: usize = 5000;
/// Upper bound on a single assistant message.
pub const MAX_MESSAGE_CHARS: usize = 2000;

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ApiError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::InvalidInput(format!("{field} is required")))
}

fn within_limit(value: &str, field: &str, max: usize) -> Result<(), ApiError> {
    if value.chars().count() > max {
        return Err(ApiError::InvalidInput(format!(
            "{field} is too long (max {max} characters)"
        )));
    }
    Ok(())
}

/// `POST /translate` body. Language fields are display names, not codes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateBody {
    pub text: Option<String>,
    pub from_language: Option<String>,
    pub to_language: Option<String>,
}

impl TranslateBody {
    pub fn validate(&self) -> Result<TranslationRequest, ApiError> {
        let text = required(&self.text, "text")?;
        let from = required(&self.from_language, "fromLanguage")?;
        let to = required(&self.to_language, "toLanguage")?;
        within_limit(text, "text", MAX_TEXT_CHARS)?;
        Ok(TranslationRequest::new(text, from, to))
    }
}

/// `POST /chatbot` body.
#[derive(Debug, Deserialize)]
pub struct ChatbotBody {
    pub message: Option<String>,
    pub context: Option<String>,
}

impl ChatbotBody {
    pub fn validate(&self) -> Result<AssistantRequest, ApiError> {
        let message = required(&self.message, "message")?;
        within_limit(message, "message", MAX_MESSAGE_CHARS)?;
        Ok(AssistantRequest::new(message, self.context.clone()))
    }
}

/// `POST /places/nearby` body.
#[derive(Debug, Deserialize)]
pub struct NearbyBody {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl NearbyBody {
    /// Only presence is checked for coordinates. A missing, zero, negative
    /// or non-finite radius uses `default_radius_m`.
    pub fn validate(&self, default_radius_m: f64) -> Result<PlaceQuery, ApiError> {
        let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) else {
            return Err(ApiError::InvalidInput(
                "latitude and longitude are required".to_string(),
            ));
        };

        Ok(PlaceQuery {
            latitude,
            longitude,
            radius_m: self
                .radius
                .filter(|r| r.is_finite() && *r > 0.0)
                .unwrap_or(default_radius_m),
            category: self
                .kind
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
        })
    }
}
