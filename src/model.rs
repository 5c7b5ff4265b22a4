use serde::Serialize;

use crate::language::Language;

/// Context label used when the client does not send one.
pub const DEFAULT_CONTEXT: &str = "general";

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    pub text: String,
    pub from: Language,
    pub to: Language,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, from: &str, to: &str) -> Self {
        Self {
            text: text.into(),
            from: Language::resolve(from),
            to: Language::resolve(to),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssistantRequest {
    pub message: String,
    pub context: String,
}

impl AssistantRequest {
    pub fn new(message: impl Into<String>, context: Option<String>) -> Self {
        Self {
            message: message.into(),
            context: context
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTEXT.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
    /// Category filter; `None` and `"all"` both mean "everything common".
    pub category: Option<String>,
}

impl PlaceQuery {
    pub fn radius_km(&self) -> f64 {
        self.radius_m / 1000.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Kilometres from the query point, one decimal.
    pub distance: f64,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
}
