use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::dispatch::Provider;
use crate::dispatch::http::HttpDispatch;
use crate::error::ProviderError;

/// Overpass QL text, ready to POST as the `data` form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverpassQuery(pub String);

impl OverpassQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// Raw OpenStreetMap element as returned with `out center`.
#[derive(Debug, Clone, Deserialize)]
pub struct OsmElement {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: u64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Present on ways when the query asks for `out center`.
    pub center: Option<LatLon>,
    /// Present on ways when the query asks for `out geom`.
    pub geometry: Option<Vec<LatLon>>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Deserialize)]
struct OverpassResponse {
    elements: Vec<OsmElement>,
}

/// One public mirror of the Overpass API.
pub struct OverpassMirror {
    id: String,
    http: HttpDispatch,
    url: String,
    timeout: Duration,
}

impl OverpassMirror {
    pub fn new(http: HttpDispatch, url: &str, timeout: Duration) -> Self {
        Self {
            id: derive_id(url),
            http,
            url: url.to_string(),
            timeout,
        }
    }

    pub fn mirror_id(&self) -> &str {
        &self.id
    }
}

/// Host (and port, if explicit) of the mirror URL; falls back to the raw URL.
fn derive_id(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            let host = u.host_str()?.to_string();
            Some(match u.port() {
                Some(port) => format!("{host}:{port}"),
                None => host,
            })
        })
        .unwrap_or_else(|| url.to_string())
}

#[async_trait]
impl Provider<OverpassQuery, Vec<OsmElement>> for OverpassMirror {
    fn id(&self) -> &str {
        &self.id
    }

    async fn attempt(&self, query: &OverpassQuery) -> Result<Vec<OsmElement>, ProviderError> {
        let request = self
            .http
            .client()
            .post(&self.url)
            .form(&[("data", query.as_str())]);

        let response: OverpassResponse = self.http.execute_json(&self.id, request, self.timeout).await?;
        Ok(response.elements)
    }
}
