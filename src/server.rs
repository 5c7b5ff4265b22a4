use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::dispatch::http::HttpDispatch;
use crate::error::{ApiError, ProviderError};
use crate::fallback::DataError;
use crate::fallback::knowledge::KnowledgeBase;
use crate::fallback::phrasebook::Phrasebook;
use crate::limits::cooldown::CooldownTracker;
use crate::limits::rate_limit::RateLimiter;
use crate::orchestrator::assistant::AssistantOrchestrator;
use crate::orchestrator::places::PlaceDiscovery;
use crate::orchestrator::translate::TranslationOrchestrator;
use crate::providers::openweather::{WeatherClient, WeatherLocation};
use crate::request::{ChatbotBody, NearbyBody, TranslateBody};
use crate::response::{
    ChatbotResponse, HealthResponse, PlacesResponse, TranslateResponse, WeatherResponse,
    now_rfc3339,
};

/// Everything a handler needs. Cheap to clone: every field is shared.
#[derive(Clone)]
pub struct AppState {
    pub translator: Arc<TranslationOrchestrator>,
    pub assistant: Arc<AssistantOrchestrator>,
    pub places: Arc<PlaceDiscovery>,
    pub weather: Arc<WeatherClient>,
    pub default_radius_m: f64,
}

impl AppState {
    /// Wire orchestrators from config. One HTTP client and one cooldown
    /// tracker are shared by every chain.
    pub fn from_config(config: &Config) -> Result<Self, DataError> {
        let http = HttpDispatch::new();
        let cooldowns = Arc::new(CooldownTracker::new());
        let limiter = Arc::new(RateLimiter::new(
            config.chatbot.window,
            config.chatbot.max_requests,
        ));
        let phrasebook = Arc::new(Phrasebook::builtin()?);
        let knowledge = Arc::new(KnowledgeBase::builtin()?);

        let translator =
            TranslationOrchestrator::from_config(config, http.clone(), cooldowns.clone(), phrasebook);
        let assistant = AssistantOrchestrator::from_config(
            config,
            http.clone(),
            cooldowns.clone(),
            knowledge,
            limiter,
        );
        let places = PlaceDiscovery::from_config(config, http.clone(), cooldowns);
        let weather = WeatherClient::new(
            http,
            &config.endpoints.openweather,
            config.openweather_api_key.clone(),
            config.provider_timeout,
        );

        tracing::info!(
            translate = ?translator.provider_order(),
            assistant = ?assistant.provider_order(),
            places = ?places.provider_order(),
            weather = weather.is_configured(),
            "providers wired"
        );

        Ok(Self {
            translator: Arc::new(translator),
            assistant: Arc::new(assistant),
            places: Arc::new(places),
            weather: Arc::new(weather),
            default_radius_m: config.default_radius_m,
        })
    }
}

pub fn router(state: AppState, allowed_origin: Option<&str>) -> Router {
    let routes = Router::new()
        .route("/health", get(health))
        .route("/translate", post(translate))
        .route("/chatbot", post(chatbot))
        .route("/weather/:city", get(weather_by_city))
        .route("/weather/coords/:lat/:lon", get(weather_by_coords))
        .route("/places/nearby", post(nearby_places))
        .fallback(not_found)
        .with_state(state);
    layered(routes, allowed_origin)
}

/// Middleware shared by every route: panics become a JSON 500, then CORS and
/// request tracing.
fn layered(app: Router, allowed_origin: Option<&str>) -> Router {
    app.layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer(allowed_origin))
        .layer(TraceLayer::new_for_http())
}

/// Serve with peer addresses available to handlers (used as the rate-limit
/// key when no proxy header is present).
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}

fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    match allowed_origin.map(str::trim) {
        None | Some("*") => layer.allow_origin(AnyOrigin),
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => layer.allow_origin(value),
            Err(_) => {
                tracing::warn!(origin, "invalid ALLOWED_ORIGIN, cross-origin requests disabled");
                layer
            }
        },
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(detail, "handler panicked");
    ApiError::Internal.into_response()
}

fn invalid_json(rejection: JsonRejection) -> ApiError {
    ApiError::InvalidInput(rejection.body_text())
}

/// First `X-Forwarded-For` hop when present, else the peer IP.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

async fn translate(
    State(state): State<AppState>,
    payload: Result<Json<TranslateBody>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let Json(body) = payload.map_err(invalid_json)?;
    let req = body.validate()?;

    let result = state.translator.translate(&req).await;

    Ok(Json(TranslateResponse {
        success: true,
        original_text: req.text,
        translated_text: result.text,
        from_language: body.from_language.unwrap_or_default().trim().to_string(),
        to_language: body.to_language.unwrap_or_default().trim().to_string(),
        provider: result.provider,
        fallback: result.used_fallback,
        rate_limited: result.rate_limited,
    }))
}

async fn chatbot(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: Result<Json<ChatbotBody>, JsonRejection>,
) -> Result<Json<ChatbotResponse>, ApiError> {
    let Json(body) = payload.map_err(invalid_json)?;
    let req = body.validate()?;
    let key = client_key(&headers, peer.map(|ConnectInfo(addr)| addr));

    let reply = state.assistant.reply(&key, &req).await?;

    Ok(Json(ChatbotResponse {
        success: true,
        message: reply.message,
        context: req.context,
        provider: reply.provider,
        fallback: reply.used_fallback,
        rate_limited: reply.rate_limited,
        timestamp: now_rfc3339(),
    }))
}

async fn nearby_places(
    State(state): State<AppState>,
    payload: Result<Json<NearbyBody>, JsonRejection>,
) -> Result<Json<PlacesResponse>, ApiError> {
    let Json(body) = payload.map_err(invalid_json)?;
    let query = body.validate(state.default_radius_m)?;

    let nearby = state.places.find_nearby(&query).await?;

    Ok(Json(PlacesResponse {
        success: true,
        total: nearby.total,
        places: nearby.places,
    }))
}

async fn weather_by_city(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<WeatherResponse>, ApiError> {
    let city = city.trim();
    if city.is_empty() {
        return Err(ApiError::InvalidInput("city is required".to_string()));
    }
    current_weather(&state, WeatherLocation::City(city.to_string())).await
}

async fn weather_by_coords(
    State(state): State<AppState>,
    Path((lat, lon)): Path<(String, String)>,
) -> Result<Json<WeatherResponse>, ApiError> {
    let (Ok(lat), Ok(lon)) = (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) else {
        return Err(ApiError::InvalidInput(
            "lat and lon must be numbers".to_string(),
        ));
    };
    current_weather(&state, WeatherLocation::Coords { lat, lon }).await
}

async fn current_weather(
    state: &AppState,
    location: WeatherLocation,
) -> Result<Json<WeatherResponse>, ApiError> {
    state
        .weather
        .current(&location)
        .await
        .map(|report| {
            Json(WeatherResponse {
                success: true,
                report,
            })
        })
        .map_err(weather_error)
}

fn weather_error(err: ProviderError) -> ApiError {
    match err {
        ProviderError::NotConfigured { .. } => {
            ApiError::NotConfigured("Weather service is not configured".to_string())
        }
        ProviderError::Rejected { status: 404, .. } => {
            ApiError::NotFound("City not found".to_string())
        }
        other => {
            tracing::warn!(error = %other, "weather lookup failed");
            ApiError::Upstream(other.user_message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_key_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        let peer: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        assert_eq!(client_key(&headers, Some(peer)), "203.0.113.7");
    }

    #[test]
    fn client_key_falls_back_to_peer_ip() {
        let peer: SocketAddr = "198.51.100.4:5555".parse().unwrap();
        assert_eq!(client_key(&HeaderMap::new(), Some(peer)), "198.51.100.4");
        assert_eq!(client_key(&HeaderMap::new(), None), "unknown");
    }

    #[test]
    fn weather_errors_map_to_client_statuses() {
        let missing = weather_error(ProviderError::NotConfigured {
            provider: "openweather".to_string(),
        });
        assert_eq!(missing.status(), axum::http::StatusCode::SERVICE_UNAVAILABLE);

        let unknown_city = weather_error(ProviderError::Rejected {
            provider: "openweather".to_string(),
            status: 404,
        });
        assert_eq!(unknown_city.status(), axum::http::StatusCode::NOT_FOUND);

        let down = weather_error(ProviderError::Timeout(15000));
        assert_eq!(down.status(), axum::http::StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn handler_panic_becomes_generic_json_500() {
        let app = layered(
            Router::new().route("/boom", get(|| async { panic!("secret detail") as () })),
            None,
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, app, std::future::pending()));

        let resp = reqwest::get(format!("http://{addr}/boom")).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        let body = resp.text().await.unwrap();
        assert!(!body.contains("secret detail"));
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "Internal server error"})
        );
    }
}
