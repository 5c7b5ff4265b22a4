use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30);
pub const DEFAULT_CHATBOT_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_CHATBOT_MAX_REQUESTS: u32 = 10;
/// Spacing before the first chat provider call, to stay under vendor limits.
pub const DEFAULT_CHATBOT_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_RADIUS_METERS: f64 = 5000.0;

/// Base URLs of every external service. Overridable so tests (and
/// self-hosted mirrors) can point providers elsewhere.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub mymemory: String,
    pub libretranslate: String,
    pub lingva: String,
    pub gemini: String,
    pub openai: String,
    pub free_chat: String,
    pub openweather: String,
    pub overpass: Vec<String>,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            mymemory: "https://api.mymemory.translated.net".to_string(),
            libretranslate: "https://libretranslate.com".to_string(),
            lingva: "https://lingva.ml".to_string(),
            gemini: "https://generativelanguage.googleapis.com".to_string(),
            openai: "https://api.openai.com".to_string(),
            free_chat: "https://text.pollinations.ai/openai".to_string(),
            openweather: "https://api.openweathermap.org".to_string(),
            overpass: vec![
                "https://overpass-api.de/api/interpreter".to_string(),
                "https://overpass.kumi.systems/api/interpreter".to_string(),
                "https://maps.mail.ru/osm/tools/overpass/api/interpreter".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatbotConfig {
    pub window: Duration,
    pub max_requests: u32,
    pub delay: Duration,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_CHATBOT_WINDOW,
            max_requests: DEFAULT_CHATBOT_MAX_REQUESTS,
            delay: DEFAULT_CHATBOT_DELAY,
        }
    }
}

/// Cooldown applied after a provider signals overload. A zero override turns
/// the cooldown off for that provider.
#[derive(Debug, Clone)]
pub struct CooldownConfig {
    pub default: Duration,
    pub overrides: HashMap<String, Duration>,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            default: DEFAULT_COOLDOWN,
            overrides: HashMap::new(),
        }
    }
}

impl CooldownConfig {
    pub fn for_provider(&self, provider: &str) -> Option<Duration> {
        let d = self.overrides.get(provider).copied().unwrap_or(self.default);
        (!d.is_zero()).then_some(d)
    }
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub allowed_origin: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub openweather_api_key: Option<String>,
    pub free_chat_model: String,
    pub provider_timeout: Duration,
    pub chatbot: ChatbotConfig,
    pub cooldown: CooldownConfig,
    pub default_radius_m: f64,
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            allowed_origin: Some(DEFAULT_ALLOWED_ORIGIN.to_string()),
            openai_api_key: None,
            openai_model: "gpt-3.5-turbo".to_string(),
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash".to_string(),
            openweather_api_key: None,
            free_chat_model: "openai".to_string(),
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            chatbot: ChatbotConfig::default(),
            cooldown: CooldownConfig::default(),
            default_radius_m: DEFAULT_RADIUS_METERS,
            endpoints: Endpoints::default(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn redact(key: &Option<String>) -> &'static str {
            if key.is_some() { "[REDACTED]" } else { "<unset>" }
        }

        f.debug_struct("Config")
            .field("port", &self.port)
            .field("allowed_origin", &self.allowed_origin)
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("openai_model", &self.openai_model)
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("gemini_model", &self.gemini_model)
            .field("openweather_api_key", &redact(&self.openweather_api_key))
            .field("free_chat_model", &self.free_chat_model)
            .field("provider_timeout", &self.provider_timeout)
            .field("chatbot", &self.chatbot)
            .field("cooldown", &self.cooldown)
            .field("default_radius_m", &self.default_radius_m)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl Config {
    /// Load from the environment (call after dotenvy has populated it).
    pub fn load() -> Self {
        Self::from_env()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let mut endpoints = defaults.endpoints.clone();

        override_string("MYMEMORY_URL", &mut endpoints.mymemory);
        override_string("LIBRETRANSLATE_URL", &mut endpoints.libretranslate);
        override_string("LINGVA_URL", &mut endpoints.lingva);
        override_string("GEMINI_URL", &mut endpoints.gemini);
        override_string("OPENAI_URL", &mut endpoints.openai);
        override_string("FREE_CHAT_URL", &mut endpoints.free_chat);
        override_string("OPENWEATHER_URL", &mut endpoints.openweather);
        if let Some(list) = non_empty_var("OVERPASS_URLS") {
            let mirrors: Vec<String> = list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !mirrors.is_empty() {
                endpoints.overpass = mirrors;
            }
        }

        let openai_api_key = non_empty_var("OPENAI_API_KEY");
        if openai_api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY not set: openai assistant provider unavailable");
        }
        let gemini_api_key = non_empty_var("GEMINI_API_KEY");
        if gemini_api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY not set: gemini providers unavailable");
        }
        let openweather_api_key = non_empty_var("OPENWEATHER_API_KEY");
        if openweather_api_key.is_none() {
            tracing::warn!("OPENWEATHER_API_KEY not set: weather endpoints disabled");
        }

        let mut cooldown = CooldownConfig {
            default: parse_var("PROVIDER_COOLDOWN_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cooldown.default),
            overrides: HashMap::new(),
        };
        for (key, value) in env::vars() {
            if let Some(provider) = key.strip_prefix("COOLDOWN_SECS_") {
                match value.trim().parse::<u64>() {
                    Ok(secs) => {
                        cooldown.overrides.insert(
                            provider.to_lowercase().replace('_', "-"),
                            Duration::from_secs(secs),
                        );
                    }
                    Err(_) => tracing::warn!("ignoring {key}: not a whole number of seconds"),
                }
            }
        }

        Self {
            port: parse_var("PORT").unwrap_or(defaults.port),
            allowed_origin: non_empty_var("ALLOWED_ORIGIN").or(defaults.allowed_origin),
            openai_api_key,
            openai_model: non_empty_var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            gemini_api_key,
            gemini_model: non_empty_var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            openweather_api_key,
            free_chat_model: non_empty_var("FREE_CHAT_MODEL").unwrap_or(defaults.free_chat_model),
            provider_timeout: parse_var("PROVIDER_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.provider_timeout),
            chatbot: ChatbotConfig {
                window: parse_var("CHATBOT_WINDOW_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.chatbot.window),
                max_requests: parse_var("CHATBOT_MAX_REQUESTS")
                    .unwrap_or(defaults.chatbot.max_requests),
                delay: parse_var("CHATBOT_DELAY_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.chatbot.delay),
            },
            cooldown,
            default_radius_m: parse_var("DEFAULT_RADIUS_METERS")
                .unwrap_or(defaults.default_radius_m),
            endpoints,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn override_string(name: &str, target: &mut String) {
    if let Some(value) = non_empty_var(name) {
        *target = value;
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = non_empty_var(name)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("ignoring {name}={raw}: could not parse, using default");
            None
        }
    }
}
