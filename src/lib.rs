pub mod config;
pub mod dispatch;
pub mod error;
pub mod fallback;
pub mod geo;
pub mod language;
pub mod limits;
pub mod model;
pub mod orchestrator;
pub mod providers;
pub mod request;
pub mod response;
pub mod server;
