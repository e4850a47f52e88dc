//! Caddy configuration injector library.

pub mod admin;
pub mod api;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod store;
pub mod sync;

pub use api::Injector;
pub use config::InjectorConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::ConfigStore;
