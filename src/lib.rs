pub mod config;
pub mod relay;
pub mod service;

#[cfg(feature = "server-http2")]
pub mod handlers;

#[cfg(feature = "server-http2")]
pub mod server;

pub use config::RelayConfig;
pub use relay::{Relay, RelayRequest};
