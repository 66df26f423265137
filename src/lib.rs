mod client;
mod config;
mod diff;
mod error;
mod logger;
mod protocol;
mod transport;
mod types;

pub use client::{SkyFiClient, SkyFiClientBuilder};
pub use config::DeviceConfig;
pub use error::{BuildError, CommandError, MalformedResponse, RefreshError, TransportError};
pub use logger::MessageLogMode;
pub use protocol::DEVICE_PORT;
pub use transport::HttpTransport;
pub use types::*;
