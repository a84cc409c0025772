//! Client side of the dashboard API.
//!
//! Every request goes through a [`Transport`]. On top of it sit the session
//! guard (authentication gate with a terminal redirect state), the resilient
//! fetcher (reads that fall back to default data) and the mutation client
//! (writes that fall back to the locally constructed payload).

pub mod client;
pub mod config;
pub mod endpoint;
pub mod fetch;
pub mod http;
pub mod memory;
pub mod mutate;
pub mod session;
pub mod transport;

pub use client::ApiClient;
pub use config::ApiClientConfig;
pub use endpoint::{Endpoint, Method};
pub use fetch::Fetched;
pub use http::HttpTransport;
pub use memory::MemoryTransport;
pub use mutate::{Submitted, WriteMethod};
pub use session::{LogNavigator, Navigator, SessionGuard, SessionHalted, SessionState};
pub use transport::{ApiRequest, ApiResponse, Transport, TransportError};
