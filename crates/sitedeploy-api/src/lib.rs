// sitedeploy-api: Async Rust client for the cloud dashboard and geocoding APIs

pub mod dashboard;
pub mod error;
pub mod geocode;
pub mod transport;

pub use dashboard::types;
pub use dashboard::{DashboardClient, Region};
pub use error::Error;
pub use geocode::{GeocodeClient, LatLng};
pub use transport::{RetryPolicy, TlsMode, TransportConfig};
