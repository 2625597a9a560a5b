// controlr-api: Async Rust client for the Ayla device cloud used by
// Rinnai Control-R water heaters.
//
// One `Session` owns the token lifecycle; the device directory and
// property endpoints are inherent methods split into their own modules.

pub mod auth;
pub mod directory;
pub mod error;
pub mod models;
pub mod properties;
pub mod session;
pub mod transport;

pub use auth::{AppCredentials, ServiceRegion, TokenStatus};
pub use error::Error;
pub use models::{Device, Property};
pub use session::{REFRESH_GRACE_PERIOD_SECS, RefreshOutcome, Session};
pub use transport::{TlsMode, TransportConfig};
