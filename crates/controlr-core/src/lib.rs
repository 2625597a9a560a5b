//! Water-heater state adapter and accessory controller.
//!
//! Sits between `controlr-api` and an accessory host (the `controlr` CLI,
//! or any smart-home bridge):
//!
//! - **[`Controller`]** -- Lifecycle facade. [`connect()`](Controller::connect)
//!   signs in, discovers the account's heaters, and spawns the token
//!   renewal task. [`handle_get`](Controller::handle_get) and
//!   [`handle_set`](Controller::handle_set) are the host callback surface.
//!
//! - **[`StateAdapter`]** -- Translates device properties into derived
//!   states (active, heating state, °C target, water in use, water ready)
//!   and back. Stateless; every call re-reads the cloud.
//!
//! - **Domain model** ([`model`]) -- Heater states, characteristics, and
//!   accessory records.

pub mod adapter;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use adapter::StateAdapter;
pub use config::{ControllerConfig, DEFAULT_REFRESH_INTERVAL, PropertyNames, TlsVerification};
pub use controller::Controller;
pub use convert::{celsius_to_fahrenheit, fahrenheit_to_celsius};
pub use error::CoreError;
pub use model::{
    Accessory, Characteristic, CharacteristicValue, CurrentHeaterState, DeviceDiff, HeaterStatus,
    MANUFACTURER, THRESHOLD_RANGE_CELSIUS, TargetHeaterState,
};

// Hosts build configs from these without depending on the API crate.
pub use controlr_api::{AppCredentials, Device, ServiceRegion};
