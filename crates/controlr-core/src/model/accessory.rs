// ── Accessory records ──

use serde::{Deserialize, Serialize};

use controlr_api::Device;

pub const MANUFACTURER: &str = "Rinnai";

/// Host-facing information for one water heater, keyed by serial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accessory {
    pub serial: String,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub online: bool,
}

impl Accessory {
    pub(crate) fn from_device(device: &Device, model: &str) -> Self {
        Self {
            serial: device.dsn.clone(),
            name: device.product_name.clone(),
            manufacturer: MANUFACTURER.into(),
            model: model.to_owned(),
            online: device.is_online(),
        }
    }
}

/// Change in the account's device set between two listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceDiff {
    pub added: Vec<Accessory>,
    pub removed: Vec<Accessory>,
}

impl DeviceDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
