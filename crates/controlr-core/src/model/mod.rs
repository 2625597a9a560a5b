// ── Domain model ──
//
// Accessory-facing types: derived heater states, the characteristic
// surface hosts call into, and the accessory records built from the
// cloud device directory.

pub mod accessory;
pub mod heater;

pub use accessory::{Accessory, DeviceDiff, MANUFACTURER};
pub use heater::{
    Characteristic, CharacteristicValue, CurrentHeaterState, HeaterStatus, TargetHeaterState,
    THRESHOLD_RANGE_CELSIUS,
};
