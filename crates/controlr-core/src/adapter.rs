// ── State adapter ──
//
// Maps raw device properties to accessory-facing states and back.
// Stateless: every call re-reads the cloud, and composite states are a
// short-circuiting chain of reads in a fixed order.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::info;

use controlr_api::Session;

use crate::config::PropertyNames;
use crate::convert::{celsius_to_fahrenheit, fahrenheit_to_celsius, value_as_bool, value_as_f64};
use crate::error::CoreError;
use crate::model::{CurrentHeaterState, HeaterStatus, TargetHeaterState};

/// Derived-state operations for water heaters, keyed by serial.
///
/// Cheap to clone; all clones share one [`Session`].
#[derive(Clone)]
pub struct StateAdapter {
    session: Arc<Session>,
    names: PropertyNames,
}

impl StateAdapter {
    pub fn new(session: Arc<Session>, names: PropertyNames) -> Self {
        Self { session, names }
    }

    /// The property names this adapter reads and writes.
    pub fn property_names(&self) -> &PropertyNames {
        &self.names
    }

    // ── Recirculation ────────────────────────────────────────────────

    /// Whether recirculation is on.
    pub async fn get_heater_active(&self, serial: &str) -> Result<bool, CoreError> {
        info!(serial, "GET heater active");
        self.read_bool(serial, &self.names.recirculation).await
    }

    /// Switch recirculation on or off.
    ///
    /// Written as `1`/`0`, the encoding the cloud uses for boolean
    /// properties.
    pub async fn set_heater_active(&self, serial: &str, active: bool) -> Result<(), CoreError> {
        info!(serial, active, "SET heater active");
        self.session
            .set_property(serial, &self.names.recirculation, &json!(u8::from(active)))
            .await?;
        Ok(())
    }

    /// `Heating` while recirculating, otherwise `Idle`.
    pub async fn get_current_heater_state(
        &self,
        serial: &str,
    ) -> Result<CurrentHeaterState, CoreError> {
        info!(serial, "GET current heater state");
        let recirculating = self.read_bool(serial, &self.names.recirculation).await?;
        Ok(CurrentHeaterState::from(recirculating))
    }

    /// Always `Heat`: the device cannot cool.
    pub fn get_target_heater_state(&self) -> TargetHeaterState {
        TargetHeaterState::Heat
    }

    // ── Temperature ──────────────────────────────────────────────────

    /// Target temperature in whole °C.
    pub async fn get_temperature(&self, serial: &str) -> Result<i32, CoreError> {
        info!(serial, "GET temperature");
        let fahrenheit = self
            .read_number(serial, &self.names.target_temperature)
            .await?;
        Ok(fahrenheit_to_celsius(fahrenheit))
    }

    /// Set the target temperature from whole °C.
    pub async fn set_target_temperature(&self, serial: &str, celsius: i32) -> Result<(), CoreError> {
        let fahrenheit = celsius_to_fahrenheit(celsius);
        info!(serial, celsius, fahrenheit, "SET target temperature");
        self.session
            .set_property(serial, &self.names.target_temperature, &json!(fahrenheit))
            .await?;
        Ok(())
    }

    // ── Water ────────────────────────────────────────────────────────

    /// Whether water is flowing right now.
    pub async fn get_water_in_use(&self, serial: &str) -> Result<bool, CoreError> {
        info!(serial, "GET water in use");
        self.read_bool(serial, &self.names.water_flowing).await
    }

    /// Whether hot water is ready at the tap.
    ///
    /// Reads recirculation, then target temperature, then outlet
    /// temperature, stopping at the first failure. Inactive recirculation
    /// is a plain `false` and skips the temperature reads.
    pub async fn get_water_is_ready(&self, serial: &str) -> Result<bool, CoreError> {
        info!(serial, "GET water is ready");
        if !self.read_bool(serial, &self.names.recirculation).await? {
            return Ok(false);
        }
        let target = self
            .read_number(serial, &self.names.target_temperature)
            .await?;
        let outlet = self
            .read_number(serial, &self.names.outlet_temperature)
            .await?;
        Ok(outlet >= target)
    }

    // ── Snapshot ─────────────────────────────────────────────────────

    /// Every derived state of one heater. Fails on the first failed read.
    pub async fn status(&self, serial: &str) -> Result<HeaterStatus, CoreError> {
        let active = self.get_heater_active(serial).await?;
        let target_temperature_c = self.get_temperature(serial).await?;
        let water_in_use = self.get_water_in_use(serial).await?;
        let water_is_ready = self.get_water_is_ready(serial).await?;

        Ok(HeaterStatus {
            serial: serial.to_owned(),
            active,
            current_state: CurrentHeaterState::from(active),
            target_state: self.get_target_heater_state(),
            target_temperature_c,
            water_in_use,
            water_is_ready,
        })
    }

    // ── Raw access ───────────────────────────────────────────────────

    /// Read any property as raw JSON.
    pub async fn read_raw(&self, serial: &str, name: &str) -> Result<Value, CoreError> {
        Ok(self.session.get_property(serial, name).await?)
    }

    /// Write any property as raw JSON.
    pub async fn write_raw(&self, serial: &str, name: &str, value: &Value) -> Result<(), CoreError> {
        info!(serial, name, %value, "SET raw property");
        Ok(self.session.set_property(serial, name, value).await?)
    }

    async fn read_bool(&self, serial: &str, name: &str) -> Result<bool, CoreError> {
        let value = self.session.get_property(serial, name).await?;
        value_as_bool(name, &value)
    }

    async fn read_number(&self, serial: &str, name: &str) -> Result<f64, CoreError> {
        let value = self.session.get_property(serial, name).await?;
        value_as_f64(name, &value)
    }
}
