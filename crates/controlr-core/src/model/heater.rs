// ── Heater domain types ──

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Heating threshold range (°C) advertised to hosts. Values are not
/// clamped internally.
pub const THRESHOLD_RANGE_CELSIUS: RangeInclusive<i32> = 35..=85;

/// What the heater is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CurrentHeaterState {
    Idle,
    Heating,
}

impl CurrentHeaterState {
    /// Every state a host should accept for this device.
    pub const VALID: &'static [Self] = &[Self::Idle, Self::Heating];
}

impl From<bool> for CurrentHeaterState {
    fn from(recirculating: bool) -> Self {
        if recirculating {
            Self::Heating
        } else {
            Self::Idle
        }
    }
}

/// Mode the heater is asked to hold. The device only heats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TargetHeaterState {
    Heat,
}

impl TargetHeaterState {
    pub const VALID: &'static [Self] = &[Self::Heat];
}

/// Per-accessory characteristics a host can read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Characteristic {
    /// Recirculation on/off. Writable.
    Active,
    CurrentHeaterState,
    TargetHeaterState,
    /// Reported from the target temperature property; the device exposes
    /// no separate reading.
    CurrentTemperature,
    /// Target temperature in °C. Writable.
    HeatingThresholdTemperature,
    WaterInUse,
    WaterIsReady,
}

impl Characteristic {
    pub fn is_writable(self) -> bool {
        matches!(self, Self::Active | Self::HeatingThresholdTemperature)
    }
}

/// Value carried by a characteristic read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    Bool(bool),
    Integer(i32),
    CurrentState(CurrentHeaterState),
    TargetState(TargetHeaterState),
}

impl std::fmt::Display for CharacteristicValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::CurrentState(s) => write!(f, "{s}"),
            Self::TargetState(s) => write!(f, "{s}"),
        }
    }
}

/// Every derived state of one heater, read in a single pass.
///
/// The reads are sequential; the device may change between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaterStatus {
    pub serial: String,
    pub active: bool,
    pub current_state: CurrentHeaterState,
    pub target_state: TargetHeaterState,
    pub target_temperature_c: i32,
    pub water_in_use: bool,
    pub water_is_ready: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn current_state_follows_recirculation() {
        assert_eq!(CurrentHeaterState::from(true), CurrentHeaterState::Heating);
        assert_eq!(CurrentHeaterState::from(false), CurrentHeaterState::Idle);
    }

    #[test]
    fn only_active_and_threshold_are_writable() {
        let writable: Vec<_> = [
            Characteristic::Active,
            Characteristic::CurrentHeaterState,
            Characteristic::TargetHeaterState,
            Characteristic::CurrentTemperature,
            Characteristic::HeatingThresholdTemperature,
            Characteristic::WaterInUse,
            Characteristic::WaterIsReady,
        ]
        .into_iter()
        .filter(|c| c.is_writable())
        .collect();
        assert_eq!(
            writable,
            vec![
                Characteristic::Active,
                Characteristic::HeatingThresholdTemperature
            ]
        );
    }

    #[test]
    fn characteristic_parses_kebab_case() {
        let parsed: Characteristic = "water-is-ready".parse().unwrap();
        assert_eq!(parsed, Characteristic::WaterIsReady);
        assert_eq!(
            Characteristic::HeatingThresholdTemperature.to_string(),
            "heating-threshold-temperature"
        );
    }

    #[test]
    fn valid_state_sets() {
        assert_eq!(
            CurrentHeaterState::VALID,
            &[CurrentHeaterState::Idle, CurrentHeaterState::Heating]
        );
        assert_eq!(TargetHeaterState::VALID, &[TargetHeaterState::Heat]);
    }
}
