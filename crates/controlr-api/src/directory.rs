// Device directory endpoints
//
// Resolves the account handle from the user profile and enumerates the
// devices registered to it. Device records are re-fetched on every call.

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::Error;
use crate::models::{Device, DeviceEnvelope, UserProfile};
use crate::session::Session;

impl Session {
    /// Resolve the account handle (user UUID) of the signed-in user.
    ///
    /// `GET /users/get_user_profile`
    pub async fn resolve_account_handle(&self) -> Result<String, Error> {
        let profile: UserProfile = self
            .authorized_request(Method::GET, &["users", "get_user_profile"], &[], None)
            .await?;
        debug!(handle = %profile.uuid, "resolved account handle");
        Ok(profile.uuid)
    }

    /// List the devices belonging to an account handle.
    ///
    /// `GET /apiv1/devices?user_uuid={handle}`. An account with no devices
    /// yields an empty list.
    pub async fn list_devices(&self, handle: &str) -> Result<Vec<Device>, Error> {
        let entries: Vec<DeviceEnvelope> = self
            .authorized_request(
                Method::GET,
                &["apiv1", "devices"],
                &[("user_uuid", handle)],
                None,
            )
            .await?;

        let devices = entries
            .into_iter()
            .map(|entry| device_from_raw(entry.device))
            .collect::<Result<Vec<_>, _>>()?;
        info!(count = devices.len(), "listed devices");
        Ok(devices)
    }

    /// Fetch a single device by serial.
    ///
    /// `GET /apiv1/dsns/{serial}`
    pub async fn get_device(&self, serial: &str) -> Result<Device, Error> {
        let entry: DeviceEnvelope = self
            .authorized_request(Method::GET, &["apiv1", "dsns", serial], &[], None)
            .await?;
        device_from_raw(entry.device)
    }
}

fn device_from_raw(raw: Value) -> Result<Device, Error> {
    let mut device: Device =
        serde_json::from_value(raw.clone()).map_err(|e| Error::Protocol {
            message: format!("malformed device record: {e}"),
            body: raw.to_string(),
        })?;
    device.raw = raw;
    Ok(device)
}
