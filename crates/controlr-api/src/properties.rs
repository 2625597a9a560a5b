// Property endpoints
//
// Reads a named property of a device and writes new values by creating
// data points. Nothing is cached; every read goes to the cloud.

use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::Error;
use crate::models::PropertyEnvelope;
use crate::session::{Session, error_message};

impl Session {
    /// Read the current value of a device property.
    ///
    /// `GET /apiv1/dsns/{serial}/properties/{name}`. The value is returned
    /// loosely typed; a payload without `property.value` is a
    /// [`Error::Protocol`].
    pub async fn get_property(&self, serial: &str, name: &str) -> Result<Value, Error> {
        let envelope: PropertyEnvelope = self
            .authorized_request(
                Method::GET,
                &["apiv1", "dsns", serial, "properties", name],
                &[],
                None,
            )
            .await?;
        debug!(serial, name, value = %envelope.property.value, "read property");
        Ok(envelope.property.value)
    }

    /// Write a property by creating a new data point.
    ///
    /// `POST /apiv1/dsns/{serial}/properties/{name}/datapoints` with
    /// `{"datapoint": {"value": ...}}`. Only `201 Created` counts as
    /// success; any other status, 2xx included, is an [`Error::Http`].
    pub async fn set_property(&self, serial: &str, name: &str, value: &Value) -> Result<(), Error> {
        let body = json!({ "datapoint": { "value": value } });
        let resp = self
            .send_authorized(
                Method::POST,
                &["apiv1", "dsns", serial, "properties", name, "datapoints"],
                &[],
                Some(&body),
            )
            .await?;

        let status = resp.status();
        if status != StatusCode::CREATED {
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                message: error_message(status, &text),
            });
        }

        debug!(serial, name, %value, "created data point");
        Ok(())
    }
}
