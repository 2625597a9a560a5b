// ── Accessory controller ──
//
// Boundary between an accessory host and the cloud. Signs in, discovers
// the account's heaters, routes characteristic reads and writes to the
// state adapter, and runs the periodic token renewal task.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use controlr_api::{Device, Session, TlsMode, TransportConfig};

use crate::adapter::StateAdapter;
use crate::config::{ControllerConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{
    Accessory, Characteristic, CharacteristicValue, CurrentHeaterState, DeviceDiff, HeaterStatus,
    TargetHeaterState,
};

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for hosts.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Owns the cloud session,
/// the known accessory set, and the renewal task.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    session: Arc<Session>,
    adapter: StateAdapter,
    /// Account handle resolved on connect.
    account_handle: Mutex<Option<String>>,
    /// Known accessories keyed by serial.
    accessories: RwLock<BTreeMap<String, Accessory>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a controller from configuration. Does NOT sign in --
    /// call [`connect()`](Self::connect) for that.
    pub fn new(config: ControllerConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let http = transport.build_client()?;
        let base_url = match &config.base_url {
            Some(url) => url.clone(),
            None => config.region.base_url()?,
        };
        let session = Arc::new(Session::with_client(http, base_url, config.app.clone()));
        let adapter = StateAdapter::new(Arc::clone(&session), config.properties.clone());

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                session,
                adapter,
                account_handle: Mutex::new(None),
                accessories: RwLock::new(BTreeMap::new()),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Access the controller configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// The shared cloud session.
    pub fn session(&self) -> &Arc<Session> {
        &self.inner.session
    }

    /// The state adapter, for callers that want typed reads directly.
    pub fn adapter(&self) -> &StateAdapter {
        &self.inner.adapter
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Sign in, discover the account's heaters, and start the renewal task.
    ///
    /// Returns the discovered accessories. A controller is single-use:
    /// after [`shutdown()`](Self::shutdown) this fails with
    /// [`CoreError::ShutDown`].
    pub async fn connect(&self) -> Result<Vec<Accessory>, CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::ShutDown);
        }
        self.sign_in().await?;
        self.discover().await?;
        self.spawn_token_refresher().await;

        let accessories = self.accessories().await;
        info!(count = accessories.len(), "connected");
        Ok(accessories)
    }

    /// Sign in and resolve the account handle, without listing devices.
    ///
    /// Enough for direct property access when the serial is known.
    pub async fn sign_in(&self) -> Result<(), CoreError> {
        let config = &self.inner.config;
        self.inner
            .session
            .authenticate(&config.email, &config.password)
            .await?;

        let handle = self.inner.session.resolve_account_handle().await?;
        *self.inner.account_handle.lock().await = Some(handle);
        Ok(())
    }

    /// Re-list the account's devices and reconcile the known accessories.
    ///
    /// Returns which serials appeared and which disappeared since the
    /// previous listing.
    pub async fn discover(&self) -> Result<DeviceDiff, CoreError> {
        let handle = self
            .inner
            .account_handle
            .lock()
            .await
            .clone()
            .ok_or(CoreError::NotConnected)?;

        let devices = self.inner.session.list_devices(&handle).await?;
        let model = &self.inner.config.model;
        let incoming: BTreeMap<String, Accessory> = devices
            .iter()
            .map(|d| (d.dsn.clone(), Accessory::from_device(d, model)))
            .collect();

        let mut known = self.inner.accessories.write().await;
        let diff = DeviceDiff {
            added: incoming
                .iter()
                .filter(|(serial, _)| !known.contains_key(*serial))
                .map(|(_, a)| a.clone())
                .collect(),
            removed: known
                .iter()
                .filter(|(serial, _)| !incoming.contains_key(*serial))
                .map(|(_, a)| a.clone())
                .collect(),
        };
        for accessory in &diff.added {
            info!(serial = %accessory.serial, name = %accessory.name, "new accessory");
        }
        for accessory in &diff.removed {
            info!(serial = %accessory.serial, name = %accessory.name, "accessory gone");
        }
        *known = incoming;
        Ok(diff)
    }

    /// Stop background tasks and wait for them to finish.
    ///
    /// Final: the controller cannot be connected again afterwards.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let handles: Vec<_> = self.inner.task_handles.lock().await.drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
        debug!("controller shut down");
    }

    // ── Accessories ──────────────────────────────────────────────

    /// Known accessories, ordered by serial.
    pub async fn accessories(&self) -> Vec<Accessory> {
        self.inner.accessories.read().await.values().cloned().collect()
    }

    /// Information for one known accessory.
    pub async fn accessory(&self, serial: &str) -> Option<Accessory> {
        self.inner.accessories.read().await.get(serial).cloned()
    }

    /// Fetch one device record straight from the cloud, known or not.
    pub async fn device(&self, serial: &str) -> Result<Device, CoreError> {
        Ok(self.inner.session.get_device(serial).await?)
    }

    /// Current-state values a host should accept.
    pub fn valid_current_states(&self) -> &'static [CurrentHeaterState] {
        CurrentHeaterState::VALID
    }

    /// Target-state values a host should accept.
    pub fn valid_target_states(&self) -> &'static [TargetHeaterState] {
        TargetHeaterState::VALID
    }

    /// Every derived state of one heater.
    pub async fn status(&self, serial: &str) -> Result<HeaterStatus, CoreError> {
        self.inner.adapter.status(serial).await
    }

    // ── Host callbacks ───────────────────────────────────────────

    /// Resolve a characteristic read for one accessory.
    pub async fn handle_get(
        &self,
        serial: &str,
        characteristic: Characteristic,
    ) -> Result<CharacteristicValue, CoreError> {
        let adapter = &self.inner.adapter;
        let value = match characteristic {
            Characteristic::Active => {
                CharacteristicValue::Bool(adapter.get_heater_active(serial).await?)
            }
            Characteristic::CurrentHeaterState => {
                CharacteristicValue::CurrentState(adapter.get_current_heater_state(serial).await?)
            }
            Characteristic::TargetHeaterState => {
                CharacteristicValue::TargetState(adapter.get_target_heater_state())
            }
            Characteristic::CurrentTemperature | Characteristic::HeatingThresholdTemperature => {
                CharacteristicValue::Integer(adapter.get_temperature(serial).await?)
            }
            Characteristic::WaterInUse => {
                CharacteristicValue::Bool(adapter.get_water_in_use(serial).await?)
            }
            Characteristic::WaterIsReady => {
                CharacteristicValue::Bool(adapter.get_water_is_ready(serial).await?)
            }
        };
        Ok(value)
    }

    /// Resolve a characteristic write for one accessory.
    pub async fn handle_set(
        &self,
        serial: &str,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) -> Result<(), CoreError> {
        let adapter = &self.inner.adapter;
        match (characteristic, value) {
            (Characteristic::Active, CharacteristicValue::Bool(active)) => {
                adapter.set_heater_active(serial, active).await
            }
            (Characteristic::Active, CharacteristicValue::Integer(n)) => {
                adapter.set_heater_active(serial, n != 0).await
            }
            (Characteristic::HeatingThresholdTemperature, CharacteristicValue::Integer(celsius)) => {
                adapter.set_target_temperature(serial, celsius).await
            }
            (c, v) if c.is_writable() => Err(CoreError::InvalidValue {
                characteristic: c.to_string(),
                reason: format!("unsupported value {v}"),
            }),
            (c, _) => Err(CoreError::ReadOnly {
                characteristic: c.to_string(),
            }),
        }
    }

    // ── Background tasks ─────────────────────────────────────────

    async fn spawn_token_refresher(&self) {
        let period = self.inner.config.refresh_interval;
        if period.is_zero() {
            debug!("token renewal disabled");
            return;
        }

        let mut handles = self.inner.task_handles.lock().await;
        if !handles.is_empty() {
            return;
        }
        let session = Arc::clone(&self.inner.session);
        let cancel = self.inner.cancel.child_token();
        handles.push(tokio::spawn(token_refresh_task(session, period, cancel)));
    }
}

// ── Free functions ───────────────────────────────────────────────

fn build_transport(config: &ControllerConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        },
        timeout: config.timeout,
        ..TransportConfig::default()
    }
}

/// Check the token once per `period`; failures are logged and the loop
/// keeps going.
async fn token_refresh_task(session: Arc<Session>, period: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately, right after sign-in.
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                match session.refresh_if_needed().await {
                    Ok(outcome) => debug!(?outcome, "token renewal tick"),
                    Err(e) => warn!(error = %e, "token renewal failed"),
                }
            }
        }
    }
    debug!("token renewal task stopped");
}
