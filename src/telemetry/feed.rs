//! Latest-value consumer for dashboard telemetry pushes

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use super::channel::{lock, EventChannel, Handler, SubscriptionToken, TelemetryError};
use super::messages::{CpuInfo, SystemLog, CPU_INFO, GET_CPU_INFO, GET_SYSTEM_LOG, SYSTEM_LOG};

/// Refresh period of the dashboard cards
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
struct Snapshot {
    cpu_info: Option<CpuInfo>,
    system_log: Option<SystemLog>,
}

/// Keeps the most recent CPU and system-log messages from a channel
///
/// One handler per event is registered on `attach` and removed on drop.
/// Each push replaces the stored value; no ordering is assumed.
pub struct TelemetryFeed {
    channel: Arc<dyn EventChannel>,
    latest: Arc<Mutex<Snapshot>>,
    tokens: Vec<SubscriptionToken>,
}

impl TelemetryFeed {
    pub fn attach(channel: Arc<dyn EventChannel>) -> Self {
        let latest = Arc::new(Mutex::new(Snapshot::default()));

        let tokens = vec![
            channel.subscribe(
                CPU_INFO,
                replace_latest(&latest, CPU_INFO, |snapshot, info: CpuInfo| {
                    snapshot.cpu_info = Some(info)
                }),
            ),
            channel.subscribe(
                SYSTEM_LOG,
                replace_latest(&latest, SYSTEM_LOG, |snapshot, entry: SystemLog| {
                    snapshot.system_log = Some(entry)
                }),
            ),
        ];

        Self {
            channel,
            latest,
            tokens,
        }
    }

    pub fn cpu_info(&self) -> Option<CpuInfo> {
        lock(&self.latest).cpu_info.clone()
    }

    pub fn system_log(&self) -> Option<SystemLog> {
        lock(&self.latest).system_log.clone()
    }

    /// Ask for a CPU snapshot; false if the channel is down
    pub fn refresh_cpu_info(&self) -> bool {
        self.request(GET_CPU_INFO)
    }

    /// Ask for a system log snippet; false if the channel is down
    pub fn refresh_system_log(&self) -> bool {
        self.request(GET_SYSTEM_LOG)
    }

    fn request(&self, event: &str) -> bool {
        if !self.channel.is_connected() {
            log::debug!("skipping '{}': channel not connected", event);
            return false;
        }
        match self.channel.emit(event, Value::Null) {
            Ok(()) => true,
            Err(TelemetryError::Disconnected { .. }) => {
                log::debug!("channel dropped before '{}' was sent", event);
                false
            }
        }
    }

    /// Send both refresh requests every `interval` until `shutdown` flips to true
    ///
    /// The first round goes out immediately. Requests are fire-and-forget:
    /// nothing is retried and in-flight requests are not cancelled.
    pub async fn poll(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh_cpu_info();
                    self.refresh_system_log();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        log::debug!("telemetry polling stopped");
    }
}

impl Drop for TelemetryFeed {
    fn drop(&mut self) {
        for token in self.tokens.drain(..) {
            self.channel.unsubscribe(token);
        }
    }
}

fn replace_latest<M, F>(latest: &Arc<Mutex<Snapshot>>, event: &'static str, store: F) -> Handler
where
    M: DeserializeOwned + 'static,
    F: Fn(&mut Snapshot, M) + Send + Sync + 'static,
{
    let latest = Arc::clone(latest);
    Arc::new(move |payload: &Value| match M::deserialize(payload) {
        Ok(message) => store(&mut *lock(&latest), message),
        Err(err) => log::warn!("dropping malformed '{}' payload: {}", event, err),
    })
}
