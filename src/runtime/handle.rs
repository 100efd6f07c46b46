use std::sync::Arc;

use parking_lot::RwLockReadGuard;
use thiserror::Error;
use tokio::{
    sync::{Mutex, broadcast, mpsc, oneshot},
    time::{Duration, Instant},
};
use tracing::{debug, error, warn};

use crate::{
    core::{
        log::{DiveLog, StoreError},
        shared::SharedDiveLog,
    },
    dive::Dive,
    persist::{
        LogStore, PersistError,
        json::{JsonFileStore, StoreConfig},
    },
    types::LogSeq,
};

use super::events::LogEvent;

/// Failure of a runtime call.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The mutation was rejected by the log.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The requested save failed.
    #[error(transparent)]
    Persist(#[from] PersistError),
    /// The persistence worker has stopped.
    #[error("persistence worker is not running")]
    ChannelClosed,
}

/// Startup and persistence worker settings.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Location of the log file.
    pub store: StoreConfig,
    /// Write an empty log when no file exists yet.
    pub create_if_missing: bool,
    /// Delay between the first dirty signal and the save it triggers.
    pub coalesce_window_ms: u64,
    /// Capacity of the worker's command queue.
    pub persist_queue_bound: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            create_if_missing: true,
            coalesce_window_ms: 50,
            persist_queue_bound: 16,
        }
    }
}

enum PersistMsg {
    Dirty,
    Flush {
        resp: oneshot::Sender<Result<LogSeq, PersistError>>,
    },
    Shutdown {
        resp: oneshot::Sender<Result<(), PersistError>>,
    },
}

/// Sender side of the persistence worker.
#[derive(Clone)]
pub struct PersistHandle {
    cmd_tx: mpsc::Sender<PersistMsg>,
    events_tx: broadcast::Sender<LogEvent>,
}

/// Spawns the single persistence task for `log`. Must run inside a tokio runtime.
///
/// Dirty signals arriving within `coalesce_window_ms` of the first one are folded into a
/// single save, which snapshots the log under its write lock.
pub fn spawn_persistence(
    log: SharedDiveLog,
    store: Box<dyn LogStore>,
    config: &RuntimeConfig,
) -> PersistHandle {
    let (cmd_tx, mut rx) = mpsc::channel::<PersistMsg>(config.persist_queue_bound.max(1));
    let (events_tx, _) = broadcast::channel::<LogEvent>(256);
    let window = Duration::from_millis(config.coalesce_window_ms);
    let store = Arc::new(Mutex::new(store));
    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else {
                        if deadline.is_some() {
                            let _ = save_now(&log, &store, &events_tx_loop).await;
                        }
                        break;
                    };

                    match msg {
                        PersistMsg::Dirty => {
                            if deadline.is_none() {
                                deadline = Some(Instant::now() + window);
                            } else {
                                debug!("dirty signal coalesced into pending save");
                            }
                        }
                        PersistMsg::Flush { resp } => {
                            deadline = None;
                            let result = save_now(&log, &store, &events_tx_loop).await;
                            let _ = resp.send(result);
                        }
                        PersistMsg::Shutdown { resp } => {
                            let result = if deadline.take().is_some() {
                                save_now(&log, &store, &events_tx_loop).await.map(|_| ())
                            } else {
                                Ok(())
                            };
                            let _ = resp.send(result);
                            break;
                        }
                    }
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    deadline = None;
                    let _ = save_now(&log, &store, &events_tx_loop).await;
                }
            }
        }
    });

    PersistHandle { cmd_tx, events_tx }
}

impl PersistHandle {
    /// Receiver for [`LogEvent`]s emitted after each save attempt.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEvent> {
        self.events_tx.subscribe()
    }

    /// Asks for a save of the current state without waiting for it.
    pub fn notify_dirty(&self) {
        match self.cmd_tx.try_send(PersistMsg::Dirty) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!("persistence queue full, dirty signal coalesced");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("persistence worker stopped, dirty signal dropped");
            }
        }
    }

    /// Saves immediately and returns the sequence written.
    pub async fn flush(&self) -> Result<LogSeq, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(PersistMsg::Flush { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        Ok(rx.await.map_err(|_| RuntimeError::ChannelClosed)??)
    }

    /// Writes any pending state and stops the worker.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(PersistMsg::Shutdown { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        Ok(rx.await.map_err(|_| RuntimeError::ChannelClosed)??)
    }
}

async fn save_now(
    log: &SharedDiveLog,
    store: &Arc<Mutex<Box<dyn LogStore>>>,
    events_tx: &broadcast::Sender<LogEvent>,
) -> Result<LogSeq, PersistError> {
    let log = log.clone();
    let store = Arc::clone(store);
    let (sequence, result) = tokio::task::spawn_blocking(move || {
        let mut store = store.blocking_lock();
        let mut log = log.write();
        let sequence = log.sequence();
        (sequence, store.save(&mut log))
    })
    .await
    .map_err(|e| PersistError::Task(e.to_string()))?;

    match &result {
        Ok(written) => {
            let _ = events_tx.send(LogEvent::Persisted { sequence: *written });
        }
        Err(err) => {
            error!(sequence, error = %err, "persistence of dive log failed");
            let _ = events_tx.send(LogEvent::PersistFailed {
                sequence,
                reason: err.to_string(),
            });
        }
    }
    result
}

/// Owning context for one dive log: the shared index plus its persistence worker.
///
/// Mutations take the write lock, release it, then signal the worker, so they succeed
/// regardless of disk health.
#[derive(Clone)]
pub struct DiveLogHandle {
    log: SharedDiveLog,
    persist: PersistHandle,
}

impl DiveLogHandle {
    /// Pairs a shared log with the worker persisting it.
    pub fn new(log: SharedDiveLog, persist: PersistHandle) -> Self {
        Self { log, persist }
    }

    /// Shared log, for callers that need to hold a guard across calls.
    pub fn shared(&self) -> &SharedDiveLog {
        &self.log
    }

    /// Persistence worker handle.
    pub fn persistence(&self) -> &PersistHandle {
        &self.persist
    }

    /// Read guard over the log.
    pub fn read(&self) -> RwLockReadGuard<'_, DiveLog> {
        self.log.read()
    }

    /// See [`DiveLog::is_renumbered`].
    pub fn is_renumbered(&self) -> bool {
        self.log.read().is_renumbered()
    }

    /// Inserts `dive` and schedules a save.
    pub fn insert(&self, dive: Dive) -> Result<(), StoreError> {
        self.log.write().insert(dive)?;
        self.persist.notify_dirty();
        Ok(())
    }

    /// Deletes dive `id`, scheduling a save when it was present.
    pub fn delete(&self, id: &str) -> bool {
        let found = self.log.write().delete(id);
        if found {
            self.persist.notify_dirty();
        }
        found
    }

    /// Replaces dive `existing_id` and schedules a save.
    pub fn replace(&self, existing_id: &str, updated: Dive) -> Result<(), StoreError> {
        self.log.write().replace(existing_id, updated)?;
        self.persist.notify_dirty();
        Ok(())
    }

    /// See [`PersistHandle::flush`].
    pub async fn flush(&self) -> Result<LogSeq, RuntimeError> {
        self.persist.flush().await
    }

    /// See [`PersistHandle::shutdown`].
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.persist.shutdown().await
    }
}

/// Loads the log described by `config` and starts its persistence worker.
///
/// A missing file is created first when `create_if_missing` is set; any other load
/// failure is returned and should abort startup.
pub fn open(config: RuntimeConfig) -> Result<DiveLogHandle, PersistError> {
    let mut store = JsonFileStore::new(config.store.clone());
    let mut log = DiveLog::new();
    if config.create_if_missing {
        store.init(&mut log)?;
    }
    store.load(&mut log)?;

    let shared = SharedDiveLog::new(log);
    let persist = spawn_persistence(shared.clone(), Box::new(store), &config);
    Ok(DiveLogHandle::new(shared, persist))
}
