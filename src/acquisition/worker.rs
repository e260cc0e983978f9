//! Background recording loop.
//!
//! The worker owns the rig collaborators and runs one [`record_once`] cycle at a time
//! on its own thread, so at most one engine call is ever in flight. Records are sent
//! over a channel as they are produced.
use crate::acquisition::recorder::{record_once, MeasurementRecord, RecordSettings};
use crate::acquisition::{TemperatureSensor, WaveformSource};
use crate::error::EchopropError;
use std::sync::mpsc::{channel, Receiver};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// When a recording session ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopCondition {
    /// Stop after this many records
    Count(usize),
    /// Cooling sweep: stop after the first record whose temperature is below this floor
    BelowTemperature(f64),
}

impl StopCondition {
    fn is_met(&self, produced: usize, record: &MeasurementRecord) -> bool {
        match *self {
            StopCondition::Count(n) => produced >= n,
            StopCondition::BelowTemperature(floor) => record.temperature < floor,
        }
    }
}

/// Everything a worker needs besides the collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerPlan {
    pub settings: RecordSettings,
    pub stop: StopCondition,
    /// Idle time between cycles
    pub pause: Option<Duration>,
}

pub type RecordResult = Result<MeasurementRecord, EchopropError>;

/// Starts a recording thread.
///
/// The thread ends when the stop condition is met, after sending the first error, or
/// once the receiver has been dropped.
pub fn spawn_worker<S, T>(
    mut source: S,
    mut sensor: T,
    plan: WorkerPlan,
) -> (JoinHandle<()>, Receiver<RecordResult>)
where
    S: WaveformSource + Send + 'static,
    T: TemperatureSensor + Send + 'static,
{
    let (tx, rx) = channel();
    let handle = thread::spawn(move || {
        if plan.stop == StopCondition::Count(0) {
            return;
        }
        let mut produced = 0;
        loop {
            let outcome = record_once(&mut source, &mut sensor, &plan.settings);
            let done = match &outcome {
                Ok(record) => {
                    produced += 1;
                    plan.stop.is_met(produced, record)
                }
                Err(e) => {
                    warn!("recording stopped: {e}");
                    true
                }
            };
            if tx.send(outcome).is_err() {
                debug!("receiver dropped, stopping worker");
                break;
            }
            if done {
                break;
            }
            if let Some(pause) = plan.pause {
                thread::sleep(pause);
            }
        }
        debug!(produced, "worker finished");
    });
    (handle, rx)
}
