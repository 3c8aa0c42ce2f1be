//! Patch engine - keeps controller encoders in sync with the stored patch
//!
//! The engine owns all mutable state (stored values, current channel,
//! pending calibration set, frozen flag) behind a single lock. Inbound
//! messages are handled one at a time by [`Engine::on_message`]; LED
//! feedback runs on a separate coalescing task.
//!
//! - `dispatcher`: listener registry and inbound routing
//! - `calibration`: freeze/unfreeze and the pending-encoder handshake
//! - `channel`: channel selection and re-arming
//! - `feedback`: indicator computation and the refresh scheduler
//! - `storage`: patch load/save

mod calibration;
mod channel;
mod dispatcher;
mod feedback;
mod storage;


pub use calibration::CalibrationState;
pub use dispatcher::{Action, ListenerRegistry, Trigger};
pub use feedback::{FeedbackScheduler, Indicator};

use crate::beatstep::{self, Channel, Encoder};
use crate::error::TransportError;
use crate::patch::ValueStore;
use crate::transport::MidiSink;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Mutable engine state, guarded by one lock
#[derive(Debug, Default)]
pub(crate) struct EngineState {
    pub(crate) store: ValueStore,
    pub(crate) channel: Channel,
    pub(crate) pending: BTreeSet<Encoder>,
    pub(crate) frozen: bool,
}

/// Patch engine handle
///
/// Cheap to clone; clones share state and sinks.
#[derive(Clone)]
pub struct Engine {
    pub(crate) state: Arc<Mutex<EngineState>>,
    pub(crate) controller: Arc<dyn MidiSink>,
    pub(crate) instrument: Arc<dyn MidiSink>,
    pub(crate) listeners: Arc<ListenerRegistry>,
    pub(crate) feedback: Option<FeedbackScheduler>,
    pub(crate) patch_dir: PathBuf,
}

impl Engine {
    /// Create an engine with the BeatStep listeners registered
    pub fn new(
        controller: Arc<dyn MidiSink>,
        instrument: Arc<dyn MidiSink>,
        patch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(EngineState::default())),
            controller,
            instrument,
            listeners: Arc::new(ListenerRegistry::beatstep()),
            feedback: None,
            patch_dir: patch_dir.into(),
        }
    }

    /// Attach a feedback scheduler; without one, refresh requests are dropped
    pub fn with_feedback(mut self, scheduler: FeedbackScheduler) -> Self {
        self.feedback = Some(scheduler);
        self
    }

    /// Send button setup and ask the device for its global channel
    pub fn configure_device(&self) {
        info!("Configuring controller transport buttons");
        let mut cmds = beatstep::transport_button_setup();
        cmds.push(beatstep::get_global_channel());
        self.send_to_controller(&cmds);
        self.request_refresh();
    }

    pub fn current_channel(&self) -> Channel {
        self.state.lock().channel
    }

    pub fn is_frozen(&self) -> bool {
        self.state.lock().frozen
    }

    /// Encoders still waiting to be physically calibrated
    pub fn pending(&self) -> BTreeSet<Encoder> {
        self.state.lock().pending.clone()
    }

    /// Snapshot of the stored values
    pub fn store(&self) -> ValueStore {
        self.state.lock().store.clone()
    }

    pub fn calibration_state(&self) -> CalibrationState {
        self.state.lock().calibration_state()
    }

    pub(crate) fn send_to_controller(&self, cmds: &[Vec<u8>]) {
        send_all(self.controller.as_ref(), cmds);
    }

    pub(crate) fn send_to_instrument(&self, cmds: &[Vec<u8>]) {
        send_all(self.instrument.as_ref(), cmds);
    }
}

fn send_all(sink: &dyn MidiSink, cmds: &[Vec<u8>]) {
    for cmd in cmds {
        match sink.send(cmd) {
            Ok(()) => {}
            Err(e @ TransportError::NotConnected(_)) => debug!("Dropped send: {}", e),
            Err(e) => warn!("Send to {} failed: {}", sink.name(), e),
        }
    }
}
