//! Pad LED feedback
//!
//! Each encoder's pad shows whether it is waiting for calibration, locked to
//! a stored value, or free. Refreshes are requested after every inbound
//! message and coalesced by a single worker task: the request queue holds at
//! most one entry, and the worker waits out the settling delay before
//! draining it and refreshing once.

use super::EngineState;
use crate::beatstep::{self, Encoder, LedColor};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{trace, warn};

/// Indicator state of one encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Off,
    Calibrating,
    Locked,
}

impl Indicator {
    pub fn color(self) -> LedColor {
        match self {
            Indicator::Off => LedColor::Off,
            Indicator::Calibrating => LedColor::Magenta,
            Indicator::Locked => LedColor::Blue,
        }
    }
}

impl EngineState {
    pub(crate) fn indicator(&self, encoder: Encoder) -> Indicator {
        if self.pending.contains(&encoder) {
            Indicator::Calibrating
        } else if self.frozen
            && self
                .store
                .has(self.channel, beatstep::encoder_to_control(encoder))
        {
            Indicator::Locked
        } else {
            Indicator::Off
        }
    }

    pub(crate) fn indicators(&self) -> Vec<(Encoder, Indicator)> {
        beatstep::ENCODERS
            .map(|encoder| (encoder, self.indicator(encoder)))
            .collect()
    }
}

/// Handle to the LED refresh worker
#[derive(Clone)]
pub struct FeedbackScheduler {
    tx: mpsc::Sender<()>,
}

impl FeedbackScheduler {
    /// Spawn the worker on the current tokio runtime
    pub fn spawn(engine: super::Engine, delay: Duration) -> Self {
        let (tx, mut rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                tokio::time::sleep(delay).await;
                // Requests that arrived while settling are served by this pass
                while rx.try_recv().is_ok() {}
                engine.refresh_indicators();
            }
            trace!("Feedback worker stopped");
        });

        Self { tx }
    }

    pub fn request(&self) {
        match self.tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Closed(())) => warn!("Feedback worker is gone"),
        }
    }
}

impl super::Engine {
    /// Ask for a debounced LED refresh
    pub fn request_refresh(&self) {
        if let Some(feedback) = &self.feedback {
            feedback.request();
        }
    }

    /// Current indicator of every encoder
    pub fn indicators(&self) -> Vec<(Encoder, Indicator)> {
        self.state.lock().indicators()
    }

    /// Send one LED command per encoder reflecting its indicator
    pub fn refresh_indicators(&self) {
        let cmds: Vec<_> = self
            .indicators()
            .into_iter()
            .map(|(encoder, indicator)| {
                beatstep::set_led(beatstep::encoder_to_pad(encoder), indicator.color())
            })
            .collect();
        trace!("Refreshing {} pad LEDs", cmds.len());
        self.send_to_controller(&cmds);
    }
}
