//! Encoder calibration - freezing encoders to stored values
//!
//! Freezing narrows each encoder's reportable range to its stored value, so
//! the knob only reports once it physically reaches that value. Encoders
//! armed as pending stay magenta until they report the target.

use super::EngineState;
use crate::beatstep::{self, Channel, Control, Encoder, MAX_VALUE};
use tracing::{debug, info, trace};

/// Observable calibration state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    /// Full encoder range, tweaks are captured
    Unfrozen,
    /// Encoders locked, nothing left to calibrate
    FrozenClean,
    /// Encoders locked, some still waiting for the user
    FrozenPending,
}

impl EngineState {
    pub(crate) fn calibration_state(&self) -> CalibrationState {
        match (self.frozen, self.pending.is_empty()) {
            (false, _) => CalibrationState::Unfrozen,
            (true, true) => CalibrationState::FrozenClean,
            (true, false) => CalibrationState::FrozenPending,
        }
    }

    /// Mark every encoder with a stored value on `channel` as pending
    pub(crate) fn arm_for_channel(&mut self, channel: Channel) {
        let encoders: Vec<_> = self
            .store
            .controls(channel)
            .map(|(control, _)| beatstep::control_to_encoder(control))
            .collect();

        debug!("Arming {} encoders on channel {}", encoders.len(), channel + 1);
        self.pending.extend(encoders);
    }

    /// Lock every encoder to `[target, target + 1]`
    pub(crate) fn freeze_all(&mut self) -> Vec<Vec<u8>> {
        info!("Freezing all encoders on channel {}", self.channel + 1);

        let mut cmds = Vec::new();
        for encoder in self.range_targets() {
            let target = self.store.get(self.channel, beatstep::encoder_to_control(encoder));
            let upper = target.saturating_add(1).min(MAX_VALUE);
            cmds.extend(beatstep::encoder_range(encoder, target, upper));
        }

        self.frozen = true;
        cmds
    }

    /// Restore the full range on every encoder and abandon calibration
    pub(crate) fn unfreeze_all(&mut self) -> Vec<Vec<u8>> {
        info!("Unfreezing all encoders");

        let mut cmds = Vec::new();
        for encoder in self.range_targets() {
            cmds.extend(beatstep::encoder_range(encoder, 0, MAX_VALUE));
        }

        self.pending.clear();
        self.frozen = false;
        cmds
    }

    /// Encoders whose range is set on freeze and unfreeze
    ///
    /// The physical block, plus any pending encoder a stored control maps
    /// outside of it.
    fn range_targets(&self) -> Vec<Encoder> {
        let extra = self
            .pending
            .iter()
            .copied()
            .filter(|encoder| !beatstep::ENCODERS.contains(encoder));
        beatstep::ENCODERS.chain(extra).collect()
    }

    /// Re-arm and re-freeze if the current channel has stored values
    pub(crate) fn rearm(&mut self) -> Vec<Vec<u8>> {
        if self.store.count_for_channel(self.channel) == 0 {
            return Vec::new();
        }
        self.arm_for_channel(self.channel);
        self.freeze_all()
    }

    /// Clear a pending encoder once it reports its stored value
    ///
    /// Returns true if the encoder left the pending set. Stray or stale
    /// reports leave the set untouched.
    pub(crate) fn detect(&mut self, control: Control, reported: u8) -> bool {
        let encoder = beatstep::control_to_encoder(control);
        if !self.pending.contains(&encoder) {
            trace!("Control {} is not pending calibration", control);
            return false;
        }

        let target = self.store.get(self.channel, control);
        if reported != target {
            trace!(
                "Encoder {:02X} reported {}, waiting for {}",
                encoder,
                reported,
                target
            );
            return false;
        }

        self.pending.remove(&encoder);
        info!(
            "Encoder {:02X} calibrated at {} ({} remaining)",
            encoder,
            target,
            self.pending.len()
        );
        true
    }
}

impl super::Engine {
    /// Lock all encoders to the current channel's values
    pub fn freeze_all(&self) {
        let cmds = self.state.lock().freeze_all();
        self.send_to_controller(&cmds);
    }

    pub fn unfreeze_all(&self) {
        let cmds = self.state.lock().unfreeze_all();
        self.send_to_controller(&cmds);
    }

    /// Flip between frozen and unfrozen
    ///
    /// Freezing this way locks current values without arming calibration.
    pub fn toggle_freeze(&self) {
        let cmds = {
            let mut state = self.state.lock();
            if state.frozen {
                state.unfreeze_all()
            } else {
                state.freeze_all()
            }
        };
        self.send_to_controller(&cmds);
    }

    /// Feed a control report into the calibration check
    pub fn detect(&self, control: Control, reported: u8) -> bool {
        self.state.lock().detect(control, reported)
    }
}
