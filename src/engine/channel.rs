//! Channel selection

use crate::beatstep::{self, Channel, MAX_CHANNEL};
use tracing::{debug, info, warn};

impl super::Engine {
    pub fn increment_channel(&self) {
        self.step_channel(1);
    }

    pub fn decrement_channel(&self) {
        self.step_channel(-1);
    }

    /// Move the global channel by `delta`, clamped to 0-15
    ///
    /// The device is always told the resulting channel. Calibration is
    /// abandoned either way and only re-armed on an actual change.
    fn step_channel(&self, delta: i8) {
        let cmds = {
            let mut state = self.state.lock();
            let old = state.channel;
            let new = (i16::from(old) + i16::from(delta)).clamp(0, i16::from(MAX_CHANNEL)) as Channel;

            state.pending.clear();
            state.channel = new;

            let mut cmds = vec![
                beatstep::set_global_channel(new),
                beatstep::channel_indicator(new),
            ];

            if new != old {
                info!("Global channel {} -> {}", old + 1, new + 1);
                cmds.extend(state.rearm());
            } else {
                debug!("Global channel already at {}", new + 1);
            }
            cmds
        };
        self.send_to_controller(&cmds);
    }

    /// Adopt the channel the device reports in its global channel reply
    ///
    /// Nothing is echoed back to the device.
    pub fn adopt_device_channel(&self, payload: &[u8]) {
        let channel = match payload.first() {
            Some(&channel) if channel <= MAX_CHANNEL => channel,
            _ => {
                warn!("Ignoring invalid global channel reply: {:02X?}", payload);
                return;
            }
        };

        let cmds = {
            let mut state = self.state.lock();
            if state.channel == channel {
                debug!("Device channel {} matches", channel + 1);
                return;
            }

            info!("Device reports global channel {}", channel + 1);
            state.pending.clear();
            state.channel = channel;
            state.rearm()
        };
        self.send_to_controller(&cmds);
    }
}
