//! Patch load and save

use crate::error::PatchError;
use crate::midi::MidiMessage;
use crate::patch;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

impl super::Engine {
    /// Replace the stored values with a patch file
    ///
    /// On success the values are broadcast to the instrument and
    /// calibration is re-armed for the current channel. On failure the
    /// stored values are left as they were.
    pub fn load_patch(&self, path: impl AsRef<Path>) -> Result<(), PatchError> {
        let path = path.as_ref();
        info!("Loading patch file {}", path.display());

        let store = match patch::load_patch(path) {
            Ok(store) => store,
            Err(e) => {
                warn!("{}", e);
                return Err(e);
            }
        };

        let broadcast: Vec<_> = store
            .iter()
            .map(|(channel, control, value)| {
                MidiMessage::ControlChange {
                    channel,
                    control,
                    value,
                }
                .encode()
            })
            .collect();

        let cmds = {
            let mut state = self.state.lock();
            state.store = store;
            state.pending.clear();
            state.rearm()
        };

        info!("Loaded {} values, broadcasting to instrument", broadcast.len());
        self.send_to_instrument(&broadcast);
        self.send_to_controller(&cmds);
        self.request_refresh();
        Ok(())
    }

    /// Write the stored values to a new timestamped file
    pub fn save_patch(&self) -> Result<PathBuf, PatchError> {
        let store = self.store();
        patch::save_patch(&self.patch_dir, &store)
    }
}
