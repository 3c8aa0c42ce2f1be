//! Inbound message routing
//!
//! Listeners are plain data: a [`Trigger`] naming what to look for and an
//! [`Action`] naming what to do. The engine runs matched actions itself.

use crate::beatstep::{self, Control};
use crate::midi::{format_hex, MidiMessage};
use crate::sysex::{match_template, MatchResult};
use tracing::{debug, error, info, trace};

/// What a listener reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// A control change with this control number, on any channel
    Control(Control),
    /// A SysEx message matching this template
    Pattern(Vec<u8>),
}

/// What the engine does when a listener fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    DecrementChannel,
    IncrementChannel,
    ToggleFreeze,
    /// Payload carries the device's global channel
    AdoptDeviceChannel,
    SavePatch,
}

/// Ordered set of listeners
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    listeners: Vec<(Trigger, Action)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listeners for the BeatStep transport buttons and replies
    pub fn beatstep() -> Self {
        let mut registry = Self::new();
        registry.add(
            Trigger::Pattern(beatstep::CHANNEL_REPLY_TEMPLATE.to_vec()),
            Action::AdoptDeviceChannel,
        );
        registry.add(
            Trigger::Pattern(beatstep::SAVE_TRIGGER_TEMPLATE.to_vec()),
            Action::SavePatch,
        );
        registry.add(
            Trigger::Control(beatstep::DECREMENT_CONTROL),
            Action::DecrementChannel,
        );
        registry.add(
            Trigger::Control(beatstep::INCREMENT_CONTROL),
            Action::IncrementChannel,
        );
        registry.add(
            Trigger::Control(beatstep::TOGGLE_FREEZE_CONTROL),
            Action::ToggleFreeze,
        );
        registry
    }

    pub fn add(&mut self, trigger: Trigger, action: Action) {
        self.listeners.push((trigger, action));
    }

    /// Actions registered for a control number
    pub fn control_actions(&self, control: Control) -> Vec<Action> {
        self.listeners
            .iter()
            .filter_map(|(trigger, action)| match trigger {
                Trigger::Control(c) if *c == control => Some(*action),
                _ => None,
            })
            .collect()
    }

    /// Actions whose template matches `message`, with extracted payloads
    pub fn pattern_actions(&self, message: &[u8]) -> Vec<(Action, Vec<u8>)> {
        self.listeners
            .iter()
            .filter_map(|(trigger, action)| match trigger {
                Trigger::Pattern(template) => match match_template(template, message) {
                    MatchResult::Matched(payload) => Some((*action, payload)),
                    MatchResult::NoMatch => None,
                },
                Trigger::Control(_) => None,
            })
            .collect()
    }
}

impl super::Engine {
    /// Handle one inbound message from the controller
    pub fn on_message(&self, message: &MidiMessage) {
        match *message {
            MidiMessage::ControlChange {
                channel,
                control,
                value,
            } => self.on_control_change(channel, control, value),
            MidiMessage::SysEx { .. } => self.on_pattern(&message.encode()),
            _ => {
                trace!("Ignoring {}", message);
                return;
            }
        }
        self.request_refresh();
    }

    fn on_control_change(&self, channel: u8, control: Control, value: u8) {
        for action in self.listeners.control_actions(control) {
            self.run_action(action, &[]);
        }

        if beatstep::is_reserved(control) {
            return;
        }

        let mut state = self.state.lock();
        if channel != state.channel {
            trace!("CC {} on inactive channel {}", control, channel + 1);
        } else if !state.pending.is_empty() {
            state.detect(control, value);
        } else if !state.frozen {
            trace!("Storing ch:{} cc:{} = {}", channel + 1, control, value);
            state.store.set(channel, control, value);
        } else {
            trace!("Frozen, not storing cc:{} = {}", control, value);
        }
    }

    fn on_pattern(&self, bytes: &[u8]) {
        let matched = self.listeners.pattern_actions(bytes);
        if matched.is_empty() {
            trace!("No listener for SysEx {}", format_hex(bytes));
        }
        for (action, payload) in matched {
            self.run_action(action, &payload);
        }
    }

    fn run_action(&self, action: Action, payload: &[u8]) {
        debug!("Running {:?} (payload {:02X?})", action, payload);
        match action {
            Action::DecrementChannel => self.decrement_channel(),
            Action::IncrementChannel => self.increment_channel(),
            Action::ToggleFreeze => self.toggle_freeze(),
            Action::AdoptDeviceChannel => self.adopt_device_channel(payload),
            Action::SavePatch => match self.save_patch() {
                Ok(path) => info!("Saved patch file {}", path.display()),
                Err(e) => error!("Error saving patch file: {}", e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beatstep_registry_controls() {
        let registry = ListenerRegistry::beatstep();
        assert_eq!(registry.control_actions(0x34), vec![Action::DecrementChannel]);
        assert_eq!(registry.control_actions(0x35), vec![Action::IncrementChannel]);
        assert_eq!(registry.control_actions(0x36), vec![Action::ToggleFreeze]);
        assert!(registry.control_actions(12).is_empty());
    }

    #[test]
    fn test_beatstep_registry_patterns() {
        let registry = ListenerRegistry::beatstep();

        let stop = [0xF0, 0x7F, 0x7F, 0x06, 0x01, 0xF7];
        assert_eq!(registry.pattern_actions(&stop), vec![(Action::SavePatch, vec![])]);

        let reply = [
            0xF0, 0x00, 0x20, 0x6B, 0x7F, 0x42, 0x02, 0x00, 0x40, 0x06, 0x09, 0xF7,
        ];
        assert_eq!(
            registry.pattern_actions(&reply),
            vec![(Action::AdoptDeviceChannel, vec![0x09])]
        );

        let play = [0xF0, 0x7F, 0x7F, 0x06, 0x02, 0xF7];
        assert!(registry.pattern_actions(&play).is_empty());
    }

    #[test]
    fn test_multiple_listeners_for_one_control() {
        let mut registry = ListenerRegistry::new();
        registry.add(Trigger::Control(0x40), Action::ToggleFreeze);
        registry.add(Trigger::Control(0x40), Action::SavePatch);
        assert_eq!(
            registry.control_actions(0x40),
            vec![Action::ToggleFreeze, Action::SavePatch]
        );
    }
}
