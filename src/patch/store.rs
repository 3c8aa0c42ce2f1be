//! ValueStore - stored CC value per (channel, control)

use crate::beatstep::{Channel, Control};
use std::collections::BTreeMap;

/// Value reported for any control that has never been stored
pub const DEFAULT_VALUE: u8 = 64;

type ControlMap = BTreeMap<Control, u8>;

/// Per-channel, per-control value table with a default fallback
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueStore {
    channels: BTreeMap<Channel, ControlMap>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored value, or [`DEFAULT_VALUE`] when unset
    pub fn get(&self, channel: Channel, control: Control) -> u8 {
        self.channels
            .get(&channel)
            .and_then(|controls| controls.get(&control))
            .copied()
            .unwrap_or(DEFAULT_VALUE)
    }

    pub fn set(&mut self, channel: Channel, control: Control, value: u8) {
        self.channels
            .entry(channel)
            .or_default()
            .insert(control, value);
    }

    pub fn has(&self, channel: Channel, control: Control) -> bool {
        self.channels
            .get(&channel)
            .is_some_and(|controls| controls.contains_key(&control))
    }

    /// Number of controls stored for `channel`
    pub fn count_for_channel(&self, channel: Channel) -> usize {
        self.channels.get(&channel).map_or(0, |controls| controls.len())
    }

    /// Stored `(control, value)` pairs of one channel, in control order
    pub fn controls(&self, channel: Channel) -> impl Iterator<Item = (Control, u8)> + '_ {
        self.channels
            .get(&channel)
            .into_iter()
            .flat_map(|controls| controls.iter().map(|(&c, &v)| (c, v)))
    }

    /// Every stored `(channel, control, value)` triple
    pub fn iter(&self) -> impl Iterator<Item = (Channel, Control, u8)> + '_ {
        self.channels.iter().flat_map(|(&channel, controls)| {
            controls
                .iter()
                .map(move |(&control, &value)| (channel, control, value))
        })
    }

    pub fn len(&self) -> usize {
        self.channels.values().map(|controls| controls.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn from_channels(channels: BTreeMap<Channel, ControlMap>) -> Self {
        // Empty inner maps would make has/count disagree with the file
        let channels = channels
            .into_iter()
            .filter(|(_, controls)| !controls.is_empty())
            .collect();
        Self { channels }
    }

    pub(crate) fn channels(&self) -> &BTreeMap<Channel, ControlMap> {
        &self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unset_returns_default() {
        let store = ValueStore::new();
        assert_eq!(store.get(3, 10), DEFAULT_VALUE);
        assert!(!store.has(3, 10));
        assert_eq!(store.count_for_channel(3), 0);
    }

    #[test]
    fn test_set_is_upsert() {
        let mut store = ValueStore::new();
        store.set(3, 10, 90);
        store.set(3, 10, 91);
        store.set(3, 10, 91);

        assert_eq!(store.get(3, 10), 91);
        assert_eq!(store.count_for_channel(3), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_iteration_order() {
        let mut store = ValueStore::new();
        store.set(2, 14, 1);
        store.set(0, 12, 2);
        store.set(2, 13, 3);

        let all: Vec<_> = store.iter().collect();
        assert_eq!(all, vec![(0, 12, 2), (2, 13, 3), (2, 14, 1)]);

        let ch2: Vec<_> = store.controls(2).collect();
        assert_eq!(ch2, vec![(13, 3), (14, 1)]);
        assert_eq!(store.controls(9).count(), 0);
    }

    #[test]
    fn test_from_channels_drops_empty_banks() {
        let mut channels = BTreeMap::new();
        channels.insert(4, ControlMap::new());
        let store = ValueStore::from_channels(channels);
        assert!(store.is_empty());
        assert!(store.channels().is_empty());
    }

    proptest! {
        #[test]
        fn prop_set_only_touches_its_pair(
            channel in 0u8..16,
            control in 0u8..128,
            value in 0u8..128,
            other_channel in 0u8..16,
            other_control in 0u8..128,
        ) {
            let mut store = ValueStore::new();
            store.set(channel, control, value);

            prop_assert_eq!(store.get(channel, control), value);
            if (other_channel, other_control) != (channel, control) {
                prop_assert_eq!(store.get(other_channel, other_control), DEFAULT_VALUE);
                prop_assert!(!store.has(other_channel, other_control));
            }
        }
    }
}
