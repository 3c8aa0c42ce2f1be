//! MIDI message types and port helpers
//!
//! Only the message kinds the patch engine reacts to are decoded into
//! structured variants. Everything else is kept as an opaque status byte so
//! the dispatcher can ignore it without losing it in logs.

use std::fmt;

use midir::MidiIO;
use tracing::debug;

/// SysEx start byte
pub const SYSEX_START: u8 = 0xF0;

/// SysEx terminator byte
pub const SYSEX_END: u8 = 0xF7;

/// Decoded MIDI message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note Off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff { channel: u8, note: u8, velocity: u8 },

    /// Note On: channel (0-15), note (0-127), velocity (0-127)
    NoteOn { channel: u8, note: u8, velocity: u8 },

    /// Control Change: channel (0-15), control (0-127), value (0-127)
    ControlChange { channel: u8, control: u8, value: u8 },

    /// Program Change: channel (0-15), program (0-127)
    ProgramChange { channel: u8, program: u8 },

    /// System Exclusive, stored without the F0/F7 framing
    SysEx { data: Vec<u8> },

    /// Any other well-formed message the engine does not care about
    Other { status: u8 },
}

impl MidiMessage {
    /// Parse a MIDI message from raw bytes
    pub fn parse(data: &[u8]) -> Option<Self> {
        let (&status, rest) = data.split_first()?;

        // Running status is never produced by midir callbacks
        if status < 0x80 {
            return None;
        }

        if status == SYSEX_START {
            let end = rest.iter().position(|&b| b == SYSEX_END)?;
            return Some(MidiMessage::SysEx {
                data: rest[..end].to_vec(),
            });
        }

        if status >= 0xF0 {
            return Some(MidiMessage::Other { status });
        }

        let channel = status & 0x0F;
        let data1 = rest.first().map(|b| b & 0x7F);
        let data2 = rest.get(1).map(|b| b & 0x7F);

        match status & 0xF0 {
            0x80 => Some(MidiMessage::NoteOff {
                channel,
                note: data1?,
                velocity: data2?,
            }),
            0x90 => {
                let (note, velocity) = (data1?, data2?);
                // Note On with velocity 0 is a Note Off
                if velocity == 0 {
                    Some(MidiMessage::NoteOff { channel, note, velocity })
                } else {
                    Some(MidiMessage::NoteOn { channel, note, velocity })
                }
            }
            0xB0 => Some(MidiMessage::ControlChange {
                channel,
                control: data1?,
                value: data2?,
            }),
            0xC0 => Some(MidiMessage::ProgramChange {
                channel,
                program: data1?,
            }),
            0xA0 | 0xE0 => {
                data2?;
                Some(MidiMessage::Other { status })
            }
            0xD0 => {
                data1?;
                Some(MidiMessage::Other { status })
            }
            _ => None,
        }
    }

    /// Encode the message to MIDI bytes
    ///
    /// `Other` has no payload to reproduce and encodes to its status byte.
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            MidiMessage::NoteOff { channel, note, velocity } => {
                vec![0x80 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
            }
            MidiMessage::NoteOn { channel, note, velocity } => {
                vec![0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
            }
            MidiMessage::ControlChange { channel, control, value } => {
                vec![0xB0 | (channel & 0x0F), control & 0x7F, value & 0x7F]
            }
            MidiMessage::ProgramChange { channel, program } => {
                vec![0xC0 | (channel & 0x0F), program & 0x7F]
            }
            MidiMessage::SysEx { ref data } => sysex(data),
            MidiMessage::Other { status } => vec![status],
        }
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MidiMessage::NoteOff { channel, note, velocity } => {
                write!(f, "NoteOff ch:{} n:{} v:{}", channel + 1, note, velocity)
            }
            MidiMessage::NoteOn { channel, note, velocity } => {
                write!(f, "NoteOn ch:{} n:{} v:{}", channel + 1, note, velocity)
            }
            MidiMessage::ControlChange { channel, control, value } => {
                write!(f, "CC ch:{} cc:{} v:{}", channel + 1, control, value)
            }
            MidiMessage::ProgramChange { channel, program } => {
                write!(f, "ProgramChange ch:{} p:{}", channel + 1, program)
            }
            MidiMessage::SysEx { ref data } => write!(f, "SysEx {} bytes", data.len()),
            MidiMessage::Other { status } => write!(f, "Status {:02X}", status),
        }
    }
}

/// Wrap a SysEx body in F0/F7 framing
pub fn sysex(body: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(body.len() + 2);
    bytes.push(SYSEX_START);
    bytes.extend_from_slice(body);
    bytes.push(SYSEX_END);
    bytes
}

/// Format MIDI bytes as hex string for debugging
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Find a port whose name contains `pattern` (case-insensitive)
pub fn find_port_by_substring<T: MidiIO>(io: &T, pattern: &str) -> Option<(T::Port, String)> {
    let needle = pattern.to_lowercase();
    for port in io.ports() {
        if let Ok(name) = io.port_name(&port) {
            if name.to_lowercase().contains(&needle) {
                debug!("Found port '{}' matching pattern '{}'", name, pattern);
                return Some((port, name));
            }
        }
    }
    None
}
