//! MIDI transport - controller and instrument ports
//!
//! Ports are found by case-insensitive substring match. Sends are
//! fire-and-forget; a port that is down fails fast with
//! [`TransportError::NotConnected`] and is reopened lazily, at most once per
//! reconnect interval.

use crate::error::TransportError;
use crate::midi::{find_port_by_substring, format_hex, MidiMessage};
use midir::{Ignore, MidiIO, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

/// Destination for outbound MIDI bytes
pub trait MidiSink: Send + Sync {
    fn name(&self) -> &str;
    fn send(&self, data: &[u8]) -> Result<(), TransportError>;
}

/// MIDI message received from the controller
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub source: String,
    pub message: MidiMessage,
    pub raw: Vec<u8>,
}

/// Send-only MIDI port with lazy reconnection
pub struct OutputPort {
    pattern: String,
    client_name: String,
    conn: Mutex<Option<MidiOutputConnection>>,
    last_attempt: Mutex<Option<Instant>>,
    reconnect_interval: Duration,
}

impl OutputPort {
    pub fn new(pattern: impl Into<String>, client_name: impl Into<String>, reconnect_interval: Duration) -> Self {
        Self {
            pattern: pattern.into(),
            client_name: client_name.into(),
            conn: Mutex::new(None),
            last_attempt: Mutex::new(None),
            reconnect_interval,
        }
    }

    /// Try to open the port once
    pub fn connect(&self) -> Result<(), TransportError> {
        *self.last_attempt.lock() = Some(Instant::now());

        let midi_out = MidiOutput::new(&self.client_name)?;
        let (port, port_name) = find_port_by_substring(&midi_out, &self.pattern)
            .ok_or_else(|| TransportError::PortNotFound(self.pattern.clone()))?;

        let conn = midi_out
            .connect(&port, &self.client_name)
            .map_err(|e| TransportError::Connect {
                port: port_name.clone(),
                reason: e.to_string(),
            })?;

        *self.conn.lock() = Some(conn);
        info!("Connected to output port: {}", port_name);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.conn.lock().is_some()
    }

    fn reconnect_due(&self) -> bool {
        self.last_attempt
            .lock()
            .map_or(true, |at| at.elapsed() >= self.reconnect_interval)
    }
}

impl MidiSink for OutputPort {
    fn name(&self) -> &str {
        &self.pattern
    }

    fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        if !self.is_connected() && self.reconnect_due() {
            debug!("Output '{}' down, attempting reconnect", self.pattern);
            if let Err(e) = self.connect() {
                debug!("Reconnect to '{}' failed: {}", self.pattern, e);
            }
        }

        let mut guard = self.conn.lock();
        let conn = guard
            .as_mut()
            .ok_or_else(|| TransportError::NotConnected(self.pattern.clone()))?;

        if let Err(source) = conn.send(data) {
            // Drop the connection so the next send reopens it
            *guard = None;
            return Err(TransportError::Send {
                port: self.pattern.clone(),
                source,
            });
        }

        trace!("Sent to {}: {}", self.pattern, format_hex(data));
        Ok(())
    }
}

/// Controller input feeding parsed events into a channel
pub struct InputPort {
    pattern: String,
    client_name: String,
    conn: Option<MidiInputConnection<()>>,
    port_name: Option<String>,
    event_tx: mpsc::Sender<InboundEvent>,
}

impl InputPort {
    pub fn new(pattern: impl Into<String>, client_name: impl Into<String>, event_tx: mpsc::Sender<InboundEvent>) -> Self {
        Self {
            pattern: pattern.into(),
            client_name: client_name.into(),
            conn: None,
            port_name: None,
            event_tx,
        }
    }

    pub fn connect(&mut self) -> Result<(), TransportError> {
        self.conn = None;
        self.port_name = None;

        let mut midi_in = MidiInput::new(&self.client_name)?;
        // SysEx replies and the save trigger are filtered by default
        midi_in.ignore(Ignore::None);

        let (port, port_name) = find_port_by_substring(&midi_in, &self.pattern)
            .ok_or_else(|| TransportError::PortNotFound(self.pattern.clone()))?;

        let event_tx = self.event_tx.clone();
        let source = port_name.clone();

        let conn = midi_in
            .connect(
                &port,
                &self.client_name,
                move |_timestamp, data, _| match MidiMessage::parse(data) {
                    Some(message) => {
                        let event = InboundEvent {
                            source: source.clone(),
                            message,
                            raw: data.to_vec(),
                        };
                        // Never block the MIDI callback thread
                        if let Err(e) = event_tx.try_send(event) {
                            warn!("Dropping inbound MIDI event: {}", e);
                        }
                    }
                    None => debug!("Failed to parse MIDI: {}", format_hex(data)),
                },
                (),
            )
            .map_err(|e| TransportError::Connect {
                port: port_name.clone(),
                reason: e.to_string(),
            })?;

        self.conn = Some(conn);
        info!("Connected to input port: {}", port_name);
        self.port_name = Some(port_name);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Drop the connection if its port has disappeared
    ///
    /// midir keeps a connection to an unplugged port open without error, so
    /// liveness is checked by re-scanning the port list.
    pub fn check_alive(&mut self) -> bool {
        let Some(port_name) = &self.port_name else {
            return self.is_connected();
        };

        let names = match MidiInput::new(&format!("{}-scan", self.client_name)) {
            Ok(midi_in) => port_names(&midi_in),
            Err(e) => {
                debug!("Cannot scan input ports: {}", e);
                return self.is_connected();
            }
        };

        if names.iter().any(|name| name == port_name) {
            return true;
        }

        warn!("Input port '{}' disappeared", port_name);
        self.conn = None;
        self.port_name = None;
        false
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

fn port_names<T: MidiIO>(io: &T) -> Vec<String> {
    io.ports()
        .iter()
        .filter_map(|port| io.port_name(port).ok())
        .collect()
}

/// Log every available port
pub fn log_available_ports() {
    if let Ok(midi_in) = MidiInput::new("ccpatch-scanner") {
        for name in port_names(&midi_in) {
            debug!("MIDI input: {}", name);
        }
    }
    if let Ok(midi_out) = MidiOutput::new("ccpatch-scanner") {
        for name in port_names(&midi_out) {
            debug!("MIDI output: {}", name);
        }
    }
}
