//! Error types for patch storage, MIDI transport and configuration

use std::path::PathBuf;
use thiserror::Error;

/// Loading or saving a patch file failed
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("patch file {0} does not exist")]
    Missing(PathBuf),

    #[error("failed to read patch file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("patch file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("failed to save patch file {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode patch: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A MIDI port could not be opened or written
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("MIDI init failed: {0}")]
    Init(#[from] midir::InitError),

    #[error("port matching '{0}' not found")]
    PortNotFound(String),

    #[error("failed to connect to '{port}': {reason}")]
    Connect { port: String, reason: String },

    #[error("'{0}' is not connected")]
    NotConnected(String),

    #[error("failed to send to '{port}': {source}")]
    Send {
        port: String,
        #[source]
        source: midir::SendError,
    },
}

/// The configuration file exists but cannot be used
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
