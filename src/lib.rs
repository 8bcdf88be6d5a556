pub mod cli;
pub mod core;
pub mod epub;
pub mod net;
pub mod speed;

pub use crate::core::config::NetConfig;
pub use crate::speed::{format_human_readable_speed, SpeedTest, SpeedTestReport};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetprobeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, NetprobeError>;

impl From<reqwest::Error> for NetprobeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            NetprobeError::Parse(err.to_string())
        } else {
            NetprobeError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for NetprobeError {
    fn from(err: serde_json::Error) -> Self {
        NetprobeError::Parse(err.to_string())
    }
}

impl From<zip::result::ZipError> for NetprobeError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => NetprobeError::Io(e),
            other => NetprobeError::Archive(other.to_string()),
        }
    }
}

impl From<walkdir::Error> for NetprobeError {
    fn from(err: walkdir::Error) -> Self {
        match err.into_io_error() {
            Some(e) => NetprobeError::Io(e),
            None => NetprobeError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "filesystem loop while walking directory",
            )),
        }
    }
}
