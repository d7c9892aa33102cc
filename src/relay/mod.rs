pub mod controller;

pub use controller::{RelayConfig, SlotRelay};

use thiserror::Error;

use crate::detector::DetectorError;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("serial error: {0}")]
    Serial(#[from] serialport::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("detector error: {0}")]
    Detector(#[from] DetectorError),
}
