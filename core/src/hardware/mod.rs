//! Capability interface between the sweep loop and the Phaser board.

pub mod beamformer;
pub mod settings;

pub use beamformer::element_phases;
pub use settings::{GpioRouting, HardwareSettings, SignalSource};

use crate::prelude::{CapturedBuffer, ELEMENT_COUNT};

#[derive(thiserror::Error, Debug)]
pub enum HardwareError {
    #[error("front end not initialized")]
    NotInitialized,
    #[error("invalid setting: {0}")]
    InvalidSetting(String),
    #[error("device error: {0}")]
    Device(String),
}

pub type HardwareResult<T> = Result<T, HardwareError>;

/// Blocking operations the sweep needs from the radio and beamformer pair.
pub trait PhaserFrontEnd {
    /// Programs LO, gains, taper and transmit routing.
    fn initialize(&mut self, settings: &HardwareSettings) -> HardwareResult<()>;
    /// Applies an inter-element phase delta across the receive array.
    fn program_phase(
        &mut self,
        phase_delta_deg: f64,
        phase_step_deg: f64,
        calibration_deg: &[f64; ELEMENT_COUNT],
    ) -> HardwareResult<()>;
    fn capture(&mut self) -> HardwareResult<CapturedBuffer>;
    fn shutdown(&mut self);
}

impl<T: PhaserFrontEnd + ?Sized> PhaserFrontEnd for &mut T {
    fn initialize(&mut self, settings: &HardwareSettings) -> HardwareResult<()> {
        (**self).initialize(settings)
    }

    fn program_phase(
        &mut self,
        phase_delta_deg: f64,
        phase_step_deg: f64,
        calibration_deg: &[f64; ELEMENT_COUNT],
    ) -> HardwareResult<()> {
        (**self).program_phase(phase_delta_deg, phase_step_deg, calibration_deg)
    }

    fn capture(&mut self) -> HardwareResult<CapturedBuffer> {
        (**self).capture()
    }

    fn shutdown(&mut self) {
        (**self).shutdown()
    }
}
