//! Core steering and spectral-measurement logic for the Phaser beam sweep.
//!
//! The sweep driver talks to hardware only through [`hardware::PhaserFrontEnd`],
//! so the same loop runs against the board or against a simulated front end.

pub mod hardware;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use hardware::{HardwareError, HardwareSettings, PhaserFrontEnd};
pub use prelude::{BeamPattern, CapturedBuffer, SweepConfiguration, SweepError, SweepSample};
pub use processing::SweepDriver;
