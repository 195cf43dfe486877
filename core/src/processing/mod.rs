pub mod buffer_pool;
pub mod spectrum;
pub mod steering;
pub mod sweep;

pub use buffer_pool::BufferPool;
pub use spectrum::SpectrumAnalyzer;
pub use steering::{phase_to_steer_angle, steer_angle_to_phase};
pub use sweep::SweepDriver;
