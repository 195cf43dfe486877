pub mod calibration;
pub mod config;
pub mod report;
pub mod runner;
