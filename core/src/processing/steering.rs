//! Conversions between inter-element phase delta and steering angle.

use std::f64::consts::PI;

use crate::prelude::SPEED_OF_LIGHT;

/// Steering angle (degrees) reached by an inter-element phase delta.
///
/// `theta = asin(c * |dphi| / (2 pi f d))`, signed like `dphi`. The arcsine
/// argument is clamped to `[-1, 1]`, so large deltas saturate at +/-90 degrees.
pub fn phase_to_steer_angle(phase_delta_deg: f64, signal_freq_hz: f64, spacing_m: f64) -> f64 {
    let ratio = SPEED_OF_LIGHT * phase_delta_deg.abs().to_radians()
        / (2.0 * PI * signal_freq_hz * spacing_m);
    let clamped = ratio.clamp(-1.0, 1.0);
    let theta = if clamped >= 1.0 {
        90.0
    } else {
        clamped.asin().to_degrees()
    };
    if phase_delta_deg >= 0.0 {
        theta
    } else {
        -theta
    }
}

/// Inter-element phase delta (degrees) that points the beam at `angle_deg`.
pub fn steer_angle_to_phase(angle_deg: f64, signal_freq_hz: f64, spacing_m: f64) -> f64 {
    (2.0 * PI * spacing_m * angle_deg.to_radians().sin() * signal_freq_hz / SPEED_OF_LIGHT)
        .to_degrees()
}
