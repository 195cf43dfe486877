use crate::prelude::ELEMENT_COUNT;

/// Per-element phase register values for a given inter-element delta.
///
/// Element `i` gets `i * delta` rounded to the nearest register step, plus its
/// calibration offset, wrapped into `[0, 360)`.
pub fn element_phases(
    phase_delta_deg: f64,
    phase_step_deg: f64,
    calibration_deg: &[f64; ELEMENT_COUNT],
) -> [f64; ELEMENT_COUNT] {
    let mut phases = [0.0; ELEMENT_COUNT];
    for (idx, phase) in phases.iter_mut().enumerate() {
        let quantized = (phase_delta_deg * idx as f64 / phase_step_deg).round() * phase_step_deg;
        *phase = (quantized + calibration_deg[idx]).rem_euclid(360.0);
    }
    phases
}
