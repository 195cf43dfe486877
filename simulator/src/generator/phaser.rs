use crate::generator::scene::SceneConfig;
use crate::generator::template::complex_tone;
use log::debug;
use num_complex::{Complex32, Complex64};
use phasercore::hardware::{
    element_phases, HardwareError, HardwareResult, HardwareSettings, PhaserFrontEnd, SignalSource,
};
use phasercore::prelude::{CapturedBuffer, ELEMENT_COUNT, SPEED_OF_LIGHT};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f64::consts::PI;

/// Largest magnitude the 12-bit receiver can report on I or Q.
const ADC_LIMIT: f64 = 2047.0;

/// Elements wired to the first receive channel; the rest feed the second.
const CHANNEL_SPLIT: usize = ELEMENT_COUNT / 2;

/// Software model of the Phaser: a plane-wave tone hitting an eight element
/// array whose two beamformers feed the two receive channels.
pub struct SimulatedPhaser {
    scene: SceneConfig,
    signal_freq_hz: f64,
    spacing_m: f64,
    settings: Option<HardwareSettings>,
    element_phases_deg: [f64; ELEMENT_COUNT],
    rng: StdRng,
}

impl SimulatedPhaser {
    pub fn new(scene: SceneConfig, signal_freq_hz: f64, spacing_m: f64) -> Self {
        let rng = StdRng::seed_from_u64(scene.seed);
        Self {
            scene,
            signal_freq_hz,
            spacing_m,
            settings: None,
            element_phases_deg: [0.0; ELEMENT_COUNT],
            rng,
        }
    }

    /// Phase register values from the last `program_phase` call.
    #[cfg(test)]
    pub fn element_phases(&self) -> &[f64; ELEMENT_COUNT] {
        &self.element_phases_deg
    }

    fn settings(&self) -> HardwareResult<&HardwareSettings> {
        self.settings.as_ref().ok_or(HardwareError::NotInitialized)
    }

    /// Complex gain from the tone to each receive channel.
    fn channel_gains(&self, settings: &HardwareSettings) -> [Complex64; 2] {
        let sin_source = self.scene.source_angle_deg.to_radians().sin();
        let arrival_step =
            2.0 * PI * self.spacing_m * sin_source * self.signal_freq_hz / SPEED_OF_LIGHT;
        let mut gains = [Complex64::new(0.0, 0.0); 2];
        for idx in 0..ELEMENT_COUNT {
            let arrival = -arrival_step * idx as f64
                + self.scene.element_phase_error_deg[idx].to_radians();
            let weight = f64::from(settings.element_gains[idx]) / 127.0;
            let phase = arrival + self.element_phases_deg[idx].to_radians();
            let channel = usize::from(idx >= CHANNEL_SPLIT);
            gains[channel] += Complex64::from_polar(weight, phase);
        }
        gains
    }

    fn source_amplitude(&self, settings: &HardwareSettings) -> f64 {
        match settings.signal_source {
            SignalSource::Hb100 => self.scene.amplitude_codes,
            SignalSource::Out1 | SignalSource::Out2 => {
                self.scene.amplitude_codes * 10f64.powf(settings.effective_tx_gain_db() / 20.0)
            }
        }
    }

    fn digitize(&mut self, value: Complex64) -> Complex32 {
        let noise = self.scene.noise_codes;
        let (dn_re, dn_im) = if noise > 0.0 {
            (
                self.rng.gen_range(-noise..noise),
                self.rng.gen_range(-noise..noise),
            )
        } else {
            (0.0, 0.0)
        };
        let quantize = |v: f64| v.round().clamp(-ADC_LIMIT, ADC_LIMIT) as f32;
        Complex32::new(quantize(value.re + dn_re), quantize(value.im + dn_im))
    }
}

impl PhaserFrontEnd for SimulatedPhaser {
    fn initialize(&mut self, settings: &HardwareSettings) -> HardwareResult<()> {
        settings.validate()?;
        debug!(
            "simulated init: rx LO {:.3} GHz, mixer LO {:.4} GHz, tx {} (gain {} dB), taper {:?}",
            settings.rx_lo_hz / 1e9,
            settings.mixer_lo_hz / 1e9,
            if settings.routing.tx_out1 { "OUT1" } else { "OUT2" },
            settings.effective_tx_gain_db(),
            settings.element_gains
        );
        self.element_phases_deg = [0.0; ELEMENT_COUNT];
        self.rng = StdRng::seed_from_u64(self.scene.seed);
        self.settings = Some(settings.clone());
        Ok(())
    }

    fn program_phase(
        &mut self,
        phase_delta_deg: f64,
        phase_step_deg: f64,
        calibration_deg: &[f64; ELEMENT_COUNT],
    ) -> HardwareResult<()> {
        self.settings()?;
        self.element_phases_deg = element_phases(phase_delta_deg, phase_step_deg, calibration_deg);
        Ok(())
    }

    fn capture(&mut self) -> HardwareResult<CapturedBuffer> {
        let settings = self.settings()?.clone();
        let tone = complex_tone(
            settings.buffer_size,
            self.scene.tone_offset_hz,
            settings.sample_rate_hz,
            self.source_amplitude(&settings),
        );
        let [gain0, gain1] = self.channel_gains(&settings);

        let mut rx0 = Vec::with_capacity(tone.len());
        let mut rx1 = Vec::with_capacity(tone.len());
        for sample in tone {
            rx0.push(self.digitize(sample * gain0));
            rx1.push(self.digitize(sample * gain1));
        }
        Ok(CapturedBuffer::new(rx0, rx1))
    }

    fn shutdown(&mut self) {
        self.settings = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::PhaserConfig;

    fn initialized(scene: SceneConfig) -> SimulatedPhaser {
        let cfg = PhaserConfig::default();
        let mut phaser = SimulatedPhaser::new(scene, cfg.signal_freq_hz, cfg.element_spacing_m);
        phaser
            .initialize(&cfg.to_hardware_settings(cfg.signal_freq_hz))
            .unwrap();
        phaser
    }

    #[test]
    fn calls_before_initialize_fail() {
        let mut phaser = SimulatedPhaser::new(SceneConfig::default(), 10.5e9, 0.014);
        assert!(matches!(
            phaser.capture(),
            Err(HardwareError::NotInitialized)
        ));
        assert!(matches!(
            phaser.program_phase(0.0, 2.8125, &[0.0; ELEMENT_COUNT]),
            Err(HardwareError::NotInitialized)
        ));
    }

    #[test]
    fn capture_returns_configured_buffer_size() {
        let mut phaser = initialized(SceneConfig::default());
        let capture = phaser.capture().unwrap();
        assert_eq!(capture.channels[0].len(), 1024);
        assert_eq!(capture.channels[1].len(), 1024);
    }

    #[test]
    fn boresight_source_adds_coherently_at_zero_phase() {
        let scene = SceneConfig {
            noise_codes: 0.0,
            ..SceneConfig::default()
        };
        let mut phaser = initialized(scene);
        phaser.program_phase(0.0, 2.8125, &[0.0; ELEMENT_COUNT]).unwrap();
        let capture = phaser.capture().unwrap();
        // four elements at gain 100/127 and 60 codes each
        let expected = (4.0 * 60.0 * 100.0 / 127.0f64).round() as f32;
        assert_eq!(capture.channels[0][0], Complex32::new(expected, 0.0));
        assert_eq!(capture.channels[1][0], Complex32::new(expected, 0.0));
    }

    #[test]
    fn samples_clip_at_adc_full_scale() {
        let scene = SceneConfig {
            amplitude_codes: 5000.0,
            noise_codes: 0.0,
            ..SceneConfig::default()
        };
        let mut phaser = initialized(scene);
        phaser.program_phase(0.0, 2.8125, &[0.0; ELEMENT_COUNT]).unwrap();
        let capture = phaser.capture().unwrap();
        assert!(capture.channels.iter().flatten().all(|s| {
            f64::from(s.re).abs() <= ADC_LIMIT && f64::from(s.im).abs() <= ADC_LIMIT
        }));
        assert_eq!(capture.channels[0][0].re, ADC_LIMIT as f32);
    }

    #[test]
    fn program_phase_latches_quantized_element_phases() {
        let mut phaser = initialized(SceneConfig::default());
        phaser.program_phase(10.0, 2.8125, &[0.0; ELEMENT_COUNT]).unwrap();
        assert_eq!(phaser.element_phases()[1], 4.0 * 2.8125);
        phaser.shutdown();
        assert!(phaser.capture().is_err());
    }
}
