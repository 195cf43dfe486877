use crate::hardware::{HardwareSettings, PhaserFrontEnd};
use crate::prelude::{BeamPattern, SweepConfiguration, SweepResult, SweepSample};
use crate::processing::buffer_pool::BufferPool;
use crate::processing::spectrum::SpectrumAnalyzer;
use crate::processing::steering::{phase_to_steer_angle, steer_angle_to_phase};
use crate::telemetry::{LogManager, MetricsRecorder};

/// Steps the array through every steering angle and records the received peak.
///
/// Each step programs the phase delta, captures one buffer, sums the two
/// receive channels and takes the largest dBFS bin. The reported angle is
/// recomputed from the programmed phase delta. The first failure ends the
/// sweep and no partial pattern is returned.
pub struct SweepDriver<F: PhaserFrontEnd> {
    config: SweepConfiguration,
    front_end: F,
    analyzer: SpectrumAnalyzer,
    pool: BufferPool,
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl<F: PhaserFrontEnd> SweepDriver<F> {
    pub fn new(config: SweepConfiguration, front_end: F) -> SweepResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            front_end,
            analyzer: SpectrumAnalyzer::new(0),
            pool: BufferPool::with_capacity(1),
            logger: LogManager::new(),
            metrics: MetricsRecorder::new(),
        })
    }

    pub fn config(&self) -> &SweepConfiguration {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    pub fn initialize(&mut self, settings: &HardwareSettings) -> SweepResult<()> {
        settings.validate()?;
        self.front_end.initialize(settings)?;
        self.analyzer = SpectrumAnalyzer::new(settings.buffer_size);
        self.logger.record(&format!(
            "front end ready: source {}, mixer LO {:.4} GHz, {} samples at {:.3} MS/s",
            settings.signal_source,
            settings.mixer_lo_hz / 1e9,
            settings.buffer_size,
            settings.sample_rate_hz / 1e6
        ));
        Ok(())
    }

    pub fn run(&mut self) -> SweepResult<BeamPattern> {
        let angles = self.config.steering_angles();
        self.logger.record(&format!(
            "sweeping {} steering angles from {} to {} deg",
            angles.len(),
            self.config.start_deg,
            self.config.stop_deg
        ));

        let mut pattern = BeamPattern::new(self.config.signal_freq_hz);
        pattern.samples.reserve(angles.len());
        for commanded_deg in angles {
            match self.step(commanded_deg) {
                Ok(sample) => {
                    self.metrics.record_step();
                    pattern.samples.push(sample);
                }
                Err(err) => {
                    self.metrics.record_error();
                    return Err(err);
                }
            }
        }
        Ok(pattern)
    }

    fn step(&mut self, commanded_deg: f64) -> SweepResult<SweepSample> {
        let freq = self.config.signal_freq_hz;
        let spacing = self.config.element_spacing_m;
        let phase_delta_deg = steer_angle_to_phase(commanded_deg, freq, spacing);

        self.front_end.program_phase(
            phase_delta_deg,
            self.config.phase_step_deg,
            &self.config.calibration_deg,
        )?;
        let capture = self.front_end.capture()?;

        let mut summed = self.pool.checkout(capture.len())?;
        let measured = capture
            .sum_into(&mut summed)
            .and_then(|_| self.analyzer.peak_dbfs(&summed));
        self.pool.release(summed);

        let sample = SweepSample {
            angle_deg: phase_to_steer_angle(phase_delta_deg, freq, spacing),
            peak_dbfs: measured?,
        };
        self.logger.record_step(phase_delta_deg, &sample);
        Ok(sample)
    }

    pub fn shutdown(&mut self) {
        self.front_end.shutdown();
        self.pool.reset();
    }

    pub fn into_front_end(self) -> F {
        self.front_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::{GpioRouting, HardwareError, HardwareResult, SignalSource};
    use crate::prelude::{CapturedBuffer, SweepError, ELEMENT_COUNT};
    use num_complex::{Complex32, Complex64};
    use std::f64::consts::PI;

    /// Replays one fixed capture and records every phase it is given.
    struct ScriptedFrontEnd {
        capture: CapturedBuffer,
        initialized: bool,
        phases: Vec<f64>,
        captures: usize,
        fail_capture_at: Option<usize>,
        shut_down: bool,
    }

    impl ScriptedFrontEnd {
        fn new(capture: CapturedBuffer) -> Self {
            Self {
                capture,
                initialized: false,
                phases: Vec::new(),
                captures: 0,
                fail_capture_at: None,
                shut_down: false,
            }
        }
    }

    impl PhaserFrontEnd for ScriptedFrontEnd {
        fn initialize(&mut self, _settings: &HardwareSettings) -> HardwareResult<()> {
            self.initialized = true;
            Ok(())
        }

        fn program_phase(
            &mut self,
            phase_delta_deg: f64,
            phase_step_deg: f64,
            calibration_deg: &[f64; ELEMENT_COUNT],
        ) -> HardwareResult<()> {
            if !self.initialized {
                return Err(HardwareError::NotInitialized);
            }
            assert_eq!(phase_step_deg, 2.8125);
            assert_eq!(calibration_deg[1], 12.0);
            self.phases.push(phase_delta_deg);
            Ok(())
        }

        fn capture(&mut self) -> HardwareResult<CapturedBuffer> {
            if self.fail_capture_at == Some(self.captures) {
                return Err(HardwareError::Device("rx timeout".into()));
            }
            self.captures += 1;
            Ok(self.capture.clone())
        }

        fn shutdown(&mut self) {
            self.shut_down = true;
        }
    }

    const LEN: usize = 256;

    fn tone_capture(bin: f64, amplitude: f32) -> CapturedBuffer {
        let channel = |scale: f32| -> Vec<Complex32> {
            (0..LEN)
                .map(|n| {
                    let phase = 2.0 * PI * bin * n as f64 / LEN as f64;
                    Complex32::from_polar(amplitude * scale, phase as f32)
                })
                .collect()
        };
        CapturedBuffer::new(channel(1.0), channel(0.5))
    }

    fn config() -> SweepConfiguration {
        let mut calibration_deg = [0.0; ELEMENT_COUNT];
        calibration_deg[1] = 12.0;
        SweepConfiguration {
            calibration_deg,
            ..Default::default()
        }
    }

    fn settings() -> HardwareSettings {
        HardwareSettings {
            signal_source: SignalSource::Hb100,
            sample_rate_hz: 0.6e6,
            tx_lo_hz: 2.2e9,
            rx_lo_hz: 2.2e9,
            mixer_lo_hz: 12.7e9,
            rx_gain_db: 20.0,
            tx_gain_db: -3.0,
            buffer_size: LEN,
            element_gains: [100; ELEMENT_COUNT],
            routing: GpioRouting::for_source(SignalSource::Hb100),
        }
    }

    /// Direct DFT evaluation of the windowed, normalized, centred dBFS spectrum.
    fn reference_peak_dbfs(samples: &[Complex64]) -> f64 {
        let n = samples.len();
        let window: Vec<f64> = (0..n)
            .map(|k| 0.54 - 0.46 * (2.0 * PI * k as f64 / (n - 1) as f64).cos())
            .collect();
        let window_sum: f64 = window.iter().sum();
        (0..n)
            .map(|bin| {
                let acc: Complex64 = samples
                    .iter()
                    .zip(window.iter())
                    .enumerate()
                    .map(|(k, (s, w))| {
                        s * w * Complex64::from_polar(1.0, -2.0 * PI * (bin * k) as f64 / n as f64)
                    })
                    .sum();
                20.0 * (acc.norm() / window_sum / 2048.0).log10()
            })
            .fold(f64::NEG_INFINITY, f64::max)
    }

    #[test]
    fn sweep_produces_monotonic_181_point_pattern() {
        let front_end = ScriptedFrontEnd::new(tone_capture(10.0, 200.0));
        let mut driver = SweepDriver::new(config(), front_end).unwrap();
        driver.initialize(&settings()).unwrap();
        let pattern = driver.run().unwrap();

        assert_eq!(pattern.len(), 181);
        let angles = pattern.angles();
        assert!(angles.windows(2).all(|pair| pair[0] <= pair[1]));
        // asin is steep near 1, so the round trip lands within ~1e-6 deg of the ends
        assert!((angles[0] + 90.0).abs() < 1e-4);
        assert!((angles[180] - 90.0).abs() < 1e-4);
        assert_eq!(driver.metrics().snapshot(), (181, 0));
    }

    #[test]
    fn reported_angle_is_recomputed_from_programmed_phase() {
        let front_end = ScriptedFrontEnd::new(tone_capture(3.0, 50.0));
        let mut driver = SweepDriver::new(config(), front_end).unwrap();
        driver.initialize(&settings()).unwrap();
        let pattern = driver.run().unwrap();
        let front_end = driver.into_front_end();

        assert_eq!(front_end.phases.len(), pattern.len());
        for (phase, sample) in front_end.phases.iter().zip(pattern.samples.iter()) {
            assert_eq!(
                sample.angle_deg,
                phase_to_steer_angle(*phase, 10.5e9, 0.014)
            );
        }
        assert!(front_end.phases[0] < 0.0);
        assert!(front_end.phases[180] > 0.0);
    }

    #[test]
    fn peak_matches_reference_dft_for_offset_tone() {
        let capture = tone_capture(-37.0, 120.0);
        let expected = reference_peak_dbfs(&capture.summed().unwrap());

        let cfg = SweepConfiguration {
            start_deg: 0.0,
            stop_deg: 0.0,
            ..config()
        };
        let mut driver = SweepDriver::new(cfg, ScriptedFrontEnd::new(capture)).unwrap();
        driver.initialize(&settings()).unwrap();
        let pattern = driver.run().unwrap();

        assert_eq!(pattern.len(), 1);
        let measured = pattern.samples[0].peak_dbfs;
        assert!(((measured - expected) / expected).abs() < 1e-6);
        // 1.5 * 120 codes on a bin centre
        assert!((measured - 20.0 * (180.0f64 / 2048.0).log10()).abs() < 1e-3);
    }

    #[test]
    fn capture_failure_aborts_sweep() {
        let mut front_end = ScriptedFrontEnd::new(tone_capture(1.0, 10.0));
        front_end.fail_capture_at = Some(5);
        let mut driver = SweepDriver::new(config(), &mut front_end).unwrap();
        driver.initialize(&settings()).unwrap();

        let err = driver.run().unwrap_err();
        assert!(matches!(err, SweepError::Hardware(HardwareError::Device(_))));
        assert_eq!(driver.metrics().snapshot(), (5, 1));
        driver.shutdown();
        drop(driver);
        assert_eq!(front_end.captures, 5);
        assert!(front_end.shut_down);
    }

    #[test]
    fn mismatched_channels_count_as_sweep_error() {
        let mut capture = tone_capture(1.0, 10.0);
        capture.channels[1].truncate(LEN - 1);
        let mut driver = SweepDriver::new(config(), ScriptedFrontEnd::new(capture)).unwrap();
        driver.initialize(&settings()).unwrap();

        assert!(matches!(driver.run(), Err(SweepError::InvalidInput(_))));
        assert_eq!(driver.metrics().snapshot(), (0, 1));
    }

    #[test]
    fn run_without_initialize_propagates_hardware_error() {
        let front_end = ScriptedFrontEnd::new(tone_capture(1.0, 10.0));
        let mut driver = SweepDriver::new(config(), front_end).unwrap();
        assert!(matches!(
            driver.run(),
            Err(SweepError::Hardware(HardwareError::NotInitialized))
        ));
    }

    #[test]
    fn invalid_settings_never_reach_the_front_end() {
        let mut front_end = ScriptedFrontEnd::new(tone_capture(1.0, 10.0));
        let mut driver = SweepDriver::new(config(), &mut front_end).unwrap();
        let bad = HardwareSettings {
            buffer_size: 0,
            ..settings()
        };
        assert!(driver.initialize(&bad).is_err());
        drop(driver);
        assert!(!front_end.initialized);
    }

    #[test]
    fn invalid_configuration_is_rejected_up_front() {
        let cfg = SweepConfiguration {
            signal_freq_hz: -1.0,
            ..config()
        };
        assert!(matches!(
            SweepDriver::new(cfg, ScriptedFrontEnd::new(CapturedBuffer::default())),
            Err(SweepError::InvalidConfiguration(_))
        ));
    }
}
