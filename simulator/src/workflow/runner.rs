use crate::generator::phaser::SimulatedPhaser;
use crate::generator::scene::SceneConfig;
use crate::workflow::calibration::resolve_signal_freq;
use crate::workflow::config::PhaserConfig;
use anyhow::Context;
use phasercore::prelude::BeamPattern;
use phasercore::SweepDriver;
use std::path::PathBuf;

pub struct SweepOutcome {
    pub pattern: BeamPattern,
    pub signal_freq_hz: f64,
    pub steps: usize,
    pub errors: usize,
}

/// Initialize, sweep, shut down: one complete measurement run.
#[derive(Clone)]
pub struct Runner {
    config: PhaserConfig,
    freq_file: PathBuf,
}

impl Runner {
    pub fn new(config: PhaserConfig, freq_file: PathBuf) -> Self {
        Self { config, freq_file }
    }

    pub fn config(&self) -> &PhaserConfig {
        &self.config
    }

    pub fn execute(&self, scene: &SceneConfig) -> anyhow::Result<SweepOutcome> {
        let signal_freq_hz = resolve_signal_freq(
            self.config.signal_source,
            &self.freq_file,
            self.config.signal_freq_hz,
        )?;
        let sweep_config = self.config.to_sweep_configuration(signal_freq_hz);
        let settings = self.config.to_hardware_settings(signal_freq_hz);

        let mut phaser =
            SimulatedPhaser::new(scene.clone(), signal_freq_hz, self.config.element_spacing_m);
        let mut driver =
            SweepDriver::new(sweep_config, &mut phaser).context("configuring beam sweep")?;
        driver
            .initialize(&settings)
            .with_context(|| {
                format!(
                    "initializing Phaser at {} with SDR at {}",
                    self.config.rpi_uri, self.config.sdr_uri
                )
            })?;
        let pattern = driver.run().context("running beam sweep");
        let (steps, errors) = driver.metrics().snapshot();
        driver.shutdown();

        Ok(SweepOutcome {
            pattern: pattern?,
            signal_freq_hz,
            steps,
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phasercore::hardware::SignalSource;
    use std::fs;
    use tempfile::tempdir;

    fn runner_in(dir: &std::path::Path, config: PhaserConfig) -> Runner {
        Runner::new(config, dir.join("hb100_freq_val.json"))
    }

    #[test]
    fn runner_executes_full_sweep() {
        let dir = tempdir().unwrap();
        let runner = runner_in(dir.path(), PhaserConfig::default());
        let outcome = runner.execute(&SceneConfig::default()).unwrap();

        assert_eq!(outcome.pattern.len(), 181);
        assert_eq!(outcome.steps, 181);
        assert_eq!(outcome.errors, 0);
        assert_eq!(outcome.signal_freq_hz, 10.5e9);
    }

    #[test]
    fn beam_peaks_toward_the_source() {
        let dir = tempdir().unwrap();
        let runner = runner_in(dir.path(), PhaserConfig::default());
        for source_angle_deg in [-35.0, 0.0, 20.0] {
            let scene = SceneConfig {
                source_angle_deg,
                ..SceneConfig::default()
            };
            let pattern = runner.execute(&scene).unwrap().pattern;
            let peak = pattern.peak().unwrap();
            assert!(
                (peak.angle_deg - source_angle_deg).abs() <= 3.0,
                "source {source_angle_deg} peaked at {}",
                peak.angle_deg
            );
            assert!(pattern.half_power_beamwidth().unwrap() > 5.0);
        }
    }

    #[test]
    fn stored_hb100_frequency_feeds_the_sweep() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("hb100_freq_val.json"),
            r#"{"signal_freq_hz": 10400000000.0}"#,
        )
        .unwrap();
        let runner = runner_in(dir.path(), PhaserConfig::default());
        let outcome = runner.execute(&SceneConfig::default()).unwrap();
        assert_eq!(outcome.signal_freq_hz, 10.4e9);
        assert_eq!(outcome.pattern.signal_freq_hz, 10.4e9);
    }

    #[test]
    fn invalid_hardware_settings_abort_the_run() {
        let dir = tempdir().unwrap();
        let config = PhaserConfig {
            signal_source: SignalSource::Out1,
            buffer_size: 0,
            ..PhaserConfig::default()
        };
        let runner = runner_in(dir.path(), config);
        let err = runner.execute(&SceneConfig::default()).err().unwrap();
        assert!(format!("{err:#}").contains("buffer size"));
    }
}
