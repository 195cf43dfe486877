use anyhow::Context;
use clap::Parser;
use generator::scene::SceneConfig;
use gui_bridge::bridge::GuiBridge;
use gui_bridge::model::VisualizationModel;
use phasercore::hardware::SignalSource;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::calibration::DEFAULT_FREQ_FILE;
use workflow::config::PhaserConfig;
use workflow::report::write_report;
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Phaser receive beam sweep")]
struct Args {
    /// YAML file with frequencies, gains and calibration offsets
    #[arg(long, default_value = "phaser.yaml")]
    config: PathBuf,
    /// Signal source: hb100, out1 or out2 (overrides the config file)
    #[arg(long)]
    signal_source: Option<SignalSource>,
    /// Signal frequency stored by an earlier HB100 search
    #[arg(long, default_value = DEFAULT_FREQ_FILE)]
    freq_file: PathBuf,
    /// Direction of the simulated source, degrees off boresight
    #[arg(long, allow_hyphen_values = true)]
    source_angle: Option<f64>,
    /// Simulated receiver noise, ADC codes
    #[arg(long)]
    noise: Option<f64>,
    #[arg(long)]
    seed: Option<u64>,
    /// Write the pattern here (.csv or .json)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Keep the GUI bridge alive for the visualizer
    #[arg(long, default_value_t = false)]
    serve: bool,
}

impl Args {
    fn scene(&self) -> SceneConfig {
        let defaults = SceneConfig::default();
        SceneConfig {
            source_angle_deg: self.source_angle.unwrap_or(defaults.source_angle_deg),
            noise_codes: self.noise.unwrap_or(defaults.noise_codes),
            seed: self.seed.unwrap_or(defaults.seed),
            ..defaults
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = PhaserConfig::load(&args.config)?;
    if let Some(source) = args.signal_source {
        config.signal_source = source;
    }
    let scene = args.scene();

    let runner = Runner::new(config, args.freq_file.clone());
    let outcome = runner.execute(&scene)?;
    let pattern = &outcome.pattern;

    println!(
        "Beam sweep -> {} angles at {:.4} GHz ({} source), steps {}, errors {}",
        pattern.len(),
        outcome.signal_freq_hz / 1e9,
        runner.config().signal_source,
        outcome.steps,
        outcome.errors
    );
    if let Some(peak) = pattern.peak() {
        println!(
            "Peak {:.2} dBFS at {:.2} deg",
            peak.peak_dbfs, peak.angle_deg
        );
    }
    if let Some(width) = pattern.half_power_beamwidth() {
        println!("-3 dB beamwidth {:.1} deg", width);
    }

    if let Some(path) = args.output.as_ref() {
        write_report(path, pattern)?;
        println!("Pattern written to {}", path.display());
    }

    if args.serve {
        let gui_bridge = GuiBridge::new();
        gui_bridge.serve(Arc::new(runner.clone()));
        gui_bridge.publish(&VisualizationModel::from_pattern(pattern, &scene));
        gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
