//! Optional signal frequency left behind by an earlier HB100 search.

use anyhow::{bail, Context};
use log::info;
use phasercore::hardware::SignalSource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub const DEFAULT_FREQ_FILE: &str = "hb100_freq_val.json";

#[derive(Debug, Serialize, Deserialize)]
struct SignalFreqRecord {
    signal_freq_hz: f64,
}

/// `Ok(None)` when the file does not exist; malformed content is an error.
pub fn lookup_signal_freq(path: &Path) -> anyhow::Result<Option<f64>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("reading {}", path.display()));
        }
    };
    let record: SignalFreqRecord = serde_json::from_str(&contents)
        .with_context(|| format!("parsing signal frequency from {}", path.display()))?;
    if !record.signal_freq_hz.is_finite() || record.signal_freq_hz <= 0.0 {
        bail!(
            "{} holds an invalid signal frequency {}",
            path.display(),
            record.signal_freq_hz
        );
    }
    Ok(Some(record.signal_freq_hz))
}

/// Signal frequency for this run; only the HB100 source consults `path`.
pub fn resolve_signal_freq(
    source: SignalSource,
    path: &Path,
    default_hz: f64,
) -> anyhow::Result<f64> {
    if source != SignalSource::Hb100 {
        return Ok(default_hz);
    }
    match lookup_signal_freq(path)? {
        Some(freq) => {
            info!("Found signal freq file, {} GHz", freq / 1e9);
            Ok(freq)
        }
        None => {
            info!("No signal freq found, keeping at {} GHz", default_hz / 1e9);
            Ok(default_hz)
        }
    }
}
