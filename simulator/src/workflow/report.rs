use anyhow::Context;
use phasercore::prelude::BeamPattern;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Writes the pattern as CSV for `.csv` paths and as pretty JSON otherwise.
pub fn write_report(path: &Path, pattern: &BeamPattern) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory {}", parent.display()))?;
        }
    }

    let is_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    let body = if is_csv {
        render_csv(pattern)
    } else {
        serde_json::to_string_pretty(pattern).context("serializing beam pattern")?
    };

    let mut file = fs::File::create(path)
        .with_context(|| format!("creating report {}", path.display()))?;
    file.write_all(body.as_bytes())
        .with_context(|| format!("writing report {}", path.display()))?;
    Ok(())
}

fn render_csv(pattern: &BeamPattern) -> String {
    let mut out = String::from("angle_deg,peak_dbfs\n");
    for sample in &pattern.samples {
        out.push_str(&format!("{:.4},{:.4}\n", sample.angle_deg, sample.peak_dbfs));
    }
    out
}
