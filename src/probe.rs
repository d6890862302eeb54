//! Bitrate probe
//!
//! Determines a source file's encoded bitrate by invoking the external
//! analysis tool (`sox --i -B <file>`) and parsing its single
//! numeric-with-unit line, e.g. `128k`. Probing is best-effort: the pipeline
//! substitutes the configured fallback bitrate when it fails.

use std::path::Path;

use tokio::process::Command;

use crate::config::BroadcastConfig;
use crate::error::{Error, Result};

/// Probe `path` for its bitrate in bits/s
pub async fn probe(config: &BroadcastConfig, path: &Path) -> Result<u64> {
    let output = Command::new(&config.probe_program)
        .args(["--i", "-B"])
        .arg(path)
        .output()
        .await
        .map_err(|e| Error::ProbeFailed(format!("{}: {}", config.probe_program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::ProbeFailed(format!(
            "{} ({})",
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_bitrate(&stdout)
        .ok_or_else(|| Error::ProbeFailed(format!("unparsable output {:?}", stdout.trim())))
}

/// Parse a bitrate token such as `128k`, `1.41M` or `96000` into bits/s
fn parse_bitrate(raw: &str) -> Option<u64> {
    let token = raw.trim();

    let (digits, multiplier) = if let Some(head) = token.strip_suffix(|c| c == 'k' || c == 'K') {
        (head, 1_000.0)
    } else if let Some(head) = token.strip_suffix(|c| c == 'm' || c == 'M') {
        (head, 1_000_000.0)
    } else {
        (token, 1.0)
    };

    let value: f64 = digits.parse().ok()?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }

    Some((value * multiplier) as u64)
}
