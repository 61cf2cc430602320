//! CLI command implementations.

pub mod config;
pub mod init;
pub mod inspect;
pub mod transcode;

use anyhow::{Context, Result};
use organelle::prelude::{Format, SnapshotNode};
use organelle::reflect::transcoder::decode_checked;
use std::path::Path;

use crate::config::Config as ProjectConfig;

/// Explicit format, else the file extension, else the configured default.
pub fn resolve_format(explicit: Option<Format>, file: &Path, config: &ProjectConfig) -> Format {
    explicit
        .or_else(|| {
            file.extension()
                .and_then(|ext| ext.to_str())
                .and_then(Format::from_extension)
        })
        .unwrap_or(config.transcode.default_format)
}

/// Read and decode a snapshot document.
pub fn read_snapshot(file: &Path, format: Format) -> Result<SnapshotNode> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read snapshot: {}", file.display()))?;
    let transcoder = format.transcoder(false);
    let node = decode_checked(transcoder.as_ref(), &text)
        .with_context(|| format!("Failed to decode {} as {}", file.display(), format))?;
    tracing::debug!(file = %file.display(), %format, nodes = node.node_count(), "snapshot decoded");
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_resolution_order() {
        let mut config = ProjectConfig::default();
        config.transcode.default_format = Format::Json;

        assert_eq!(resolve_format(Some(Format::Kv), Path::new("a.json"), &config), Format::Kv);
        assert_eq!(resolve_format(None, Path::new("a.kv"), &config), Format::Kv);
        assert_eq!(resolve_format(None, Path::new("snapshot"), &config), Format::Json);
    }

    #[test]
    fn unreadable_snapshots_report_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.kv");
        std::fs::write(&path, "no separator here").unwrap();

        let err = read_snapshot(&path, Format::Kv).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.kv"));
        assert!(read_snapshot(&dir.path().join("missing.kv"), Format::Kv).is_err());
    }
}
