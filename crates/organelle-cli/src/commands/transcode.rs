//! Convert a snapshot document between formats.

use anyhow::{Context, Result};
use colored::Colorize;
use organelle::prelude::{Format, SnapshotNode};
use organelle::reflect::transcoder::encode_checked;
use std::path::Path;

use super::{read_snapshot, resolve_format};
use crate::config::Config;

pub fn run(config: &Config, file: &str, from: Option<Format>, to: Format, output: Option<&str>) -> Result<()> {
    let path = Path::new(file);
    let from = resolve_format(from, path, config);
    let node = read_snapshot(path, from)?;
    let text = encode(&node, to, config.transcode.pretty)?;

    match output {
        Some(out) => {
            std::fs::write(out, format!("{}\n", text))
                .with_context(|| format!("Failed to write {}", out))?;
            eprintln!("{} {} ({}) → {} ({})", "✓".green(), file, from, out, to);
        }
        None => println!("{}", text),
    }
    Ok(())
}

/// Encode `node`, failing if any node has no representation in `to`.
pub fn encode(node: &SnapshotNode, to: Format, pretty: bool) -> Result<String> {
    let transcoder = to.transcoder(pretty);
    encode_checked(transcoder.as_ref(), node)
        .with_context(|| format!("Snapshot cannot be written as {}", to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use organelle::prelude::{NodeKind, Value};

    #[test]
    fn key_value_file_converts_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cell.kv");
        let output = dir.path().join("cell.json");
        std::fs::write(&input, "cell.energy=42\ncell.tags[0]=motile\n").unwrap();

        let mut config = Config::default();
        config.transcode.pretty = false;
        run(
            &config,
            input.to_str().unwrap(),
            None,
            Format::Json,
            Some(output.to_str().unwrap()),
        )
        .unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written.trim_end(), r#"{"cell":{"energy":42,"tags":["motile"]}}"#);
    }

    #[test]
    fn undecodable_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cell.json");
        std::fs::write(&input, "{ not json").unwrap();

        let result = run(&Config::default(), input.to_str().unwrap(), None, Format::Kv, None);
        assert!(result.is_err());
    }

    #[test]
    fn unencodable_nodes_are_an_error() {
        let node = SnapshotNode::group(
            "cell",
            vec![SnapshotNode::new("marker", NodeKind::EndList, Value::Null)],
        );
        assert!(encode(&node, Format::Kv, true).is_err());
        assert!(encode(&node, Format::Json, true).is_err());
        assert_eq!(encode(&SnapshotNode::value("n", 42), Format::Kv, true).unwrap(), "n=42");
    }
}
