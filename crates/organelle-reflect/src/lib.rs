//! # Organelle Reflect
//!
//! Text formats for snapshot trees. Objects describe their state with
//! [`Reflect`](organelle_core::snapshot::Reflect); a [`Transcoder`]
//! turns the resulting tree into text and back.
//!
//! - [`key_value`] - one `path=value` line per leaf
//! - [`json`] - nested JSON via `serde_json`
//! - [`pipe`] - capture-and-encode / decode-and-restore in one call
//!
//! ## Quick Start
//!
//! ```rust
//! use organelle_core::snapshot::SnapshotNode;
//! use organelle_reflect::prelude::*;
//!
//! let node = SnapshotNode::value("n", 42);
//! assert_eq!(KeyValueTranscoder::new().encode(&node), "n=42");
//! assert_eq!(JsonTranscoder::new().encode(&node), r#"{"n":42}"#);
//! ```

pub mod format;
pub mod json;
pub mod key_value;
pub mod pipe;
pub mod prelude;
pub mod transcoder;
