//! Organelle Reflect Prelude.

pub use crate::format::Format;
pub use crate::json::JsonTranscoder;
pub use crate::key_value::KeyValueTranscoder;
pub use crate::pipe::{pipe, restore_from};
pub use crate::transcoder::{decode_checked, encode_checked, Path, Segment, Transcoder, ENCODE_FAILURE};
