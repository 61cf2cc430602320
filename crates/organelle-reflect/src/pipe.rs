//! Shorthand for moving whole objects through a transcoder.

use crate::transcoder::Transcoder;
use organelle_core::snapshot::Reflect;

/// Capture `object` and encode it in one step.
pub fn pipe<R, T>(object: &R, transcoder: &T) -> String
where
    R: Reflect + ?Sized,
    T: Transcoder + ?Sized,
{
    transcoder.encode(&object.capture())
}

/// Decode `text` and restore `object` from it.
///
/// Returns `false`, leaving the object untouched, when the text does not
/// decode.
pub fn restore_from<R, T>(object: &mut R, transcoder: &T, text: &str) -> bool
where
    R: Reflect + ?Sized,
    T: Transcoder + ?Sized,
{
    match transcoder.decode(text) {
        Some(node) => {
            object.restore(&node);
            true
        }
        None => {
            tracing::debug!(transcoder = transcoder.name(), "nothing restored, input did not decode");
            false
        }
    }
}
