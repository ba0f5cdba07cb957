use std::sync::atomic::{AtomicU32, Ordering};

use super::ToastId;

static FALLBACK_SEQUENCE: AtomicU32 = AtomicU32::new(1);

/// Draws a fresh id from the OS random source, rendered as a decimal `u32`.
///
/// Ids only need to be unique within a live session. If the random source is
/// unavailable a per-process sequence is used instead.
pub fn generate_id() -> ToastId {
    let mut bytes = [0_u8; 4];
    match getrandom::fill(&mut bytes) {
        Ok(()) => ToastId::new(u32::from_ne_bytes(bytes).to_string()),
        Err(err) => {
            tracing::warn!(%err, "random source unavailable; using sequential toast id");
            ToastId::new(FALLBACK_SEQUENCE.fetch_add(1, Ordering::Relaxed).to_string())
        }
    }
}
