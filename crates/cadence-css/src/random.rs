//! Uniform random source backing `rand()`.

use cadence_common::warning::warn_once;

/// A uniform random number in `[0, 1)` drawn from the OS entropy source.
///
/// Falls back to `0.5` (and warns once) if the entropy source is unavailable.
#[must_use]
pub fn uniform() -> f64 {
    let mut bytes = [0_u8; 8];
    match getrandom::fill(&mut bytes) {
        Ok(()) => unit_interval(u64::from_le_bytes(bytes)),
        Err(err) => {
            warn_once("CSS", &format!("random source unavailable: {err}"));
            0.5
        }
    }
}

/// Map 64 random bits onto `[0, 1)` using the top 53 bits.
#[allow(clippy::cast_precision_loss)]
fn unit_interval(bits: u64) -> f64 {
    (bits >> 11) as f64 / (1_u64 << 53) as f64
}
