//! Burst tiling
//!
//! Places copies of a short burst into a silent buffer at a fixed interval.

use crate::engine::buffer::AudioBuffer;
use crate::error::Result;

/// Start offsets (ms) for bursts placed every `interval_ms`
///
/// Placement starts at 0 and continues while the position is below
/// `duration_ms - tail_guard_ms`. A zero guard allows a final burst that
/// runs past the end; a guard equal to the burst length keeps every burst
/// whole.
pub fn burst_positions(duration_ms: i64, interval_ms: i64, tail_guard_ms: i64) -> Vec<i64> {
    let interval = interval_ms.max(1);
    let limit = duration_ms - tail_guard_ms;
    (0..)
        .map(|n: i64| n * interval)
        .take_while(|&position| position < limit)
        .collect()
}

/// Tile `burst` into a silent buffer of `duration_ms`
///
/// The silent canvas takes the burst's sample rate and channel count.
/// Bursts that run past the canvas end are cut there.
pub fn tile_bursts(
    burst: &AudioBuffer,
    duration_ms: i64,
    interval_ms: i64,
    tail_guard_ms: i64,
) -> Result<AudioBuffer> {
    let mut canvas = AudioBuffer::silent(duration_ms, burst.sample_rate(), burst.channels());
    for position in burst_positions(duration_ms, interval_ms, tail_guard_ms) {
        canvas.mix_at(burst, position)?;
    }
    Ok(canvas)
}
