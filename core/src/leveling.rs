//! Experience curve.
//!
//! A player at level `L` has collected at least `φ^L` experience, where `φ`
//! is the golden ratio. Level zero is the floor, so a player without any
//! experience sits at level zero.

/// Growth factor between consecutive level thresholds.
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Experience required to reach `level`.
#[must_use]
pub fn threshold(level: u32) -> f64 {
    GOLDEN_RATIO.powi(level.min(i32::MAX as u32) as i32)
}

/// Experience required to reach the level after `level`, rounded up.
#[must_use]
pub fn next_threshold(level: u32) -> u64 {
    threshold(level.saturating_add(1)).ceil() as u64
}

/// Largest level whose threshold does not exceed `experience`.
#[must_use]
pub fn level_for_experience(experience: u64) -> u32 {
    if experience == 0 {
        return 0;
    }
    let total = experience as f64;
    let estimate = (total.ln() / GOLDEN_RATIO.ln()).floor().max(0.0);
    let mut level = estimate as u32;
    // Floating point logarithms can land one step off near exact powers.
    while level > 0 && threshold(level) > total {
        level -= 1;
    }
    while threshold(level + 1) <= total {
        level += 1;
    }
    level
}

/// Reports whether `experience` has reached the threshold of the next level.
#[must_use]
pub fn crossed_next_threshold(experience: u64, level: u32) -> bool {
    experience as f64 >= threshold(level.saturating_add(1))
}
