//! Ground decoration scattered across the world.

use glam::Vec2;
use horde_rendering::{Color, DecorRect};
use rand::Rng;

/// Number of squares generated per session.
pub(crate) const DECOR_COUNT: usize = 4096;

const MIN_SIZE: f32 = 400.0;
const MAX_SIZE: f32 = 800.0;
const BASE_GREEN: i32 = 128;
const GREEN_SPREAD: i32 = 64;

/// Scatters green squares with centres inside the world square.
pub(crate) fn generate<R: Rng>(rng: &mut R, half_extent: f32) -> Vec<DecorRect> {
    (0..DECOR_COUNT)
        .map(|_| {
            let center = Vec2::new(
                rng.gen_range(-half_extent..=half_extent),
                rng.gen_range(-half_extent..=half_extent),
            );
            let size = rng.gen_range(MIN_SIZE..=MAX_SIZE);
            let green = BASE_GREEN + rng.gen_range(-GREEN_SPREAD..=GREEN_SPREAD);
            let green = green.clamp(0, 255) as u8;
            DecorRect::centered(center, size, Color::from_rgb_u8(0, green, 0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn squares_stay_within_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let decor = generate(&mut rng, 10_000.0);

        assert_eq!(decor.len(), DECOR_COUNT);
        for rect in &decor {
            assert_eq!(rect.size.x, rect.size.y);
            assert!((MIN_SIZE..=MAX_SIZE).contains(&rect.size.x));
            let center = rect.position + rect.size / 2.0;
            assert!(center.x.abs() <= 10_000.0 + 1.0e-2);
            assert!(center.y.abs() <= 10_000.0 + 1.0e-2);
            assert_eq!(rect.color.red, 0.0);
            assert_eq!(rect.color.blue, 0.0);
            assert!((64.0 / 255.0..=192.0 / 255.0).contains(&rect.color.green));
        }
    }

    #[test]
    fn same_seed_same_ground() {
        let first = generate(&mut ChaCha8Rng::seed_from_u64(11), 500.0);
        let second = generate(&mut ChaCha8Rng::seed_from_u64(11), 500.0);
        assert_eq!(first, second);
    }
}
