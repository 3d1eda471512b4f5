// THEORY:
// Ephemeral particles for the two animated phases of the water cycle. Vapor
// rises from the ocean when the scene gets hot; rain falls from the cloud
// when it is shaken. Both kinds are plain data integrated by the state
// machine once per frame; spawning is the only randomized step, and it draws
// from an injected RNG so tests can pin the stream down with a seed.

use rand::Rng;

use crate::core_modules::scene::SceneObject;

/// Number of vapor particles spawned by one evaporation trigger.
pub const VAPOR_BATCH_SIZE: usize = 25;
/// Vapor particles freeze in place once they rise above this y.
pub const VAPOR_FREEZE_Y: f32 = 120.0;
/// Horizontal margin kept clear of the frame edges when spawning vapor.
const VAPOR_X_MARGIN: i32 = 80;

/// Concurrent raindrop cap.
pub const MAX_RAIN_DROPS: usize = 30;
/// Raindrops spawned per frame while an episode is active.
pub const RAIN_DROPS_PER_FRAME: usize = 2;
/// Horizontal inset from the cloud edges when spawning raindrops.
const RAIN_X_INSET: i32 = 20;

/// A rising vapor puff. Once `stuck`, it stays rendered but is no longer
/// integrated.
#[derive(Debug, Clone, Copy)]
pub struct VaporParticle {
    pub x: f32,
    pub y: f32,
    pub vy: f32,
    pub radius: i32,
    pub stuck: bool,
}

impl VaporParticle {
    /// Spawns one evaporation batch just above the ocean's top edge.
    pub fn spawn_batch<R: Rng>(rng: &mut R, frame_width: u32, ocean_top: i32) -> Vec<VaporParticle> {
        let hi = (frame_width as i32 - VAPOR_X_MARGIN).max(VAPOR_X_MARGIN + 1);
        (0..VAPOR_BATCH_SIZE)
            .map(|_| VaporParticle {
                x: rng.gen_range(VAPOR_X_MARGIN..=hi) as f32,
                y: (ocean_top - rng.gen_range(5..=25)) as f32,
                vy: rng.gen_range(4.0..5.0),
                radius: rng.gen_range(8..=12),
                stuck: false,
            })
            .collect()
    }

    /// Advances the particle one frame: rise until the freeze line, then
    /// hold position.
    pub fn rise(&mut self) {
        if self.stuck {
            return;
        }
        self.y -= self.vy;
        if self.y < VAPOR_FREEZE_Y {
            self.stuck = true;
        }
    }
}

/// A falling raindrop.
#[derive(Debug, Clone, Copy)]
pub struct RainDrop {
    pub x: f32,
    pub y: f32,
    pub vy: f32,
}

impl RainDrop {
    /// Spawns one drop along the cloud's lower edge.
    pub fn spawn<R: Rng>(rng: &mut R, cloud: &SceneObject) -> RainDrop {
        let hi = (cloud.width as i32 - RAIN_X_INSET).max(RAIN_X_INSET + 1);
        RainDrop {
            x: (cloud.x + rng.gen_range(RAIN_X_INSET..=hi)) as f32,
            y: (cloud.y + cloud.height as i32 - 10) as f32,
            vy: rng.gen_range(9.0..13.0),
        }
    }

    pub fn fall(&mut self) {
        self.y += self.vy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::scene::ObjectKind;
    use image::RgbaImage;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;

    #[test]
    fn vapor_batch_spawns_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let batch = VaporParticle::spawn_batch(&mut rng, 1280, 518);

        assert_eq!(batch.len(), VAPOR_BATCH_SIZE);
        for v in &batch {
            assert!(v.x >= 80.0 && v.x <= 1200.0);
            assert!(v.y >= (518 - 25) as f32 && v.y <= (518 - 5) as f32);
            assert!(v.vy >= 4.0 && v.vy < 5.0);
            assert!(v.radius >= 8 && v.radius <= 12);
            assert!(!v.stuck);
        }
    }

    #[test]
    fn vapor_rises_then_freezes() {
        let mut v = VaporParticle { x: 0.0, y: 130.0, vy: 4.0, radius: 8, stuck: false };
        v.rise();
        assert_eq!(v.y, 126.0);
        assert!(!v.stuck);

        v.rise();
        v.rise();
        assert!(v.y < VAPOR_FREEZE_Y);
        assert!(v.stuck);

        let frozen_y = v.y;
        v.rise();
        assert_eq!(v.y, frozen_y);
    }

    #[test]
    fn raindrops_spawn_along_the_cloud_edge() {
        let mut rng = StdRng::seed_from_u64(7);
        let cloud = SceneObject::new(
            ObjectKind::Cloud,
            Arc::new(RgbaImage::new(240, 120)),
            400,
            30,
            true,
        );

        for _ in 0..50 {
            let drop = RainDrop::spawn(&mut rng, &cloud);
            assert!(drop.x >= 420.0 && drop.x <= 620.0);
            assert_eq!(drop.y, (30 + 120 - 10) as f32);
            assert!(drop.vy >= 9.0 && drop.vy < 13.0);
        }
    }
}
