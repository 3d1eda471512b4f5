// THEORY:
// The `InteractionState` is the heart of the engine. It owns every piece of
// mutable simulation state (temperature, vapor, cloud, rain, shake energy)
// and advances all of it exactly one frame at a time, given the frame and the
// gesture signal derived from it.
//
// Key architectural principles:
// 1.  **Single owner, no globals**: all state lives in this one value, passed
//     by reference into the per-frame call. The caller decides whether there
//     is one simulation or many; nothing here is shared.
// 2.  **Thermal cycle as a state machine**: evaporation (hot ocean spawns
//     vapor), condensation (cold air turns vapor into the cloud), and rain
//     (shaking the grabbed cloud) are one-way transitions gated on the
//     temperature scalar. Condensation is deliberately one-shot: once the
//     cloud has formed, `cloud_ready` never resets for the session.
// 3.  **Rendering is part of the update**: vapor and rain draw inline during
//     their own integration passes, *before* the ocean/sun/cloud layer. The
//     resulting z-order (particles can be occluded by the ocean strip) is
//     part of the observable contract and must not be "fixed."
// 4.  **Injected time and randomness**: the wall clock arrives as an argument
//     and the RNG is seedable, so every transition (including the 3-second
//     rain cut-off) is reproducible in tests.

use std::sync::Arc;
use std::time::{Duration, Instant};

use image::{Rgb, RgbImage};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::core_modules::compositor;
use crate::core_modules::draw;
use crate::core_modules::hand_tracker::GestureSignal;
use crate::core_modules::particles::{
    MAX_RAIN_DROPS, RAIN_DROPS_PER_FRAME, RainDrop, VaporParticle,
};
use crate::core_modules::scene::{ObjectKind, SceneObject};
use crate::core_modules::sprite_store::SpriteStore;
use crate::core_modules::temperature::TemperatureBar;

const VAPOR_COLOR: Rgb<u8> = Rgb([210, 210, 210]);

// Initial placement of the static objects, in frame pixels.
const SUN_POSITION: (i32, i32) = (1000, 10);
const CLOUD_REST_POSITION: (i32, i32) = (400, 30);
const CLOUD_CONDENSE_Y: i32 = 30;

/// Tunable thresholds for the interaction state machine.
#[derive(Debug, Clone)]
pub struct InteractionConfig {
    /// Evaporation triggers at or above this temperature.
    pub evaporation_temp: f32,
    /// Condensation triggers strictly below this temperature.
    pub condensation_temp: f32,
    /// An active rain episode ends once the temperature exceeds this.
    pub rain_cutoff_temp: f32,
    /// Per-axis pixel radius for grabbing the cloud.
    pub grab_radius: i32,
    /// Cumulative |Δx| of the grabbed cloud that starts a rain episode.
    pub shake_threshold: f32,
    /// Wall-clock bound on a rain episode.
    pub rain_duration: Duration,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            evaporation_temp: 30.0,
            condensation_temp: 20.0,
            rain_cutoff_temp: 25.0,
            grab_radius: 70,
            shake_threshold: 10.0,
            rain_duration: Duration::from_secs(3),
        }
    }
}

/// Owns and advances all mutable simulation state, one frame at a time.
pub struct InteractionState {
    sprites: SpriteStore,
    config: InteractionConfig,

    bar: TemperatureBar,
    cloud: SceneObject,
    sun: SceneObject,
    ocean: SceneObject,

    vapor: Vec<VaporParticle>,
    vapor_active: bool,
    cloud_ready: bool,

    rain: Vec<RainDrop>,
    rain_active: bool,
    rain_started_at: Option<Instant>,

    last_cloud_x: Option<i32>,
    shake_energy: f32,

    rng: StdRng,
}

impl InteractionState {
    pub fn new(sprites: SpriteStore, config: InteractionConfig, rng_seed: Option<u64>) -> Self {
        let cloud = SceneObject::new(
            ObjectKind::Cloud,
            Arc::clone(&sprites.cloud),
            CLOUD_REST_POSITION.0,
            CLOUD_REST_POSITION.1,
            false,
        );
        let sun = SceneObject::new(
            ObjectKind::Sun,
            Arc::clone(&sprites.sun),
            SUN_POSITION.0,
            SUN_POSITION.1,
            true,
        );
        // The ocean's sprite and placement are recomputed on the first frame.
        let ocean_sprite = Arc::new(image::RgbaImage::new(1, 1));
        let ocean = SceneObject::new(ObjectKind::Ocean, ocean_sprite, 0, 0, true);

        let rng = match rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            sprites,
            config,
            bar: TemperatureBar::new(),
            cloud,
            sun,
            ocean,
            vapor: Vec::new(),
            vapor_active: false,
            cloud_ready: false,
            rain: Vec::new(),
            rain_active: false,
            rain_started_at: None,
            last_cloud_x: None,
            shake_energy: 0.0,
            rng,
        }
    }

    /// Draws the temperature bar with the state as of the previous frame.
    /// Called before the gesture overlay so the hand skeleton renders on top.
    pub fn render_temperature(&self, frame: &mut RgbImage) {
        self.bar.render(frame);
    }

    /// Advances the whole simulation one frame and composites the scene onto
    /// `frame`. `now` is the wall-clock instant of this frame.
    pub fn advance(&mut self, frame: &mut RgbImage, gesture: &GestureSignal, now: Instant) {
        let (w, h) = (frame.width(), frame.height());

        // --- 1. Temperature drag ---
        self.bar.update(gesture);

        // --- 2. Ocean fit to frame ---
        let ocean_sprite = self.sprites.ocean_for_frame(w, h);
        self.ocean.set_sprite(ocean_sprite);
        self.ocean.x = 0;
        self.ocean.y = h as i32 - self.ocean.height as i32;

        // --- 3. Evaporation ---
        if self.bar.temp_celsius >= self.config.evaporation_temp
            && !self.vapor_active
            && !self.cloud_ready
        {
            self.vapor = VaporParticle::spawn_batch(&mut self.rng, w, self.ocean.y);
            self.vapor_active = true;
            debug!(temp = self.bar.temp_celsius, "evaporation: vapor batch spawned");
        }

        // --- 4. Vapor integration (drawn behind the scene layer) ---
        for v in &mut self.vapor {
            v.rise();
            draw::fill_circle(frame, v.x as i32, v.y as i32, v.radius, VAPOR_COLOR);
        }

        // --- 5. Condensation (one-shot per session) ---
        if self.bar.temp_celsius < self.config.condensation_temp
            && !self.vapor.is_empty()
            && !self.cloud_ready
        {
            self.cloud.active = true;
            self.cloud.x = w as i32 / 2 - self.cloud.width as i32 / 2;
            self.cloud.y = CLOUD_CONDENSE_Y;
            self.vapor.clear();
            self.vapor_active = false;
            self.cloud_ready = true;
            debug!(temp = self.bar.temp_celsius, "condensation: cloud formed");
        }

        // --- 6. Cloud grab and drag ---
        if self.cloud.active && gesture.grab {
            if let Some((ax, ay)) = gesture.anchor {
                if self.cloud.is_near(ax, ay, self.config.grab_radius) {
                    self.cloud.grabbed = true;
                }
            }
        }
        if self.cloud.grabbed {
            if let Some((ax, ay)) = gesture.anchor {
                self.cloud.center_on(ax, ay);
            }
        }
        if !gesture.grab {
            self.cloud.grabbed = false;
            self.last_cloud_x = None;
            self.shake_energy = 0.0;
        }

        // --- 7. Shake detection ---
        if self.cloud.grabbed {
            if let Some(last_x) = self.last_cloud_x {
                self.shake_energy += (self.cloud.x - last_x).abs() as f32;
                if self.shake_energy > self.config.shake_threshold && !self.rain_active {
                    self.rain_active = true;
                    self.rain_started_at = Some(now);
                    debug!(energy = self.shake_energy, "shake: rain episode started");
                }
            }
            self.last_cloud_x = Some(self.cloud.x);
        }

        // --- 8. Rain spawn ---
        if self.rain_active {
            let room = MAX_RAIN_DROPS.saturating_sub(self.rain.len());
            for _ in 0..RAIN_DROPS_PER_FRAME.min(room) {
                self.rain.push(RainDrop::spawn(&mut self.rng, &self.cloud));
            }
        }

        // --- 9. Rain integration (drawn behind the scene layer) ---
        let ocean_top = self.ocean.y;
        let raindrop = Arc::clone(&self.sprites.raindrop);
        self.rain.retain_mut(|drop| {
            drop.fall();
            if (drop.y as i32) < ocean_top {
                compositor::overlay_rgba(frame, &raindrop, drop.x as i32, drop.y as i32);
                true
            } else {
                false
            }
        });

        // --- 10. Rain episode cut-off ---
        if self.rain_active {
            let expired = self
                .rain_started_at
                .is_some_and(|start| now.duration_since(start) > self.config.rain_duration);
            if expired || self.bar.temp_celsius > self.config.rain_cutoff_temp {
                self.stop_rain();
            }
        }

        // --- 11. Scene compositing, back to front ---
        for obj in [&self.ocean, &self.sun, &self.cloud] {
            if obj.active {
                compositor::overlay_rgba(frame, &obj.sprite, obj.x, obj.y);
            }
        }
    }

    fn stop_rain(&mut self) {
        self.rain_active = false;
        self.rain.clear();
        self.shake_energy = 0.0;
        self.rain_started_at = None;
        debug!("rain episode ended");
    }

    // --- Read access for consumers and tests ---

    pub fn temperature(&self) -> f32 {
        self.bar.temp_celsius
    }

    /// Forces the temperature, clamped to the bar's range.
    pub fn set_temperature(&mut self, temp_celsius: f32) {
        self.bar.temp_celsius = temp_celsius.clamp(0.0, crate::core_modules::temperature::MAX_TEMP);
    }

    pub fn vapor(&self) -> &[VaporParticle] {
        &self.vapor
    }

    pub fn vapor_active(&self) -> bool {
        self.vapor_active
    }

    pub fn cloud_ready(&self) -> bool {
        self.cloud_ready
    }

    pub fn cloud(&self) -> &SceneObject {
        &self.cloud
    }

    pub fn rain(&self) -> &[RainDrop] {
        &self.rain
    }

    pub fn rain_active(&self) -> bool {
        self.rain_active
    }

    pub fn shake_energy(&self) -> f32 {
        self.shake_energy
    }
}
