//! The particle field: spawn, age, fade, bounce, respawn

use crate::particle::{Orientation, Particle, ParticlePool, Phase, SlotId};
use kotodama_core::{Vec3, WordRng};

/// Tuning for the field. Defaults match the reference visualization:
/// glyphs drift inside a 20×20×10 box around the origin and live 5–15
/// seconds with a one-second fade at each end.
#[derive(Debug, Clone)]
pub struct FieldConfig {
    /// Active-population cap, normally supplied by the performance tier
    pub max_particles: usize,
    /// Half-extents of the world box; crossing any face reflects velocity
    pub bounds: Vec3,
    /// Half-extents of the spawn volume
    pub spawn_extent: Vec3,
    /// Per-axis, per-tick drift drawn from [-drift, drift)
    pub drift: f32,
    pub lifespan_min: f32,
    pub lifespan_max: f32,
    /// Fade-in/fade-out window at each end of a lifespan, seconds
    pub fade: f32,
    /// Fixed aging step per tick. Aging is tied to this constant, not to
    /// measured frame time, so irregular pacing stretches lifespans in
    /// real seconds rather than skipping ahead.
    pub tick_step: f32,
    /// Probability that a spawn is FixedVertical instead of Billboard
    pub vertical_chance: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            max_particles: 200,
            bounds: Vec3::new(10.0, 10.0, 5.0),
            spawn_extent: Vec3::new(10.0, 10.0, 5.0),
            drift: 0.01,
            lifespan_min: 5.0,
            lifespan_max: 15.0,
            fade: 1.0,
            tick_step: 1.0 / 60.0,
            vertical_chance: 0.5,
        }
    }
}

/// Owns the active particle set and drives its lifecycle once per tick.
pub struct ParticleField {
    words: Vec<String>,
    config: FieldConfig,
    pool: ParticlePool,
    rng: WordRng,
    /// Slots that expired during the current tick, reused across calls
    expired_scratch: Vec<SlotId>,
}

impl ParticleField {
    /// Create the field and spawn the initial population: one particle per
    /// word, in list order, up to the cap. `words` must be non-empty.
    pub fn new(words: Vec<String>, config: FieldConfig, rng: WordRng) -> Self {
        debug_assert!(!words.is_empty(), "field activated with no words");
        let pool = ParticlePool::new(config.max_particles);
        let mut field = Self {
            words,
            config,
            pool,
            rng,
            expired_scratch: Vec::new(),
        };
        let initial = field.words.len().min(field.config.max_particles);
        for i in 0..initial {
            let word = field.words[i].clone();
            field.spawn(word);
        }
        field
    }

    /// Spawn one particle for `word` at a random position with random
    /// drift, lifespan, and orientation. Returns None at the cap.
    pub fn spawn(&mut self, word: String) -> Option<SlotId> {
        let slot = self.pool.acquire(word)?;
        let cfg = &self.config;
        let rng = &mut self.rng;
        let position = Vec3::new(
            rng.range(-cfg.spawn_extent.x, cfg.spawn_extent.x),
            rng.range(-cfg.spawn_extent.y, cfg.spawn_extent.y),
            rng.range(-cfg.spawn_extent.z, cfg.spawn_extent.z),
        );
        let velocity = Vec3::new(
            rng.range(-cfg.drift, cfg.drift),
            rng.range(-cfg.drift, cfg.drift),
            rng.range(-cfg.drift, cfg.drift),
        );
        let lifespan = rng.range(cfg.lifespan_min, cfg.lifespan_max);
        let orientation = if rng.chance(cfg.vertical_chance) {
            Orientation::FixedVertical
        } else {
            Orientation::Billboard
        };

        let p = self.pool.get_mut(slot);
        p.position = position;
        p.velocity = velocity;
        p.lifespan = lifespan;
        p.orientation = orientation;
        Some(slot)
    }

    /// Advance every active particle by one fixed step: integrate, age,
    /// fade, reflect off the world bounds, then retire and replace anything
    /// that reached its lifespan.
    pub fn tick(&mut self) {
        let dt = self.config.tick_step;
        let bounds = self.config.bounds;
        let fade = self.config.fade;

        self.expired_scratch.clear();
        for i in 0..self.pool.active_count() {
            let slot = self.pool.active_slots()[i];
            let p = self.pool.get_mut(slot);

            // Velocity is per-tick displacement, not units/second
            p.position += p.velocity;
            p.age += dt;

            p.opacity = fade_opacity(p.phase(fade), p.age, p.lifespan, fade);

            reflect_axis(p.position.x, &mut p.velocity.x, bounds.x);
            reflect_axis(p.position.y, &mut p.velocity.y, bounds.y);
            reflect_axis(p.position.z, &mut p.velocity.z, bounds.z);

            if p.age >= p.lifespan {
                self.expired_scratch.push(slot);
            }
        }

        // Retire in the same tick; each release is followed immediately by
        // a spawn of a random word so the population stays constant.
        let expired = std::mem::take(&mut self.expired_scratch);
        for slot in &expired {
            self.pool.release(*slot);
            let word = self.words[self.rng.pick(self.words.len())].clone();
            self.spawn(word);
        }
        self.expired_scratch = expired;
    }

    /// Active particles with their slot ids, for the renderer
    pub fn active(&self) -> impl Iterator<Item = (SlotId, &Particle)> {
        self.pool
            .active_slots()
            .iter()
            .map(|&slot| (slot, self.pool.get(slot)))
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    /// Teardown step 2: release every active particle back to the pool.
    pub fn release_all(&mut self) {
        while let Some(&slot) = self.pool.active_slots().first() {
            self.pool.release(slot);
        }
    }

    /// Teardown step 3: drop all pooled records.
    pub fn drain(&mut self) {
        self.pool.drain();
    }
}

/// Opacity ramp: linear in while Spawning, linear out while FadingOut,
/// 1.0 through Steady.
fn fade_opacity(phase: Phase, age: f32, lifespan: f32, fade: f32) -> f32 {
    let raw = match phase {
        Phase::Spawning => age / fade,
        Phase::FadingOut | Phase::Expired => (lifespan - age) / fade,
        Phase::Steady => 1.0,
    };
    raw.clamp(0.0, 1.0)
}

/// Elastic reflection: outside the bound, reverse the velocity component
/// that points outward. Position is left alone; the overshoot reverses on
/// the next tick.
fn reflect_axis(position: f32, velocity: &mut f32, bound: f32) {
    if position.abs() > bound && position * *velocity > 0.0 {
        *velocity = -*velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kotodama_core::WordRng;

    fn test_field(words: &[&str], max: usize) -> ParticleField {
        let config = FieldConfig {
            max_particles: max,
            ..Default::default()
        };
        ParticleField::new(
            words.iter().map(|w| w.to_string()).collect(),
            config,
            WordRng::new(42),
        )
    }

    #[test]
    fn initial_population_is_min_of_words_and_cap() {
        let field = test_field(&["希望", "不安"], 200);
        assert_eq!(field.active_count(), 2);

        let field = test_field(&["a", "b", "c", "d", "e"], 3);
        assert_eq!(field.active_count(), 3);
    }

    #[test]
    fn initial_words_are_taken_in_order() {
        let field = test_field(&["a", "b", "c"], 2);
        let words: Vec<_> = field.active().map(|(_, p)| p.word.as_str()).collect();
        assert_eq!(words, ["a", "b"]);
    }

    #[test]
    fn invariants_hold_every_tick() {
        let mut field = test_field(&["春", "夏", "秋", "冬"], 4);
        // Long enough to cycle through several lifespans
        for _ in 0..4000 {
            field.tick();
            for (_, p) in field.active() {
                assert!(p.age >= 0.0 && p.age < p.lifespan);
                assert!((0.0..=1.0).contains(&p.opacity));
            }
        }
    }

    #[test]
    fn active_count_constant_across_respawns() {
        let mut field = test_field(&["希望", "不安"], 200);
        // 20 simulated seconds — every initial particle expires at least once
        for _ in 0..1200 {
            field.tick();
            assert_eq!(field.active_count(), 2);
        }
        for (_, p) in field.active() {
            assert!(["希望", "不安"].contains(&p.word.as_str()));
        }
    }

    #[test]
    fn respawn_reuses_pool_slots() {
        let mut field = test_field(&["一", "二", "三"], 3);
        for _ in 0..2000 {
            field.tick();
        }
        assert_eq!(field.pool().peak_active(), 3);
        assert!(field.pool().arena_len() <= 3);
    }

    #[test]
    fn boundary_reflection_flips_sign_only() {
        let mut field = test_field(&["端"], 1);
        let slot = field.active().next().unwrap().0;
        {
            let p = field.pool.get_mut(slot);
            p.position = Vec3::new(field.config.bounds.x + 0.001, 0.0, 0.0);
            p.velocity = Vec3::new(0.004, 0.0, 0.0);
            // Mid-life so expiry can't interfere
            p.age = 2.0;
            p.lifespan = 100.0;
        }
        field.tick();
        let p = field.pool.get(slot);
        assert!((p.velocity.x - (-0.004)).abs() < 1e-7);
        assert!((p.velocity.length() - 0.004).abs() < 1e-7);
    }

    #[test]
    fn inward_velocity_is_not_reflected() {
        let mut velocity = -0.004;
        // Already outside but heading back in: leave it alone
        reflect_axis(10.5, &mut velocity, 10.0);
        assert_eq!(velocity, -0.004);
    }

    #[test]
    fn fade_opacity_matches_age_windows() {
        assert!((fade_opacity(Phase::Spawning, 0.25, 10.0, 1.0) - 0.25).abs() < 1e-6);
        assert!((fade_opacity(Phase::Steady, 5.0, 10.0, 1.0) - 1.0).abs() < 1e-6);
        assert!((fade_opacity(Phase::FadingOut, 9.6, 10.0, 1.0) - 0.4).abs() < 1e-5);
        assert_eq!(fade_opacity(Phase::Expired, 10.2, 10.0, 1.0), 0.0);
    }

    #[test]
    fn orientation_mix_contains_both_modes() {
        let words: Vec<String> = (0..50).map(|i| format!("w{i}")).collect();
        let config = FieldConfig {
            max_particles: 50,
            ..Default::default()
        };
        let field = ParticleField::new(words, config, WordRng::new(42));
        let vertical = field
            .active()
            .filter(|(_, p)| p.orientation == Orientation::FixedVertical)
            .count();
        assert!(vertical > 0 && vertical < 50);
    }

    #[test]
    fn teardown_releases_then_drains() {
        let mut field = test_field(&["a", "b"], 2);
        field.release_all();
        assert_eq!(field.active_count(), 0);
        assert_eq!(field.pool().free_count(), 2);
        field.drain();
        assert_eq!(field.pool().arena_len(), 0);
    }
}
