// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use crate::mapper::Point;

const LIFE_DECAY: f32 = 0.02;
const SIZE_DECAY: f32 = 0.5;

/// A rising, shrinking flame. Has nothing to do with audio state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Point,
    pub size: f32,
    pub speed_y: f32,
    pub hue: f32,
    pub life: f32,
}

impl Particle {
    fn new<R: Rng>(position: Point, rng: &mut R) -> Particle {
        Particle {
            position,
            size: rng.gen_range(10.0f32..30.0),
            speed_y: rng.gen_range(-2.0f32..-0.5),
            hue: rng.gen_range(280.0f32..330.0),
            life: 1.0,
        }
    }

    fn update(&mut self) {
        self.position.y += self.speed_y;
        self.life -= LIFE_DECAY;
        self.size = (self.size - SIZE_DECAY).max(0.0);
    }

    pub fn is_dead(&self) -> bool {
        self.life <= 0.0 || self.size <= 0.0
    }
}

/// Spawns bursts of particles and ages them once per frame.
pub struct ParticleSystem {
    count: usize,
    particles: Vec<Particle>,
    rng: StdRng,
}

impl ParticleSystem {
    pub fn new(count: usize) -> ParticleSystem {
        ParticleSystem::with_rng(count, StdRng::from_entropy())
    }

    fn with_rng(count: usize, rng: StdRng) -> ParticleSystem {
        ParticleSystem {
            count,
            particles: Vec::new(),
            rng,
        }
    }

    /// Adds a burst at the given position.
    pub fn spawn(&mut self, position: Point) {
        debug!(x = position.x, y = position.y, count = self.count, "Spawning particles");
        for _ in 0..self.count {
            let particle = Particle::new(position, &mut self.rng);
            self.particles.push(particle);
        }
    }

    /// Advances every particle by one frame and drops the dead ones.
    pub fn tick(&mut self) {
        for particle in self.particles.iter_mut() {
            particle.update();
        }
        self.particles.retain(|p| !p.is_dead());
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system(count: usize) -> ParticleSystem {
        ParticleSystem::with_rng(count, StdRng::seed_from_u64(42))
    }

    #[test]
    fn test_spawn_ranges() {
        let mut particles = system(15);
        particles.spawn(Point::new(100.0, 200.0));
        assert_eq!(particles.particles().len(), 15);

        for p in particles.particles() {
            assert_eq!(p.position, Point::new(100.0, 200.0));
            assert!((10.0..30.0).contains(&p.size));
            assert!((-2.0..-0.5).contains(&p.speed_y));
            assert!((280.0..330.0).contains(&p.hue));
            assert_eq!(p.life, 1.0);
        }
    }

    #[test]
    fn test_tick_moves_up_and_decays() {
        let mut particles = system(1);
        particles.spawn(Point::new(0.0, 100.0));
        let before = particles.particles()[0];

        particles.tick();
        let after = particles.particles()[0];
        assert!(after.position.y < before.position.y);
        assert!((after.position.y - (100.0 + before.speed_y)).abs() < 1e-4);
        assert!((after.life - 0.98).abs() < 1e-6);
        assert!((after.size - (before.size - 0.5)).abs() < 1e-6);
    }

    #[test]
    fn test_every_particle_dies() {
        let mut particles = system(15);
        particles.spawn(Point::new(0.0, 0.0));
        particles.spawn(Point::new(50.0, 50.0));

        // Life reaches zero after 50 frames at most.
        for _ in 0..51 {
            particles.tick();
            for p in particles.particles() {
                assert!(p.size > 0.0);
                assert!(p.life > 0.0);
            }
        }
        assert!(particles.is_empty());
    }

    #[test]
    fn test_no_cap() {
        let mut particles = system(15);
        for _ in 0..20 {
            particles.spawn(Point::new(1.0, 1.0));
        }
        assert_eq!(particles.particles().len(), 300);
        particles.clear();
        assert!(particles.is_empty());
    }
}
