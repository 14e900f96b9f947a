//noise.rs

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

// --- SETTINGS ---

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    pub seed: u32,
    pub frequency: f32,
    pub amplitude: f32,
    pub octaves: u32,
    pub persistence: f32,
    pub lacunarity: f32,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            frequency: 1.5,
            amplitude: 0.6,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

// --- LAYERED NOISE ---

/// Seeded fractal Perlin noise over the XZ plane.
#[derive(Clone)]
pub struct LayeredNoise {
    perm: [u8; 512],
    settings: NoiseSettings,
}

impl LayeredNoise {
    pub fn new(settings: NoiseSettings) -> Self {
        let mut perm = [0u8; 512];
        let mut permutation: Vec<u8> = (0..=255).collect();
        let mut state = settings.seed;
        for i in (1..256).rev() {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            let j = (state as usize) % (i + 1);
            permutation.swap(i, j);
        }

        for i in 0..256 {
            perm[i] = permutation[i];
            perm[i + 256] = permutation[i];
        }
        Self { perm, settings }
    }

    /// Octave-weighted noise in `[0, 1]`.
    pub fn sample(&self, p: Vec2) -> f32 {
        let s = &self.settings;
        let mut total = 0.0;
        let mut total_amp = 0.0;
        let mut amp = 1.0;
        let mut freq = s.frequency;

        for octave in 0..s.octaves.max(1) {
            // shift each octave off the integer lattice, where Perlin is always zero
            let pos = Vec3::new(p.x * freq, octave as f32 * 0.618 + 0.5, p.y * freq);
            total += (self.perlin(pos) + 1.0) * 0.5 * amp;
            total_amp += amp;

            amp *= s.persistence;
            freq *= s.lacunarity;
        }

        if total_amp > 0.0 {
            (total / total_amp).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Elevation centred on zero, spanning `±amplitude / 2`.
    pub fn height(&self, p: Vec2) -> f32 {
        (self.sample(p) - 0.5) * self.settings.amplitude
    }

    // --- PERLIN MATH ---

    fn perlin(&self, pos: Vec3) -> f32 {
        let cell = pos.floor();
        let xi = (cell.x as i32 & 255) as usize;
        let yi = (cell.y as i32 & 255) as usize;
        let zi = (cell.z as i32 & 255) as usize;

        let Vec3 { x, y, z } = pos - cell;
        let (u, v, w) = (fade(x), fade(y), fade(z));

        let p = &self.perm;
        let a = p[xi] as usize + yi;
        let aa = p[a] as usize + zi;
        let ab = p[a + 1] as usize + zi;
        let b = p[xi + 1] as usize + yi;
        let ba = p[b] as usize + zi;
        let bb = p[b + 1] as usize + zi;

        lerp(w, lerp(v, lerp(u, grad(p[aa], x, y, z),
                                grad(p[ba], x - 1.0, y, z)),
                        lerp(u, grad(p[ab], x, y - 1.0, z),
                                grad(p[bb], x - 1.0, y - 1.0, z))),
                lerp(v, lerp(u, grad(p[aa + 1], x, y, z - 1.0),
                                grad(p[ba + 1], x - 1.0, y, z - 1.0)),
                        lerp(u, grad(p[ab + 1], x, y - 1.0, z - 1.0),
                                grad(p[bb + 1], x - 1.0, y - 1.0, z - 1.0))))
    }
}

// ---MATH-HELPERS---

fn fade(t: f32) -> f32 { t * t * t * (t * (t * 6.0 - 15.0) + 10.0) }
fn lerp(t: f32, a: f32, b: f32) -> f32 { a + t * (b - a) }
fn grad(hash: u8, x: f32, y: f32, z: f32) -> f32 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 { y } else if h == 12 || h == 14 { x } else { z };
    (if (h & 1) == 0 { u } else { -u }) + (if (h & 2) == 0 { v } else { -v })
}
