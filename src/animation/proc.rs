/// Scalar signal driven by wall-clock seconds, used for ambient motion.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcScalar {
    /// `offset + amp * sin(TAU * freq_hz * secs + phase)`.
    Sine {
        /// Amplitude.
        amp: f64,
        /// Frequency in hertz.
        freq_hz: f64,
        /// Phase in radians.
        #[serde(default)]
        phase: f64,
        /// Constant offset.
        #[serde(default)]
        offset: f64,
    },
    /// Deterministic value noise in `[offset - amp, offset + amp]`.
    Noise1d {
        /// Amplitude.
        amp: f64,
        /// Lattice frequency in hertz.
        freq_hz: f64,
        /// Constant offset.
        #[serde(default)]
        offset: f64,
    },
    /// Linear ramp `offset + rate * secs`, optionally wrapped into `[0, wrap)`.
    Ramp {
        /// Units per second.
        rate: f64,
        /// Value at `secs = 0`.
        #[serde(default)]
        offset: f64,
        /// Wrap period (e.g. `360` for a spinning rotation).
        #[serde(default)]
        wrap: Option<f64>,
    },
}

impl ProcScalar {
    /// Sample the signal at `secs` seconds since start.
    pub fn sample(&self, secs: f64, seed: u64) -> f64 {
        match *self {
            Self::Sine {
                amp,
                freq_hz,
                phase,
                offset,
            } => offset + amp * (std::f64::consts::TAU * freq_hz * secs + phase).sin(),
            Self::Noise1d {
                amp,
                freq_hz,
                offset,
            } => {
                let x = secs.max(0.0) * freq_hz;
                let i0 = x.floor();
                let t = x - i0;
                let i0u = i0.max(0.0) as u64;
                let i1u = i0u + 1;

                let a = noise01(seed, i0u) * 2.0 - 1.0;
                let b = noise01(seed, i1u) * 2.0 - 1.0;
                let v = a + (b - a) * t;
                offset + amp * v
            }
            Self::Ramp { rate, offset, wrap } => {
                let v = offset + rate * secs;
                match wrap {
                    Some(period) if period > 0.0 => v.rem_euclid(period),
                    _ => v,
                }
            }
        }
    }
}

/// SplitMix64 generator; small, seedable and stable across platforms.
#[derive(Clone, Copy, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    /// Seed a new generator.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next raw 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Next value in `[0, 1)` with 53 bits of precision.
    pub fn next_f64_01(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }
}

fn noise01(seed: u64, x: u64) -> f64 {
    let mut rng = Rng64::new(seed ^ x.wrapping_mul(0xD6E8_FEB8_6659_FD93));
    rng.next_f64_01()
}

/// Stable 64-bit hash of a string key mixed into a base seed.
pub fn stable_hash64(seed: u64, key: &str) -> u64 {
    let mut h = seed ^ 0xCBF2_9CE4_8422_2325;
    for b in key.bytes() {
        h ^= u64::from(b);
        h = h.wrapping_mul(0x0000_0100_0000_01B3);
    }
    Rng64::new(h).next_u64()
}

#[cfg(test)]
#[path = "../../tests/unit/animation/proc.rs"]
mod tests;
