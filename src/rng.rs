//! The seeded generator every daily puzzle is derived from.

use rand::{RngCore, SeedableRng};

const MULTIPLIER: u32 = 1_664_525;
const INCREMENT: u32 = 1_013_904_223;

/// 2^32, the modulus of the generator and the divisor used to map states into `[0, 1)`.
const MODULUS: f64 = 4_294_967_296.0;

/// A linear congruential generator: `state = (1664525 * state + 1013904223) mod 2^32`.
///
/// Two generators created from the same seed yield the same sequence on every host, which is
/// what makes a puzzle day look the same for every player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    /// Creates a generator whose state is `seed` reduced modulo 2^32.
    pub fn new(seed: i64) -> Self {
        Self {
            state: seed.rem_euclid(1 << 32) as u32,
        }
    }

    /// Resets the internal state to `seed`.
    pub fn seed(&mut self, seed: i64) {
        *self = Self::new(seed);
    }

    /// Advances the state and returns `state / 2^32`, a float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        unit(self)
    }

    fn advance(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        self.state
    }
}

impl RngCore for Lcg {
    fn next_u32(&mut self) -> u32 {
        self.advance()
    }

    fn next_u64(&mut self) -> u64 {
        let high = self.advance() as u64;
        let low = self.advance() as u64;
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.advance().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Lcg {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self {
            state: u32::from_le_bytes(seed),
        }
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new((state & 0xFFFF_FFFF) as i64)
    }
}

/// Draws a float in `[0, 1)` from any generator.
///
/// For [`Lcg`] this is exactly `state / 2^32`.
pub fn unit<R: RngCore + ?Sized>(rng: &mut R) -> f64 {
    rng.next_u32() as f64 / MODULUS
}

/// Draws an index in `0..len` as `floor(unit * len)`. Returns 0 for an empty range.
pub fn index<R: RngCore + ?Sized>(rng: &mut R, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    ((unit(rng) * len as f64).floor() as usize).min(len - 1)
}

/// Shuffles `items` in place with Fisher–Yates, walking from the last slot down to the second.
pub fn shuffle<T, R: RngCore + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = index(rng, i + 1);
        items.swap(i, j);
    }
}
