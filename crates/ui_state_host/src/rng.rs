//! Seeded pseudo-random material for notification ids.
//!
//! [`Jsf32`] is a small-fast 32-bit generator: four state words mixed with
//! rotate/xor/add steps. It is not cryptographic; its only job is to make ids
//! minted by independent manager instances (separate tabs sharing the same
//! time base) unlikely to collide.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};

#[derive(Debug, Clone)]
/// Four-word small-fast pseudo-random generator.
pub struct Jsf32 {
    a: u32,
    b: u32,
    c: u32,
    d: u32,
}

impl Jsf32 {
    /// Creates a generator from four explicit state words.
    pub fn new(a: u32, b: u32, c: u32, d: u32) -> Self {
        Self { a, b, c, d }
    }

    /// Seeds a generator from the clock and per-process hasher entropy.
    pub fn from_entropy(now_unix_ms: u64) -> Self {
        let mut hasher = RandomState::new().build_hasher();
        hasher.write_u64(now_unix_ms);
        let entropy = hasher.finish();

        Self::new(
            now_unix_ms as u32 ^ (now_unix_ms >> 32) as u32,
            entropy as u32,
            (entropy >> 32) as u32,
            0x9e37_79b9,
        )
    }

    /// Advances the state and returns the next 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        let t = self.a.wrapping_sub(self.b.rotate_left(27));
        self.a = self.b ^ self.c.rotate_left(17);
        self.b = self.c.wrapping_add(self.d);
        self.c = self.d.wrapping_add(t);
        self.d = self.a.wrapping_add(t);
        self.d
    }

    /// Returns a uniform value in `[min, max)`.
    ///
    /// Swapped bounds are reordered rather than rejected.
    pub fn gen_range(&mut self, min: u64, max: u64) -> u64 {
        let (lo, hi) = if min > max { (max, min) } else { (min, max) };
        let unit = f64::from(self.next_u32()) / 4_294_967_296.0;
        lo + (unit * (hi - lo) as f64) as u64
    }
}

#[derive(Debug)]
/// Process-scoped notification id mint.
///
/// Ids combine a fixed time base (hex), a strictly incrementing counter
/// (hex), and a random base36 suffix, so they sort roughly by creation order
/// within one process while staying distinct across processes.
pub struct IdGenerator {
    base_unix_ms: u64,
    counter: u64,
    rng: Jsf32,
}

impl IdGenerator {
    /// Creates a generator anchored at `base_unix_ms` (usually process start).
    pub fn new(base_unix_ms: u64) -> Self {
        Self {
            base_unix_ms,
            counter: 0,
            rng: Jsf32::from_entropy(base_unix_ms),
        }
    }

    /// Mints the next id.
    pub fn next_id(&mut self) -> String {
        self.counter += 1;
        let suffix = self.rng.gen_range(0, 1_000_000_000);
        format!(
            "{:x}-{:x}-{}",
            self.base_unix_ms,
            self.counter,
            to_base36(suffix)
        )
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
