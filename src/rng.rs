//! Seedable randomness for failure injection.
//!
//! The failure strategy never touches process-wide random state. It owns a
//! [`RandomSource`], which is a [`DeterministicRng`] in normal runs and a
//! scripted sequence in tests.

/// A source of uniform floats in `[0.0, 1.0)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

/// SplitMix64 PRNG.
///
/// Produces identical sequences for a given seed on every platform, which
/// makes whole simulation runs reproducible.
#[derive(Debug, Clone)]
pub struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        DeterministicRng { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }

    /// Current internal state (for snapshotting a run mid-way).
    pub fn state(&self) -> u64 {
        self.state
    }
}

impl RandomSource for DeterministicRng {
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Replays a fixed list of draws, cycling when exhausted.
///
/// Lets tests decide exactly which devices fail on which step.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(draws: Vec<f64>) -> Self {
        ScriptedRandom { draws, cursor: 0 }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 1.0;
        }
        let v = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_determinism() {
        let mut rng1 = DeterministicRng::new(42);
        let mut rng2 = DeterministicRng::new(42);

        let seq1: Vec<u64> = (0..100).map(|_| rng1.next_u64()).collect();
        let seq2: Vec<u64> = (0..100).map(|_| rng2.next_u64()).collect();

        assert_eq!(seq1, seq2, "RNG is not deterministic!");
    }

    #[test]
    fn test_rng_different_seeds_differ() {
        let mut rng1 = DeterministicRng::new(1);
        let mut rng2 = DeterministicRng::new(2);
        assert_ne!(rng1.next_u64(), rng2.next_u64());
    }

    #[test]
    fn test_rng_f64_range() {
        let mut rng = DeterministicRng::new(123);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "f64 out of range: {}", v);
        }
    }

    #[test]
    fn test_scripted_cycles() {
        let mut src = ScriptedRandom::new(vec![0.1, 0.9]);
        assert_eq!(src.next_f64(), 0.1);
        assert_eq!(src.next_f64(), 0.9);
        assert_eq!(src.next_f64(), 0.1);
    }

    #[test]
    fn test_scripted_empty_never_fires() {
        let mut src = ScriptedRandom::new(Vec::new());
        assert_eq!(src.next_f64(), 1.0);
    }
}
