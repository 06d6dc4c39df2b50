use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform picks for connection routing.
pub trait RandomSource: Send {
    /// An index in `0..len`. Callers never pass zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// Adapts any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: Rng + Send> RandomSource for RngSource<R> {
    fn pick(&mut self, len: usize) -> usize {
        self.0.random_range(0..len)
    }
}

impl Default for RngSource<StdRng> {
    fn default() -> Self {
        RngSource(StdRng::from_os_rng())
    }
}

/// Replays a fixed sequence of picks, cycling when exhausted; each is reduced modulo `len`.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    picks: Vec<usize>,
    next: usize,
}

impl SequenceSource {
    #[must_use]
    pub fn new(picks: Vec<usize>) -> Self {
        Self { picks, next: 0 }
    }
}

impl RandomSource for SequenceSource {
    fn pick(&mut self, len: usize) -> usize {
        if self.picks.is_empty() {
            return 0;
        }
        let pick = self.picks[self.next % self.picks.len()];
        self.next += 1;
        pick % len
    }
}
