//! RNG module - shuffle-queue piece generation
//!
//! The generator holds a queue that is a shuffled permutation of every kind
//! available at the configured piece size. Pieces are drawn front to back;
//! when the last one is drawn a fresh permutation is shuffled in right away, so
//! the queue is never empty between calls and the next piece can always be
//! previewed. Two consecutive pieces may repeat across a refill boundary.
//!
//! Randomness comes from a [`ShuffleSource`]. [`EntropyShuffle`] is the
//! production source; [`SimpleRng`] is a seeded LCG for deterministic runs.

use std::collections::VecDeque;
use std::fmt::Debug;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::pieces::{self, Piece};
use crate::types::PieceKind;

/// Injectable source of permutations
pub trait ShuffleSource: Debug + Send {
    /// Reorder `kinds` in place
    fn shuffle(&mut self, kinds: &mut [PieceKind]);
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // A zero state would stay at the increment forever; nudge it.
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }
}

impl ShuffleSource for SimpleRng {
    /// Fisher-Yates
    fn shuffle(&mut self, kinds: &mut [PieceKind]) {
        for i in (1..kinds.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            kinds.swap(i, j);
        }
    }
}

/// OS-seeded shuffle used for real games
#[derive(Debug)]
pub struct EntropyShuffle {
    rng: StdRng,
}

impl EntropyShuffle {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for EntropyShuffle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShuffleSource for EntropyShuffle {
    fn shuffle(&mut self, kinds: &mut [PieceKind]) {
        kinds.shuffle(&mut self.rng);
    }
}

/// Fair shuffle-queue piece generator
#[derive(Debug)]
pub struct PieceGenerator {
    piece_size: u8,
    available: Vec<PieceKind>,
    queue: VecDeque<PieceKind>,
    source: Box<dyn ShuffleSource>,
}

impl PieceGenerator {
    /// Create a generator for `piece_size` drawing permutations from `source`
    pub fn new(piece_size: u8, source: Box<dyn ShuffleSource>) -> Self {
        let mut generator = Self {
            piece_size,
            available: Vec::new(),
            queue: VecDeque::new(),
            source,
        };
        generator.configure(piece_size);
        generator
    }

    /// Select the kinds for `piece_size` and start a fresh queue
    pub fn configure(&mut self, piece_size: u8) {
        self.piece_size = piece_size;
        self.available = pieces::available(piece_size);
        self.reset();
    }

    /// Drop the pending queue and shuffle a new permutation
    pub fn reset(&mut self) {
        self.queue.clear();
        self.refill();
    }

    fn refill(&mut self) {
        let mut permutation = self.available.clone();
        self.source.shuffle(&mut permutation);
        self.queue.extend(permutation);
    }

    /// Draw the next kind
    pub fn next(&mut self) -> PieceKind {
        if self.queue.is_empty() {
            self.refill();
        }
        let kind = match self.queue.pop_front() {
            Some(kind) => kind,
            // Only reachable with an empty catalog selection.
            None => PieceKind::I,
        };
        if self.queue.is_empty() {
            self.refill();
        }
        kind
    }

    /// Kind the next call to [`PieceGenerator::next`] returns
    pub fn peek(&self) -> Option<PieceKind> {
        self.queue.front().copied()
    }

    /// Preview piece for the next kind, without touching the queue
    pub fn preview(&self) -> Option<Piece> {
        self.peek().map(Piece::new)
    }

    pub fn piece_size(&self) -> u8 {
        self.piece_size
    }

    /// Kinds in the current cycle, catalog order
    pub fn available(&self) -> &[PieceKind] {
        &self.available
    }

    /// Kinds still queued in the current cycle, draw order
    pub fn pending(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Leaves every permutation in catalog order.
    #[derive(Debug)]
    struct Identity;

    impl ShuffleSource for Identity {
        fn shuffle(&mut self, _kinds: &mut [PieceKind]) {}
    }

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_zero_seed_is_usable() {
        let mut rng = SimpleRng::new(0);
        let a = rng.next_u32();
        let b = rng.next_u32();
        assert_ne!(a, b);
    }

    #[test]
    fn test_cycle_contains_each_kind_once() {
        let mut generator = PieceGenerator::new(5, Box::new(SimpleRng::new(7)));
        let count = generator.available().len();

        let mut drawn: Vec<_> = (0..count).map(|_| generator.next()).collect();
        drawn.sort();
        let mut expected = generator.available().to_vec();
        expected.sort();
        assert_eq!(drawn, expected);
    }

    #[test]
    fn test_queue_never_empty_after_draw() {
        let mut generator = PieceGenerator::new(4, Box::new(SimpleRng::new(3)));
        for _ in 0..50 {
            generator.next();
            assert!(generator.peek().is_some());
        }
    }

    #[test]
    fn test_peek_matches_next() {
        let mut generator = PieceGenerator::new(6, Box::new(SimpleRng::new(99)));
        for _ in 0..40 {
            let peeked = generator.peek();
            assert_eq!(peeked, Some(generator.next()));
        }
    }

    #[test]
    fn test_identity_source_draws_catalog_order() {
        let mut generator = PieceGenerator::new(4, Box::new(Identity));
        let drawn: Vec<_> = (0..7).map(|_| generator.next()).collect();
        assert_eq!(drawn, pieces::available(4));
        // Refill after the last draw starts the cycle over.
        assert_eq!(generator.peek(), Some(PieceKind::I));
    }

    #[test]
    fn test_configure_resets_queue() {
        let mut generator = PieceGenerator::new(4, Box::new(Identity));
        generator.next();
        generator.configure(7);
        assert_eq!(generator.piece_size(), 7);
        assert_eq!(generator.pending().count(), PieceKind::ALL.len());
    }
}
