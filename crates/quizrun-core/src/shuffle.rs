//! Random permutation primitives.
//!
//! Every shuffle draws from an injectable [`RandomSource`], so tests can
//! script the exact sequence of draws and assert exact permutations.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{Question, OPTION_COUNT};

/// Source of uniform random indices.
pub trait RandomSource {
    /// A uniform index in `0..bound`. Callers never pass `bound == 0`.
    fn below(&mut self, bound: usize) -> usize;
}

/// Draws from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn below(&mut self, bound: usize) -> usize {
        rand::rng().random_range(0..bound)
    }
}

/// Reproducible draws from a seeded generator.
#[derive(Debug, Clone)]
pub struct SeededRandom(StdRng);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn below(&mut self, bound: usize) -> usize {
        self.0.random_range(0..bound)
    }
}

/// Replays a fixed list of draws, each reduced modulo the requested bound.
///
/// Once the script runs out every draw is `0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    draws: VecDeque<usize>,
}

impl ScriptedRandom {
    pub fn new(draws: impl IntoIterator<Item = usize>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }

    /// Draws not consumed yet.
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn below(&mut self, bound: usize) -> usize {
        self.draws.pop_front().map(|d| d % bound).unwrap_or(0)
    }
}

/// Fisher–Yates over a slice, in place.
pub fn shuffle_in_place<T, R>(items: &mut [T], rng: &mut R)
where
    R: RandomSource + ?Sized,
{
    for i in (1..items.len()).rev() {
        let j = rng.below(i + 1);
        items.swap(i, j);
    }
}

/// A shuffled copy; the source is left untouched.
pub fn shuffle<T, R>(items: &[T], rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: RandomSource + ?Sized,
{
    let mut copy = items.to_vec();
    shuffle_in_place(&mut copy, rng);
    copy
}

/// Permute a question's options and move `answer_index` with its option.
pub fn shuffle_options<R>(question: &Question, rng: &mut R) -> Question
where
    R: RandomSource + ?Sized,
{
    let mut order: [usize; OPTION_COUNT] = [0, 1, 2, 3];
    shuffle_in_place(&mut order, rng);

    let options = order.map(|old| question.options[old].clone());
    let answer_index = order
        .iter()
        .position(|&old| old == question.answer_index)
        .unwrap_or(question.answer_index);

    Question {
        options,
        answer_index,
        ..question.clone()
    }
}
