//! Difficulty buckets and profile-driven pool composition.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dedup::dedup_questions;
use crate::model::Question;
use crate::shuffle::{shuffle, RandomSource};

/// Share of a `hard_mix` attempt drawn from the standard side.
pub const HARD_MIX_STANDARD_SHARE: f64 = 0.7;

/// The bucket a difficulty label falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Easy,
    Medium,
    Standard,
    Advanced,
    Hard,
}

/// Classify a free-form label by case-insensitive substring, first match wins.
///
/// Unknown and empty labels land in `Standard` so they still get selected.
pub fn classify(difficulty: &str) -> Bucket {
    let d = difficulty.trim().to_lowercase();
    if d.contains("easy") {
        Bucket::Easy
    } else if d.contains("medium") {
        Bucket::Medium
    } else if d.contains("advanced") {
        Bucket::Advanced
    } else if d.contains("standard") {
        Bucket::Standard
    } else if d.contains("hard") {
        Bucket::Hard
    } else {
        Bucket::Standard
    }
}

/// A pool split by [`classify`], each bucket in pool order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buckets {
    pub easy: Vec<Question>,
    pub medium: Vec<Question>,
    pub standard: Vec<Question>,
    pub advanced: Vec<Question>,
    pub hard: Vec<Question>,
}

pub fn partition(pool: &[Question]) -> Buckets {
    let mut buckets = Buckets::default();
    for q in pool {
        let bucket = match classify(&q.difficulty) {
            Bucket::Easy => &mut buckets.easy,
            Bucket::Medium => &mut buckets.medium,
            Bucket::Standard => &mut buckets.standard,
            Bucket::Advanced => &mut buckets.advanced,
            Bucket::Hard => &mut buckets.hard,
        };
        bucket.push(q.clone());
    }
    buckets
}

/// True when at least one question carries a non-blank difficulty label.
pub fn has_difficulty_data(pool: &[Question]) -> bool {
    pool.iter().any(|q| !q.difficulty.trim().is_empty())
}

/// The requested difficulty-selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Profile {
    Easy,
    Medium,
    HardStandard,
    HardAdvanced,
    HardMix,
    /// Exam-like: the whole pool. Unrecognized labels resolve here.
    #[default]
    Mixed,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Easy => "easy",
            Profile::Medium => "medium",
            Profile::HardStandard => "hard_standard",
            Profile::HardAdvanced => "hard_advanced",
            Profile::HardMix => "hard_mix",
            Profile::Mixed => "mixed",
        }
    }

    /// Parse a label; anything unrecognized is `Mixed`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "easy" => Profile::Easy,
            "medium" => Profile::Medium,
            "hard_standard" => Profile::HardStandard,
            "hard_advanced" => Profile::HardAdvanced,
            "hard_mix" => Profile::HardMix,
            _ => Profile::Mixed,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Profile {
    fn from(label: String) -> Self {
        Profile::from_label(&label)
    }
}

impl From<Profile> for String {
    fn from(profile: Profile) -> Self {
        profile.as_str().to_string()
    }
}

/// Compose the candidate pool for `profile` ahead of selection.
///
/// Pools without any difficulty labels pass through unchanged, and a profile
/// whose buckets are empty falls back to the full pool. `count` only matters
/// for `hard_mix`, which pre-draws its 70/30 split.
pub fn apply_profile<R>(
    pool: &[Question],
    profile: Profile,
    count: usize,
    rng: &mut R,
) -> Vec<Question>
where
    R: RandomSource + ?Sized,
{
    if !has_difficulty_data(pool) {
        return pool.to_vec();
    }

    let buckets = partition(pool);
    let composed = match profile {
        Profile::Easy => buckets.easy,
        Profile::Medium => buckets.medium,
        Profile::HardStandard => concat([buckets.standard, buckets.hard]),
        Profile::HardAdvanced => concat([buckets.advanced, buckets.hard]),
        Profile::HardMix => hard_mix(buckets, count, rng),
        Profile::Mixed => return pool.to_vec(),
    };

    if composed.is_empty() {
        tracing::debug!("profile {profile} matched nothing, using the full pool");
        return pool.to_vec();
    }
    composed
}

/// Sizes of the standard-side and advanced-side draws for `count` questions.
pub fn hard_mix_split(count: usize) -> (usize, usize) {
    let standard = (count as f64 * HARD_MIX_STANDARD_SHARE).round() as usize;
    (standard, count.saturating_sub(standard))
}

// The standard-side draw runs first, so a hard item picked by both sides keeps
// its standard-side copy after the merge dedup.
fn hard_mix<R>(buckets: Buckets, count: usize, rng: &mut R) -> Vec<Question>
where
    R: RandomSource + ?Sized,
{
    let (n_std, n_adv) = hard_mix_split(count);
    let std_pool = concat([
        buckets.standard,
        buckets.hard.clone(),
        buckets.medium,
    ]);
    let adv_pool = concat([buckets.advanced, buckets.hard]);

    let picked_std = take_random(&std_pool, n_std, rng);
    let picked_adv = take_random(&adv_pool, n_adv, rng);
    tracing::debug!(
        std_target = n_std,
        std_taken = picked_std.len(),
        adv_target = n_adv,
        adv_taken = picked_adv.len(),
        "hard_mix draws"
    );

    dedup_questions(picked_std.into_iter().chain(picked_adv))
}

fn take_random<R>(pool: &[Question], n: usize, rng: &mut R) -> Vec<Question>
where
    R: RandomSource + ?Sized,
{
    let mut shuffled = shuffle(pool, rng);
    shuffled.truncate(n);
    shuffled
}

fn concat<const N: usize>(parts: [Vec<Question>; N]) -> Vec<Question> {
    parts.into_iter().flatten().collect()
}
