use std::collections::HashSet;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Upper bound on the number of questions drawn for a single test.
pub const MAX_TEST_QUESTIONS: usize = 20;

/// Difficulty tier of a question. The tier decides how many points a
/// correct answer earns and an incorrect one costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "NB")]
    Newbie,
    #[serde(rename = "AV")]
    Average,
    #[serde(rename = "SP")]
    Smartypants,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Newbie,
        Difficulty::Average,
        Difficulty::Smartypants,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "NB" => Some(Self::Newbie),
            "AV" => Some(Self::Average),
            "SP" => Some(Self::Smartypants),
            _ => None,
        }
    }

    /// Two-letter code stored in the database and sent by forms.
    pub fn code(self) -> &'static str {
        match self {
            Self::Newbie => "NB",
            Self::Average => "AV",
            Self::Smartypants => "SP",
        }
    }

    pub fn points(self) -> i64 {
        match self {
            Self::Newbie => 2,
            Self::Average => 3,
            Self::Smartypants => 5,
        }
    }

    /// Translation key of the human readable tier name.
    pub fn label_key(self) -> &'static str {
        match self {
            Self::Newbie => "difficulty.newbie",
            Self::Average => "difficulty.average",
            Self::Smartypants => "difficulty.smartypants",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Draws up to `limit` distinct ids in random order. When fewer than `limit`
/// ids are available all of them are returned, shuffled.
pub fn sample_question_ids<R: Rng + ?Sized>(ids: &[i64], limit: usize, rng: &mut R) -> Vec<i64> {
    let mut seen = HashSet::with_capacity(ids.len());
    let mut pool: Vec<i64> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
    pool.shuffle(rng);
    pool.truncate(limit);
    pool
}

/// New cumulative score after one answer. Never drops below zero.
pub fn score_after_answer(score: i64, points: i64, correct: bool) -> i64 {
    if correct {
        score.saturating_add(points)
    } else {
        score.saturating_sub(points).max(0)
    }
}
