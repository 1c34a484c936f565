//! Rail piece kits
//!
//! Only lengths matter here; the scene layer owns the actual models and
//! instantiates them at the placements produced by [`crate::rail::placer`].

use serde::{Deserialize, Serialize};

/// Shortest piece length accepted; degenerate model bounds are raised to it.
pub const MIN_PIECE_LENGTH: f32 = 0.01;

fn piece_length(length: f32) -> f32 {
    if length.is_finite() {
        length.max(MIN_PIECE_LENGTH)
    } else {
        MIN_PIECE_LENGTH
    }
}

/// Three-piece kit: a start cap, a repeatable main piece and an end cap,
/// each measured along its forward (+Z) axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RailKit {
    pub start_length: f32,
    pub main_length: f32,
    pub end_length: f32,
}

impl RailKit {
    pub fn new(start_length: f32, main_length: f32, end_length: f32) -> Self {
        Self {
            start_length: piece_length(start_length),
            main_length: piece_length(main_length),
            end_length: piece_length(end_length),
        }
    }
}

impl Default for RailKit {
    fn default() -> Self {
        Self::new(2.0, 4.0, 2.0)
    }
}

/// Two-section kit laid in a strict long, short, long, short pattern
/// (four-sleeper and three-sleeper sections).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlternatingRailKit {
    pub long_length: f32,
    pub short_length: f32,
}

/// A measured rail section found in a model, before kit assembly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionCandidate {
    pub sleeper_count: usize,
    pub length: f32,
}

impl AlternatingRailKit {
    pub fn new(long_length: f32, short_length: f32) -> Self {
        Self {
            long_length: piece_length(long_length),
            short_length: piece_length(short_length),
        }
    }

    /// Pick the long and short sections out of measured candidates.
    ///
    /// The long section is the first candidate with four or more sleepers
    /// (most sleepers first, then longest); the short one prefers exactly
    /// three sleepers and otherwise takes any other candidate. `None` when
    /// fewer than two candidates exist.
    pub fn from_candidates(candidates: &[SectionCandidate]) -> Option<Self> {
        if candidates.len() < 2 {
            return None;
        }

        let mut sorted = candidates.to_vec();
        sorted.sort_by(|a, b| {
            b.sleeper_count
                .cmp(&a.sleeper_count)
                .then(b.length.total_cmp(&a.length))
        });

        let long_index = sorted.iter().position(|c| c.sleeper_count >= 4).unwrap_or(0);
        let short_index = sorted
            .iter()
            .enumerate()
            .position(|(i, c)| i != long_index && c.sleeper_count == 3)
            .or_else(|| (0..sorted.len()).find(|&i| i != long_index))?;

        Some(Self::new(sorted[long_index].length, sorted[short_index].length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(sleeper_count: usize, length: f32) -> SectionCandidate {
        SectionCandidate { sleeper_count, length }
    }

    #[test]
    fn test_lengths_are_floored() {
        let kit = RailKit::new(0.0, -3.0, f32::NAN);
        assert_eq!(kit.start_length, MIN_PIECE_LENGTH);
        assert_eq!(kit.main_length, MIN_PIECE_LENGTH);
        assert_eq!(kit.end_length, MIN_PIECE_LENGTH);
    }

    #[test]
    fn test_picks_four_and_three_sleeper_sections() {
        let kit = AlternatingRailKit::from_candidates(&[
            candidate(3, 6.0),
            candidate(2, 9.0),
            candidate(4, 10.0),
        ])
        .unwrap();
        assert_eq!(kit.long_length, 10.0);
        assert_eq!(kit.short_length, 6.0);
    }

    #[test]
    fn test_falls_back_without_exact_counts() {
        let kit = AlternatingRailKit::from_candidates(&[candidate(2, 5.0), candidate(1, 7.0)]).unwrap();
        assert_eq!(kit.long_length, 5.0);
        assert_eq!(kit.short_length, 7.0);
    }

    #[test]
    fn test_needs_two_candidates() {
        assert_eq!(AlternatingRailKit::from_candidates(&[candidate(4, 10.0)]), None);
    }
}
