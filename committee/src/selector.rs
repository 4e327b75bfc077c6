//! Rotation cursor over the committee, used by the read path

use rand::Rng;

/// Position of the member to ask next.
///
/// A plain value: advancing returns a new state instead of mutating a
/// shared cursor, so whoever holds it decides who may move it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectorState {
    cursor: Option<usize>,
    member_count: usize,
}

impl SelectorState {
    /// Uniformly random start in `[0, member_count)`, or no cursor for an empty committee
    pub fn reset<R: Rng + ?Sized>(member_count: usize, rng: &mut R) -> Self {
        let cursor = (member_count > 0).then(|| rng.gen_range(0..member_count));
        Self {
            cursor,
            member_count,
        }
    }

    /// State positioned at `cursor`, wrapped into range
    pub fn starting_at(cursor: usize, member_count: usize) -> Self {
        Self {
            cursor: (member_count > 0).then(|| cursor % member_count),
            member_count,
        }
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn member_count(&self) -> usize {
        self.member_count
    }

    #[must_use]
    pub fn advance(self) -> Self {
        Self {
            cursor: self.cursor.map(|c| (c + 1) % self.member_count),
            member_count: self.member_count,
        }
    }
}
