use std::fmt::{self, Display, Formatter};

use engine::PositionKey;

use super::{discount, learning_rate};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// Player 1 is White, every other player number is Black.
    pub fn from_player(player: usize) -> Self {
        if player == 1 {
            Side::White
        } else {
            Side::Black
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "w"),
            Side::Black => write!(f, "b"),
        }
    }
}

/// Learned state of a single position.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionRecord {
    key: PositionKey,
    mover: Side,
    ply_depth: u32,
    visit_count: u32,
    value: f64,
    aux_value: f64,
    immediate_reward: f64,
    successors: Vec<PositionKey>,
}

impl PositionRecord {
    /// A first sighting: one visit, the value seeded with the reward.
    pub fn new(key: PositionKey, mover: Side, ply_depth: u32, immediate_reward: f64) -> Self {
        Self {
            key,
            mover,
            ply_depth: ply_depth.max(1),
            visit_count: 1,
            value: immediate_reward,
            aux_value: 0.0,
            immediate_reward,
            successors: Vec::new(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        key: PositionKey,
        mover: Side,
        ply_depth: u32,
        visit_count: u32,
        value: f64,
        aux_value: f64,
        immediate_reward: f64,
        successors: Vec<PositionKey>,
    ) -> Self {
        Self {
            key,
            mover,
            ply_depth,
            visit_count,
            value,
            aux_value,
            immediate_reward,
            successors,
        }
    }

    /// Replaces the fields the table does not persist with ones derived from a live game state.
    pub(crate) fn with_derived(mut self, mover: Side, ply_depth: u32) -> Self {
        self.mover = mover;
        self.ply_depth = ply_depth.max(1);
        self
    }

    pub fn key(&self) -> &PositionKey {
        &self.key
    }

    pub fn mover(&self) -> Side {
        self.mover
    }

    pub fn ply_depth(&self) -> u32 {
        self.ply_depth
    }

    pub fn visit_count(&self) -> u32 {
        self.visit_count
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn aux_value(&self) -> f64 {
        self.aux_value
    }

    pub fn immediate_reward(&self) -> f64 {
        self.immediate_reward
    }

    pub fn successors(&self) -> &[PositionKey] {
        &self.successors
    }

    pub fn has_successors(&self) -> bool {
        !self.successors.is_empty()
    }

    /// Whether the position is a decided game. Drawn end positions carry no reward and are not.
    pub fn is_decisive(&self) -> bool {
        self.immediate_reward != 0.0
    }

    pub fn increment_visit_count(&mut self) {
        self.visit_count += 1;
    }

    /// Appends `key` unless already listed. Returns whether it was added.
    pub fn add_successor(&mut self, key: PositionKey) -> bool {
        if self.successors.contains(&key) {
            return false;
        }

        self.successors.push(key);
        true
    }

    /// Moves the value toward the reward plus the discounted reference value.
    ///
    /// Returns the learning rate and discount that were applied.
    pub fn apply_backup(&mut self, reference: f64) -> (f64, f64) {
        let alpha = learning_rate(self.visit_count);
        let gamma = discount(self.ply_depth);

        self.value += alpha * (self.immediate_reward + gamma * (reference - self.value));

        (alpha, gamma)
    }
}
