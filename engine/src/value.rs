/// Result of a position, always stated from the first player's side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    FirstPlayerWins,
    Undecided,
    SecondPlayerWins,
}

impl Outcome {
    pub fn reward(&self) -> f64 {
        match self {
            Outcome::FirstPlayerWins => 1.0,
            Outcome::Undecided => 0.0,
            Outcome::SecondPlayerWins => -1.0,
        }
    }
}
