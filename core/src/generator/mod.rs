use crate::*;
pub use random::*;

mod random;

/// Source of problems for the tiles of a round.
pub trait ProblemGenerator: core::fmt::Debug {
    fn generate(&mut self, operators: Operators, number_family: u8) -> ProblemSpec;
}
