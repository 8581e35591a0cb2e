use rand::prelude::*;
use smallvec::SmallVec;

use super::*;

/// Uniform generation: one operator picked at random from the set, the free operand drawn from
/// `0..=NUMBER_MAX` and the number family as the other operand.
#[derive(Clone, Debug)]
pub struct RandomProblemGenerator {
    rng: SmallRng,
}

impl RandomProblemGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn pick_operator(&mut self, operators: Operators) -> Operator {
        let choices: SmallVec<[Operator; 4]> = operators.operators().collect();
        if choices.is_empty() {
            log::warn!("No operators to choose from, fallback to addition");
            return Operator::Addition;
        }
        choices[self.rng.random_range(0..choices.len())]
    }
}

impl ProblemGenerator for RandomProblemGenerator {
    fn generate(&mut self, operators: Operators, number_family: u8) -> ProblemSpec {
        use Operator::*;

        let number_family = number_family.min(NUMBER_MAX);
        let operator = self.pick_operator(operators);

        let problem = match operator {
            Addition | Multiplication => {
                let draw = self.rng.random_range(0..=NUMBER_MAX);
                ProblemSpec::new(operator, draw, number_family)
            }
            Subtraction => {
                // the larger number goes first so the result is never negative
                let draw = self.rng.random_range(0..=NUMBER_MAX);
                ProblemSpec::new(
                    operator,
                    draw.max(number_family),
                    draw.min(number_family),
                )
            }
            Division => {
                let divisor = self.rng.random_range(1..=NUMBER_MAX);
                if number_family == 0 {
                    ProblemSpec::new(operator, 0, divisor)
                } else {
                    ProblemSpec::new(operator, number_family * divisor, number_family)
                }
            }
        };

        log::trace!("generated problem: {} {}", problem, problem.answer());
        problem
    }
}
