use bitflags::bitflags;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Largest operand drawn at random, and the largest number family.
pub const NUMBER_MAX: u8 = 12;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Self::Addition,
        Self::Subtraction,
        Self::Multiplication,
        Self::Division,
    ];

    pub const fn glyph(self) -> char {
        use Operator::*;
        match self {
            Addition => '+',
            Subtraction => '-',
            Multiplication => '×',
            Division => '÷',
        }
    }

    pub const fn flag(self) -> Operators {
        use Operator::*;
        match self {
            Addition => Operators::ADDITION,
            Subtraction => Operators::SUBTRACTION,
            Multiplication => Operators::MULTIPLICATION,
            Division => Operators::DIVISION,
        }
    }

    pub const fn apply(self, a: u8, b: u8) -> u16 {
        let (a, b) = (a as u16, b as u16);
        use Operator::*;
        match self {
            Addition => a + b,
            Subtraction => a.saturating_sub(b),
            Multiplication => a * b,
            Division if b == 0 => 0,
            Division => a / b,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

bitflags! {
    /// Set of operators a round draws its problems from.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Operators: u8 {
        const ADDITION       = 1;
        const SUBTRACTION    = 1 << 1;
        const MULTIPLICATION = 1 << 2;
        const DIVISION       = 1 << 3;

        const ADD_SUB = Self::ADDITION.bits() | Self::SUBTRACTION.bits();
        const MUL_DIV = Self::MULTIPLICATION.bits() | Self::DIVISION.bits();
    }
}

impl Operators {
    /// Operators in the set, in declaration order.
    pub fn operators(self) -> impl Iterator<Item = Operator> {
        Operator::ALL
            .into_iter()
            .filter(move |op| self.contains(op.flag()))
    }
}

impl From<Operator> for Operators {
    fn from(op: Operator) -> Self {
        op.flag()
    }
}

/// A single arithmetic problem, immutable once generated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemSpec {
    operator: Operator,
    operand_a: u8,
    operand_b: u8,
    answer: u16,
}

impl ProblemSpec {
    /// Builds a problem computing the answer from the operands.
    ///
    /// Callers are expected to keep subtraction non-negative and division exact; the generator
    /// only produces such problems.
    pub const fn new(operator: Operator, operand_a: u8, operand_b: u8) -> Self {
        Self {
            operator,
            operand_a,
            operand_b,
            answer: operator.apply(operand_a, operand_b),
        }
    }

    pub const fn operator(&self) -> Operator {
        self.operator
    }

    pub const fn operand_a(&self) -> u8 {
        self.operand_a
    }

    pub const fn operand_b(&self) -> u8 {
        self.operand_b
    }

    pub const fn answer(&self) -> u16 {
        self.answer
    }

    pub const fn is_correct(&self, value: u16) -> bool {
        self.answer == value
    }
}

/// Renders as shown on an open tile, e.g. `7 + 5 =`.
impl fmt::Display for ProblemSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} =",
            self.operand_a, self.operator, self.operand_b
        )
    }
}
