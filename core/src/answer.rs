use alloc::string::String;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Number of digit slots in an answer.
pub const ANSWER_SLOTS: usize = 3;

/// What a single answer slot shows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    Blank,
    /// The slot the next digit lands in, blinking between visible and hidden.
    Cursor(bool),
    Digit(u8),
}

impl Slot {
    pub const fn glyph(self) -> char {
        match self {
            Self::Blank | Self::Cursor(true) => '_',
            Self::Cursor(false) => ' ',
            Self::Digit(d) => (b'0' + d) as char,
        }
    }
}

/// Right-aligned digit buffer: digits enter at the rightmost slot and shift left as more are
/// typed, so `5` then `7` shows as `_57`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEntry {
    digits: SmallVec<[u8; ANSWER_SLOTS]>,
    tries: u8,
}

impl AnswerEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.digits.len() >= ANSWER_SLOTS
    }

    /// An answer can be submitted as soon as the rightmost slot holds a digit.
    pub fn is_submittable(&self) -> bool {
        !self.is_empty()
    }

    pub fn tries(&self) -> u8 {
        self.tries
    }

    /// Slot index the next digit is written to, `None` when every slot is taken.
    pub fn cursor(&self) -> Option<usize> {
        ANSWER_SLOTS.checked_sub(self.digits.len() + 1)
    }

    /// Appends a digit (`0..=9`), returns whether it was accepted.
    pub fn push(&mut self, digit: u8) -> bool {
        if digit > 9 || self.is_full() {
            return false;
        }
        self.digits.push(digit);
        true
    }

    /// Drops the most recently typed digit, returns whether there was one.
    pub fn pop(&mut self) -> bool {
        self.digits.pop().is_some()
    }

    /// Discards typed digits, tries are kept.
    pub fn clear(&mut self) {
        self.digits.clear();
    }

    pub(crate) fn record_try(&mut self) -> u8 {
        self.tries = self.tries.saturating_add(1);
        self.tries
    }

    pub fn value(&self) -> Option<u16> {
        if self.is_empty() {
            return None;
        }
        Some(
            self.digits
                .iter()
                .fold(0u16, |acc, &d| acc * 10 + u16::from(d)),
        )
    }

    pub fn slots(&self, caret_visible: bool) -> [Slot; ANSWER_SLOTS] {
        let mut slots = [Slot::Blank; ANSWER_SLOTS];
        let offset = ANSWER_SLOTS - self.digits.len();
        for (slot, &digit) in slots[offset..].iter_mut().zip(self.digits.iter()) {
            *slot = Slot::Digit(digit);
        }
        if let Some(cursor) = self.cursor() {
            slots[cursor] = Slot::Cursor(caret_visible);
        }
        slots
    }

    pub fn render(&self, caret_visible: bool) -> String {
        self.slots(caret_visible).iter().map(|s| s.glyph()).collect()
    }
}
