use alloc::string::String;
use core::fmt;
use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Sub-state of an open tile.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProblemState {
    /// Accepting input.
    #[default]
    Normal,
    /// Answered correctly, waiting to reveal the image.
    CorrectPending,
    /// Answered incorrectly, waiting to clear the answer for another try.
    IncorrectPending,
    /// Out of tries, the correct answer is shown and the tile stays locked.
    IncorrectFinal,
}

impl ProblemState {
    pub const fn accepts_input(self) -> bool {
        matches!(self, Self::Normal)
    }

    /// Whether a deferred transition is pending, during which the whole session is locked.
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::CorrectPending | Self::IncorrectPending)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileState {
    #[default]
    Covered,
    Open(ProblemState),
    Revealed,
}

impl TileState {
    pub const fn is_covered(self) -> bool {
        matches!(self, Self::Covered)
    }

    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed)
    }

    pub const fn accepts_input(self) -> bool {
        matches!(self, Self::Open(ProblemState::Normal))
    }

    pub const fn is_pending(self) -> bool {
        match self {
            Self::Open(problem_state) => problem_state.is_pending(),
            _ => false,
        }
    }
}

/// Line shown below the answer once it was checked.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feedback {
    Correct,
    Incorrect,
    Solution(u16),
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Correct => write!(f, "Correct!"),
            Self::Incorrect => write!(f, "Incorrect"),
            Self::Solution(answer) => write!(f, "({answer})"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TileOutcome {
    NoChange,
    Changed,
}

impl TileOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

impl From<bool> for TileOutcome {
    fn from(changed: bool) -> Self {
        if changed { Self::Changed } else { Self::NoChange }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    NoChange,
    /// Correct before the last try, the tile is finished and reveals after a delay.
    Correct(TileRecord),
    /// Incorrect with tries left, the answer clears after a delay.
    Incorrect,
    /// The last try was used up, right or wrong. The tile is finished as incorrect.
    OutOfTries(TileRecord),
}

impl SubmitOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }

    pub const fn record(self) -> Option<TileRecord> {
        match self {
            Self::Correct(record) | Self::OutOfTries(record) => Some(record),
            Self::NoChange | Self::Incorrect => None,
        }
    }
}

/// State machine of a single tile: one problem, its answer and the time spent on it.
///
/// Every method is a no-op ([`TileOutcome::NoChange`]) when called in a state it does not apply
/// to. Time is passed in, so the tile never reads a clock by itself.
#[derive(Clone, Debug, PartialEq)]
pub struct TileController {
    id: TileId,
    segment: Segment,
    problem: ProblemSpec,
    problem_fixed: bool,
    entry: AnswerEntry,
    state: TileState,
    stopwatch: Stopwatch,
    max_tries: u8,
    completed: bool,
    highlighted: bool,
    caret_visible: bool,
    pub(crate) caret_timer: Option<TimerId>,
}

impl TileController {
    pub fn new(id: TileId, segment: Segment, problem: ProblemSpec, max_tries: u8) -> Self {
        Self {
            id,
            segment,
            problem,
            problem_fixed: false,
            entry: AnswerEntry::new(),
            state: TileState::Covered,
            stopwatch: Stopwatch::default(),
            max_tries: max_tries.max(1),
            completed: false,
            highlighted: false,
            caret_visible: true,
            caret_timer: None,
        }
    }

    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn segment(&self) -> Segment {
        self.segment
    }

    pub fn problem(&self) -> &ProblemSpec {
        &self.problem
    }

    pub fn entry(&self) -> &AnswerEntry {
        &self.entry
    }

    pub fn state(&self) -> TileState {
        self.state
    }

    pub fn tries(&self) -> u8 {
        self.entry.tries()
    }

    pub fn max_tries(&self) -> u8 {
        self.max_tries
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn caret_visible(&self) -> bool {
        self.caret_visible
    }

    pub fn elapsed(&self, now: Duration) -> Duration {
        self.stopwatch.elapsed(now)
    }

    pub fn is_timing(&self) -> bool {
        self.stopwatch.is_running()
    }

    /// The answer as displayed. A blinking caret only shows while input is accepted.
    pub fn answer_text(&self) -> String {
        let caret_visible = !self.state.accepts_input() || self.caret_visible;
        self.entry.render(caret_visible)
    }

    pub fn feedback(&self) -> Option<Feedback> {
        match self.state {
            TileState::Open(ProblemState::CorrectPending) => Some(Feedback::Correct),
            TileState::Open(ProblemState::IncorrectPending) => Some(Feedback::Incorrect),
            TileState::Open(ProblemState::IncorrectFinal) => {
                Some(Feedback::Solution(self.problem.answer()))
            }
            _ => None,
        }
    }

    /// Whether the caret should keep blinking.
    pub fn wants_caret(&self) -> bool {
        self.state == TileState::Open(ProblemState::Normal)
    }

    /// Covered → Open. The first opening replaces the problem drawn at creation with `fresh`,
    /// later openings keep it.
    pub fn open(&mut self, now: Duration, fresh: impl FnOnce() -> ProblemSpec) -> TileOutcome {
        if !self.state.is_covered() {
            return TileOutcome::NoChange;
        }
        if !self.problem_fixed {
            self.problem = fresh();
            self.problem_fixed = true;
        }
        self.state = TileState::Open(ProblemState::Normal);
        self.highlighted = false;
        self.caret_visible = true;
        self.stopwatch.start(now);
        log::debug!("{:?} open: {}", self.id, self.problem);
        TileOutcome::Changed
    }

    /// Open → Covered, discarding typed digits but keeping tries and elapsed time.
    pub fn cover(&mut self, now: Duration) -> TileOutcome {
        if !self.state.accepts_input() {
            return TileOutcome::NoChange;
        }
        self.stopwatch.stop(now);
        self.entry.clear();
        self.state = TileState::Covered;
        log::debug!("{:?} covered after {:?}", self.id, self.stopwatch.elapsed(now));
        TileOutcome::Changed
    }

    pub fn input_digit(&mut self, key: char) -> Result<TileOutcome> {
        let digit = key
            .to_digit(10)
            .filter(|_| key.is_ascii_digit())
            .ok_or(GameError::NotADigit(key))?;
        if !self.state.accepts_input() {
            return Ok(TileOutcome::NoChange);
        }
        let accepted = self.entry.push(digit as u8);
        if accepted {
            log::trace!("{:?} digit {}: {}", self.id, key, self.entry.render(true));
        }
        Ok(accepted.into())
    }

    pub fn backspace(&mut self) -> TileOutcome {
        if !self.state.accepts_input() {
            return TileOutcome::NoChange;
        }
        self.entry.pop().into()
    }

    pub fn submit(&mut self, now: Duration) -> SubmitOutcome {
        if !self.state.accepts_input() {
            return SubmitOutcome::NoChange;
        }
        let Some(value) = self.entry.value() else {
            return SubmitOutcome::NoChange;
        };

        let tries = self.entry.record_try();
        let elapsed = self.stopwatch.stop(now);

        // the last try is consumed by the cap, whatever was typed
        if tries >= self.max_tries {
            self.state = TileState::Open(ProblemState::IncorrectFinal);
            log::debug!("{:?} out of tries after {:?}", self.id, elapsed);
            SubmitOutcome::OutOfTries(self.complete(false, elapsed))
        } else if self.problem.is_correct(value) {
            self.state = TileState::Open(ProblemState::CorrectPending);
            log::debug!("{:?} correct on try {} after {:?}", self.id, tries, elapsed);
            SubmitOutcome::Correct(self.complete(true, elapsed))
        } else {
            self.state = TileState::Open(ProblemState::IncorrectPending);
            log::debug!("{:?} incorrect {} on try {}", self.id, value, tries);
            SubmitOutcome::Incorrect
        }
    }

    /// CorrectPending → Revealed.
    pub fn finish_reveal(&mut self) -> TileOutcome {
        if self.state != TileState::Open(ProblemState::CorrectPending) {
            return TileOutcome::NoChange;
        }
        self.state = TileState::Revealed;
        log::debug!("{:?} revealed", self.id);
        TileOutcome::Changed
    }

    /// IncorrectPending → Normal with an empty answer, resuming the clock.
    pub fn finish_retry(&mut self, now: Duration) -> TileOutcome {
        if self.state != TileState::Open(ProblemState::IncorrectPending) {
            return TileOutcome::NoChange;
        }
        self.entry.clear();
        self.state = TileState::Open(ProblemState::Normal);
        self.caret_visible = true;
        self.stopwatch.start(now);
        TileOutcome::Changed
    }

    pub fn toggle_caret(&mut self) -> TileOutcome {
        if !self.state.accepts_input() || self.entry.is_full() {
            return TileOutcome::NoChange;
        }
        self.caret_visible = !self.caret_visible;
        TileOutcome::Changed
    }

    pub fn set_highlight(&mut self, highlighted: bool) -> TileOutcome {
        let highlighted = highlighted && self.state.is_covered();
        if self.highlighted == highlighted {
            return TileOutcome::NoChange;
        }
        self.highlighted = highlighted;
        TileOutcome::Changed
    }

    fn complete(&mut self, correct: bool, elapsed: Duration) -> TileRecord {
        debug_assert!(!self.completed, "tile completed twice");
        self.completed = true;
        TileRecord {
            tile: self.id,
            correct,
            tries: self.entry.tries(),
            elapsed,
        }
    }
}
