use alloc::boxed::Box;
use alloc::vec::Vec;
use core::time::Duration;
use ndarray::Array2;

use crate::*;

/// One round of the game: owns the tiles, routes input to them and aggregates their results.
///
/// All transitions run on the caller's thread, driven by [`GameSession::handle`] (or the matching
/// methods) and [`GameSession::poll`] for transitions that are due. At most one tile accepts
/// input at a time, and while a tile shows a pending result every input is rejected.
#[derive(Debug)]
pub struct GameSession<C = MonotonicClock> {
    config: GameConfig,
    rules: TileRules,
    clock: C,
    generator: Box<dyn ProblemGenerator>,
    tiles: Array2<TileController>,
    records: Vec<TileRecord>,
    summary: Option<GameSummary>,
    active: Option<TileId>,
    locked_by: Option<TileId>,
    timers: TimerQueue,
    dispatcher: EventDispatcher,
}

impl GameSession<MonotonicClock> {
    pub fn new(config: GameConfig, seed: u64) -> Result<Self> {
        Self::with_clock(config, MonotonicClock::new(), seed)
    }
}

impl<C: Clock> GameSession<C> {
    pub fn with_clock(config: GameConfig, clock: C, seed: u64) -> Result<Self> {
        Self::with_parts(
            config,
            TileRules::default(),
            clock,
            Box::new(RandomProblemGenerator::new(seed)),
        )
    }

    pub fn with_parts(
        config: GameConfig,
        rules: TileRules,
        clock: C,
        mut generator: Box<dyn ProblemGenerator>,
    ) -> Result<Self> {
        config.validate()?;
        let tiles = build_tiles(&config, &rules, generator.as_mut());
        Ok(Self {
            config,
            rules,
            clock,
            generator,
            tiles,
            records: Vec::new(),
            summary: None,
            active: None,
            locked_by: None,
            timers: TimerQueue::new(),
            dispatcher: EventDispatcher::new(),
        })
    }

    /// Starts a new round, discarding every tile, record and pending timer of the previous one.
    /// Out of range options are rejected and leave the current round untouched.
    pub fn configure(&mut self, config: GameConfig) -> Result<()> {
        config.validate()?;
        self.start_round(config);
        Ok(())
    }

    /// Starts over with the current options.
    pub fn restart(&mut self) {
        self.start_round(self.config.clone());
    }

    fn start_round(&mut self, config: GameConfig) {
        let size = config.grid_size;
        log::debug!(
            "new game: {}x{}, family {}, operators {:?}, picture {:?}",
            size,
            size,
            config.number_family,
            config.operators,
            config.picture.as_ref().map(|p| p.label())
        );

        self.timers.reset();
        self.records.clear();
        self.summary = None;
        self.active = None;
        self.locked_by = None;

        self.tiles = build_tiles(&config, &self.rules, self.generator.as_mut());
        self.config = config;

        self.dispatcher
            .emit(&SessionEvent::Configured { grid_size: size });
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&SessionEvent) + 'static) -> HandlerId {
        self.dispatcher.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: HandlerId) -> bool {
        self.dispatcher.unsubscribe(id)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn rules(&self) -> &TileRules {
        &self.rules
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn grid_size(&self) -> Coord {
        self.config.grid_size
    }

    pub fn tile(&self, id: TileId) -> Result<&TileController> {
        self.validate_coords(id).map(|id| &self.tiles[id.to_nd_index()])
    }

    pub fn tiles(&self) -> impl Iterator<Item = &TileController> {
        self.tiles.iter()
    }

    /// Tile currently receiving digits, if any.
    pub fn active_tile(&self) -> Option<TileId> {
        self.active
    }

    pub fn is_locked(&self) -> bool {
        self.locked_by.is_some()
    }

    pub fn records(&self) -> &[TileRecord] {
        &self.records
    }

    pub fn summary(&self) -> Option<&GameSummary> {
        self.summary.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.summary.is_some()
    }

    /// Time the next deferred transition is due, for drivers that sleep between polls.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    pub fn handle(&mut self, input: Input) -> Result<InputOutcome> {
        match input {
            Input::Open(id) => self.open(id),
            Input::Hover(id) => self.hover(id),
            Input::Leave(id) => self.leave(id),
            Input::Digit(key) => self.input_digit(key),
            Input::Backspace => Ok(self.backspace()),
            Input::Submit => Ok(self.submit()),
        }
    }

    /// Opens a covered tile, covering whichever tile was open before.
    pub fn open(&mut self, id: TileId) -> Result<InputOutcome> {
        let id = self.validate_coords(id)?;
        if self.check_unlocked().is_err() {
            return Ok(InputOutcome::Locked);
        }
        if !self.tile_at(id).state().is_covered() {
            return Ok(InputOutcome::Ignored);
        }

        let now = self.clock.now();
        if let Some(previous) = self.active.take() {
            self.cancel_caret(previous);
            if self.tile_at_mut(previous).cover(now).has_update() {
                self.emit(SessionEvent::TileChanged(previous));
            }
        }

        let (operators, family) = (self.config.operators, self.config.number_family);
        let generator = &mut self.generator;
        let tile = &mut self.tiles[id.to_nd_index()];
        let outcome = tile.open(now, || generator.generate(operators, family));

        self.active = Some(id);
        self.schedule_caret(id, now);
        self.emit(SessionEvent::TileChanged(id));
        Ok(outcome.into())
    }

    pub fn hover(&mut self, id: TileId) -> Result<InputOutcome> {
        let id = self.validate_coords(id)?;
        if self.check_unlocked().is_err() {
            return Ok(InputOutcome::Locked);
        }
        if !self.tile_at(id).state().is_covered() {
            return Ok(InputOutcome::Ignored);
        }

        let others: Vec<TileId> = self
            .tiles
            .iter()
            .filter(|tile| tile.id() != id && tile.is_highlighted())
            .map(|tile| tile.id())
            .collect();
        for other in others {
            self.tile_at_mut(other).set_highlight(false);
            self.emit(SessionEvent::TileChanged(other));
        }

        let outcome = self.tile_at_mut(id).set_highlight(true);
        if outcome.has_update() {
            self.emit(SessionEvent::TileChanged(id));
        }
        Ok(outcome.into())
    }

    pub fn leave(&mut self, id: TileId) -> Result<InputOutcome> {
        let id = self.validate_coords(id)?;
        let outcome = self.tile_at_mut(id).set_highlight(false);
        if outcome.has_update() {
            self.emit(SessionEvent::TileChanged(id));
        }
        Ok(outcome.into())
    }

    /// Types a digit into the open tile. Keys other than `0`-`9` are rejected with an error.
    pub fn input_digit(&mut self, key: char) -> Result<InputOutcome> {
        if !key.is_ascii_digit() {
            log::debug!("rejected key {:?}", key);
            return Err(GameError::NotADigit(key));
        }
        let id = match self.input_target() {
            Ok(id) => id,
            Err(outcome) => return Ok(outcome),
        };
        let outcome = self.tile_at_mut(id).input_digit(key)?;
        if outcome.has_update() {
            self.emit(SessionEvent::TileChanged(id));
        }
        Ok(outcome.into())
    }

    pub fn backspace(&mut self) -> InputOutcome {
        let id = match self.input_target() {
            Ok(id) => id,
            Err(outcome) => return outcome,
        };
        let outcome = self.tile_at_mut(id).backspace();
        if outcome.has_update() {
            self.emit(SessionEvent::TileChanged(id));
        }
        outcome.into()
    }

    /// Checks the typed answer of the open tile.
    pub fn submit(&mut self) -> InputOutcome {
        let id = match self.input_target() {
            Ok(id) => id,
            Err(outcome) => return outcome,
        };
        let now = self.clock.now();
        let timings = self.rules.timings;

        match self.tile_at_mut(id).submit(now) {
            SubmitOutcome::NoChange => return InputOutcome::Ignored,
            SubmitOutcome::Correct(record) => {
                self.cancel_caret(id);
                self.locked_by = Some(id);
                self.timers
                    .schedule(now + timings.correct_reveal, Deferred::Reveal(id));
                self.emit(SessionEvent::TileChanged(id));
                self.on_tile_completed(record);
            }
            SubmitOutcome::Incorrect => {
                self.cancel_caret(id);
                self.locked_by = Some(id);
                self.timers
                    .schedule(now + timings.incorrect_retry, Deferred::Retry(id));
                self.emit(SessionEvent::TileChanged(id));
            }
            SubmitOutcome::OutOfTries(record) => {
                self.cancel_caret(id);
                self.active = None;
                self.emit(SessionEvent::TileChanged(id));
                self.on_tile_completed(record);
            }
        }
        InputOutcome::Changed
    }

    /// Runs every deferred transition that is due, returns how many ran.
    pub fn poll(&mut self) -> usize {
        let mut fired_count = 0;
        loop {
            let now = self.clock.now();
            let Some(fired) = self.timers.pop_due(now) else {
                break;
            };
            if !self.timers.is_current(&fired) {
                log::warn!("dropping stale timer {:?}", fired);
                continue;
            }
            self.fire(fired, now);
            fired_count += 1;
        }
        fired_count
    }

    fn fire(&mut self, fired: Fired, now: Duration) {
        let Fired { id: timer, action, .. } = fired;
        match action {
            Deferred::Reveal(id) => {
                let outcome = self.tile_at_mut(id).finish_reveal();
                self.release_lock(id);
                if self.active == Some(id) {
                    self.active = None;
                }
                if outcome.has_update() {
                    self.emit(SessionEvent::TileChanged(id));
                }
            }
            Deferred::Retry(id) => {
                let outcome = self.tile_at_mut(id).finish_retry(now);
                self.release_lock(id);
                if outcome.has_update() {
                    self.schedule_caret(id, now);
                    self.emit(SessionEvent::TileChanged(id));
                }
            }
            Deferred::CaretBlink(id) => {
                let tile = self.tile_at_mut(id);
                if tile.caret_timer != Some(timer) {
                    log::warn!("caret timer {:?} of {:?} was superseded", timer, id);
                    return;
                }
                tile.caret_timer = None;
                let outcome = tile.toggle_caret();
                let keep_blinking = tile.wants_caret();
                if keep_blinking {
                    self.schedule_caret(id, now);
                }
                if outcome.has_update() {
                    self.emit(SessionEvent::TileChanged(id));
                }
            }
        }
    }

    fn on_tile_completed(&mut self, record: TileRecord) {
        self.records.push(record);
        self.emit(SessionEvent::TileCompleted(record));

        let total = usize::from(self.config.total_tiles());
        if self.records.len() == total && self.summary.is_none() {
            let summary = GameSummary::new(self.records.clone());
            log::debug!(
                "game completed: {} of {} correct",
                summary.number_correct(),
                summary.total()
            );
            self.summary = Some(summary.clone());
            self.emit(SessionEvent::GameCompleted(summary));
        }
    }

    /// The tile input goes to, or the outcome to report when there is none.
    fn input_target(&self) -> core::result::Result<TileId, InputOutcome> {
        if self.check_unlocked().is_err() {
            return Err(InputOutcome::Locked);
        }
        self.active.ok_or(InputOutcome::Ignored)
    }

    fn check_unlocked(&self) -> core::result::Result<(), TileId> {
        match self.locked_by {
            Some(id) => {
                log::warn!("input rejected while {:?} shows its result", id);
                Err(id)
            }
            None => Ok(()),
        }
    }

    fn release_lock(&mut self, id: TileId) {
        if self.locked_by == Some(id) {
            self.locked_by = None;
        }
    }

    fn schedule_caret(&mut self, id: TileId, now: Duration) {
        self.cancel_caret(id);
        let due = now + self.rules.timings.caret_blink;
        let timer = self.timers.schedule(due, Deferred::CaretBlink(id));
        self.tile_at_mut(id).caret_timer = Some(timer);
    }

    fn cancel_caret(&mut self, id: TileId) {
        if let Some(timer) = self.tile_at_mut(id).caret_timer.take() {
            self.timers.cancel(timer);
        }
    }

    fn emit(&mut self, event: SessionEvent) {
        self.dispatcher.emit(&event);
    }

    fn validate_coords(&self, coords: TileId) -> Result<TileId> {
        let size = self.config.grid_size;
        if coords.0 < size && coords.1 < size {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    fn tile_at(&self, id: TileId) -> &TileController {
        &self.tiles[id.to_nd_index()]
    }

    fn tile_at_mut(&mut self, id: TileId) -> &mut TileController {
        &mut self.tiles[id.to_nd_index()]
    }
}

/// Every tile starts covered with a problem drawn up front.
fn build_tiles(
    config: &GameConfig,
    rules: &TileRules,
    generator: &mut dyn ProblemGenerator,
) -> Array2<TileController> {
    let size = config.grid_size;
    Array2::from_shape_fn([usize::from(size); 2], |(x, y)| {
        let id = (x as Coord, y as Coord);
        let problem = generator.generate(config.operators, config.number_family);
        TileController::new(id, Segment::new(id, size), problem, rules.max_tries)
    })
}
