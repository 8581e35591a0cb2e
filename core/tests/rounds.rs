use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use mathtiles_core::*;

struct Round {
    session: GameSession<ManualClock>,
    clock: ManualClock,
    events: Rc<RefCell<Vec<SessionEvent>>>,
}

impl Round {
    fn new(number_family: u8, grid_size: Coord, operators: Operators, seed: u64) -> Self {
        let clock = ManualClock::new();
        let config = GameConfig::new(number_family, grid_size, operators).unwrap();
        let mut session = GameSession::with_clock(config, clock.clone(), seed).unwrap();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        session.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        Self {
            session,
            clock,
            events,
        }
    }

    fn type_and_submit(&mut self, value: u16) -> InputOutcome {
        for key in value.to_string().chars() {
            self.session.input_digit(key).unwrap();
        }
        self.session.submit()
    }

    fn answer_of(&self, id: TileId) -> u16 {
        self.session.tile(id).unwrap().problem().answer()
    }

    fn wait(&mut self, millis: u64) {
        self.clock.advance_millis(millis);
        self.session.poll();
    }

    fn completions(&self) -> Vec<TileRecord> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                SessionEvent::TileCompleted(record) => Some(*record),
                _ => None,
            })
            .collect()
    }

    fn summaries(&self) -> Vec<GameSummary> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                SessionEvent::GameCompleted(summary) => Some(summary.clone()),
                _ => None,
            })
            .collect()
    }
}

#[test]
fn addition_tile_reveals_after_correct_answer() {
    let mut round = Round::new(5, 2, Operators::ADDITION, 7);

    round.session.open((0, 0)).unwrap();
    let tile = round.session.tile((0, 0)).unwrap();
    let problem = *tile.problem();
    assert_eq!(problem.operator(), Operator::Addition);
    assert_eq!(problem.operand_b(), 5);
    assert!(problem.operand_a() <= NUMBER_MAX);
    assert_eq!(tile.problem().to_string(), format!("{} + 5 =", problem.operand_a()));

    round.clock.advance_millis(3_200);
    let answer = round.answer_of((0, 0));
    assert_eq!(round.type_and_submit(answer), InputOutcome::Changed);

    let completions = round.completions();
    assert_eq!(completions.len(), 1);
    assert!(completions[0].correct);
    assert_eq!(completions[0].tries, 1);
    assert_eq!(completions[0].elapsed, Duration::from_millis(3_200));

    round.wait(1_500);
    assert_eq!(
        round.session.tile((0, 0)).unwrap().state(),
        TileState::Revealed
    );
}

#[test]
fn correct_on_third_try_ends_as_incorrect() {
    let mut round = Round::new(4, 2, Operators::MUL_DIV, 11);
    round.session.open((1, 1)).unwrap();
    let answer = round.answer_of((1, 1));

    for _ in 0..2 {
        round.type_and_submit(answer + 1);
        round.wait(1_000);
    }
    round.type_and_submit(answer);

    let completions = round.completions();
    assert_eq!(completions.len(), 1);
    assert!(!completions[0].correct);
    assert_eq!(completions[0].tries, 3);

    let tile = round.session.tile((1, 1)).unwrap();
    assert_eq!(tile.state(), TileState::Open(ProblemState::IncorrectFinal));
    assert_eq!(tile.feedback(), Some(Feedback::Solution(answer)));
    assert!(!round.session.is_locked());
}

#[test]
fn three_wrong_answers_lock_with_solution() {
    let mut round = Round::new(9, 2, Operators::ADD_SUB, 3);
    round.session.open((0, 1)).unwrap();
    let answer = round.answer_of((0, 1));

    for _ in 0..2 {
        round.type_and_submit(answer + 1);
        assert!(round.completions().is_empty());
        round.wait(1_000);
    }
    round.type_and_submit(answer + 2);

    let completions = round.completions();
    assert_eq!(completions.len(), 1);
    assert!(!completions[0].correct);
    assert_eq!(completions[0].tries, 3);

    let tile = round.session.tile((0, 1)).unwrap();
    assert_eq!(tile.state(), TileState::Open(ProblemState::IncorrectFinal));
    assert_eq!(tile.feedback(), Some(Feedback::Solution(answer)));
    // the locked tile takes no more input
    assert_eq!(round.session.input_digit('1').unwrap(), InputOutcome::Ignored);
}

#[test]
fn switching_tiles_preserves_elapsed_time() {
    let mut round = Round::new(2, 3, Operators::ADD_SUB, 5);

    round.session.open((0, 0)).unwrap();
    round.clock.advance_millis(2_000);
    round.session.open((2, 1)).unwrap();
    round.clock.advance_millis(10_000);

    let a = round.session.tile((0, 0)).unwrap();
    assert!(a.state().is_covered());
    assert_eq!(a.elapsed(round.clock.now()), Duration::from_millis(2_000));

    round.session.open((0, 0)).unwrap();
    round.clock.advance_millis(500);
    let answer = round.answer_of((0, 0));
    round.type_and_submit(answer);

    let record = round.completions()[0];
    assert_eq!(record.tile, (0, 0));
    assert_eq!(record.elapsed, Duration::from_millis(2_500));
}

#[test]
fn every_tile_completes_exactly_once_per_round() {
    for grid_size in GRID_SIZES {
        let mut round = Round::new(6, grid_size, Operators::MUL_DIV, u64::from(grid_size));
        let total = usize::from(grid_size) * usize::from(grid_size);

        for y in 0..grid_size {
            for x in 0..grid_size {
                let id = (x, y);
                round.session.open(id).unwrap();
                round.clock.advance_millis(750);
                let answer = round.answer_of(id);
                if (x + y) % 2 == 0 {
                    round.type_and_submit(answer);
                    round.wait(1_500);
                } else {
                    for _ in 0..3 {
                        round.type_and_submit(answer + 1);
                        round.wait(1_000);
                    }
                }
                // stray input after finalizing changes nothing
                assert_ne!(round.session.submit(), InputOutcome::Changed);
            }
        }

        let mut per_tile: BTreeMap<TileId, usize> = BTreeMap::new();
        for record in round.completions() {
            *per_tile.entry(record.tile).or_default() += 1;
        }
        assert_eq!(per_tile.len(), total);
        assert!(per_tile.values().all(|&count| count == 1));

        let summaries = round.summaries();
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.total(), total);
        assert_eq!(summary.number_correct(), total.div_ceil(2));
        assert_eq!(summary.average_elapsed(), Duration::from_millis(750));
        assert_eq!(round.session.summary(), Some(summary));
        assert!(
            summary
                .to_string()
                .ends_with("Average time: 00:00.75")
        );
    }
}

#[test]
fn new_game_discards_previous_round() {
    let mut round = Round::new(3, 2, Operators::ADD_SUB, 1);
    round.session.open((0, 0)).unwrap();
    let answer = round.answer_of((0, 0));
    round.type_and_submit(answer);

    round
        .session
        .configure(GameConfig::new(8, 4, Operators::MUL_DIV).unwrap())
        .unwrap();
    round.wait(10_000);

    assert!(round.session.records().is_empty());
    assert_eq!(round.session.tiles().count(), 16);
    assert!(round.session.tiles().all(|t| t.state().is_covered()));
    assert!(!round.session.is_locked());
    assert!(matches!(
        round.events.borrow().last(),
        Some(SessionEvent::Configured { grid_size: 4 })
    ));
}
