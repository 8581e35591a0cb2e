use alloc::boxed::Box;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Input forwarded by the presentation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Input {
    Open(TileId),
    Hover(TileId),
    Leave(TileId),
    Digit(char),
    Backspace,
    Submit,
}

/// What happened to the session, for the presentation to render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A new round was set up.
    Configured { grid_size: Coord },
    /// Something visible about the tile changed.
    TileChanged(TileId),
    /// The tile finalized, exactly once per tile and round.
    TileCompleted(TileRecord),
    /// Every tile of the round finalized.
    GameCompleted(GameSummary),
}

/// How the session reacted to an input.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InputOutcome {
    /// Not applicable in the current state.
    Ignored,
    /// Rejected because a result is being shown.
    Locked,
    Changed,
}

impl InputOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

impl From<TileOutcome> for InputOutcome {
    fn from(outcome: TileOutcome) -> Self {
        if outcome.has_update() {
            Self::Changed
        } else {
            Self::Ignored
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(usize);

type Handler = Box<dyn FnMut(&SessionEvent)>;

/// Fans session events out to the registered handlers, in registration order.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<(HandlerId, Handler)>,
    next_id: usize,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&SessionEvent) + 'static) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    pub fn unsubscribe(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        before != self.handlers.len()
    }

    pub fn emit(&mut self, event: &SessionEvent) {
        log::trace!("event: {:?}", event);
        for (_, handler) in self.handlers.iter_mut() {
            handler(event);
        }
    }
}

impl core::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
