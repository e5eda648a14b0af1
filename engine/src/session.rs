use towers_core::{EngineError, Event, GridPoint, Rules, TickInput};
use towers_world::GameState;
use tracing::debug;

use crate::Engine;

/// Fixed-cadence driver holding the two most recent snapshots.
///
/// Adapters feed pointer input between ticks and read `previous` and
/// `current` to interpolate what they draw. A click latched with
/// [`Session::register_click`] is seen by exactly one tick.
#[derive(Debug)]
pub struct Session {
    engine: Engine,
    previous: GameState,
    current: GameState,
    input: TickInput,
    ticks: u64,
    events: Vec<Event>,
}

impl Session {
    /// Starts a session on `initial`, which serves as both snapshots.
    #[must_use]
    pub fn new(initial: GameState, rules: Rules) -> Self {
        Self {
            engine: Engine::new(rules),
            previous: initial.clone(),
            current: initial,
            input: TickInput::default(),
            ticks: 0,
            events: Vec::new(),
        }
    }

    /// Records the grid position currently under the pointer.
    pub fn set_hover(&mut self, hover: GridPoint) {
        self.input.hover = hover;
    }

    /// Latches a click for the next tick, replacing any pending click.
    pub fn register_click(&mut self, position: GridPoint) {
        if let Some(dropped) = self.input.click.replace(position) {
            debug!(?dropped, ?position, "pending click superseded");
        }
    }

    /// Runs one tick and returns the events it produced.
    pub fn step(&mut self) -> Result<&[Event], EngineError> {
        self.events.clear();
        let next = self
            .engine
            .tick(&self.current, &mut self.input, &mut self.events)?;
        self.previous = std::mem::replace(&mut self.current, next);
        self.ticks += 1;
        Ok(&self.events)
    }

    /// Snapshot before the most recent tick.
    #[must_use]
    pub const fn previous(&self) -> &GameState {
        &self.previous
    }

    /// Snapshot after the most recent tick.
    #[must_use]
    pub const fn current(&self) -> &GameState {
        &self.current
    }

    /// Number of ticks run so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Rules driving the session.
    #[must_use]
    pub const fn rules(&self) -> &Rules {
        self.engine.rules()
    }
}
