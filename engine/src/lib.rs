#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick pipeline composing the world and the pure systems.
//!
//! One tick runs four stages in a fixed order on a clone of the previous
//! snapshot: combat, production, selection and finally consumption of the
//! one-shot click. Identical inputs always produce identical snapshots.

mod session;

pub use session::Session;

use towers_core::{Command, EngineError, Event, Rules, TickInput};
use towers_system_combat::Combat;
use towers_system_production::Production;
use towers_system_selection::Selection;
use towers_world::{self as world, GameState};
use tracing::trace;

/// Owns the systems and scratch buffers reused across ticks.
#[derive(Debug)]
pub struct Engine {
    rules: Rules,
    combat: Combat,
    production: Production,
    selection: Selection,
    commands: Vec<Command>,
}

impl Engine {
    /// Creates an engine whose systems all follow `rules`.
    #[must_use]
    pub fn new(rules: Rules) -> Self {
        Self {
            rules,
            combat: Combat::new(rules),
            production: Production::new(rules),
            selection: Selection::new(),
            commands: Vec::new(),
        }
    }

    /// Rules the engine was configured with.
    #[must_use]
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Produces the snapshot following `previous`.
    ///
    /// `previous` is never modified. The click carried by `input` is consumed
    /// once selection has seen it, so feeding the same record to the next tick
    /// only repeats the hover. Mutations are reported through `out_events` in
    /// the order they happened.
    pub fn tick(
        &mut self,
        previous: &GameState,
        input: &mut TickInput,
        out_events: &mut Vec<Event>,
    ) -> Result<GameState, EngineError> {
        let mut state = previous.clone();
        let first_event = out_events.len();

        self.combat.handle(&mut state, out_events)?;
        self.production.handle(&mut state, out_events)?;

        self.commands.clear();
        self.selection
            .handle(input, state.active, |point| state.tower_at(point), &mut self.commands);
        for command in self.commands.drain(..) {
            world::apply(&mut state, command, &self.rules, out_events)?;
        }

        let click = input.take_click();
        trace!(
            soldiers = state.soldiers.len(),
            events = out_events.len() - first_event,
            clicked = click.is_some(),
            "tick advanced"
        );

        Ok(state)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Rules::default())
    }
}

/// Advances `previous` by one tick with the stock rules, consuming the click.
pub fn tick(previous: &GameState, input: &mut TickInput) -> Result<GameState, EngineError> {
    let mut events = Vec::new();
    Engine::default().tick(previous, input, &mut events)
}
