#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative state for the Towers simulation.
//!
//! [`GameState`] is an arena: towers are addressed by [`TowerId`] handles that
//! stay valid for the lifetime of a game because towers are never reordered or
//! removed. Links and soldiers store handles, never references. Each tick the
//! engine clones the previous snapshot and mutates the clone, so a snapshot
//! handed out by the engine is never touched again.

mod soldiers;
mod towers;

pub use soldiers::Soldier;
pub use towers::{Link, Tower};

use serde::{Deserialize, Serialize};
use towers_core::{
    Command, EngineError, Event, GridPoint, LinkRejection, Rules, Team, TowerId, TowerKind,
};
use tracing::debug;

const DEFAULT_GRID_WIDTH: u32 = 20;
const DEFAULT_GRID_HEIGHT: u32 = 10;

/// Complete snapshot of the simulation between two ticks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Number of grid columns shown to the player.
    pub grid_width: u32,
    /// Number of grid rows shown to the player.
    pub grid_height: u32,
    /// Tower arena, addressed by [`TowerId`].
    pub towers: Vec<Tower>,
    /// Soldiers currently walking a leg.
    pub soldiers: Vec<Soldier>,
    /// Tower under the pointer during the last tick.
    pub hovered: Option<TowerId>,
    /// Tower selected by the player, kept until the next click.
    pub active: Option<TowerId>,
}

impl GameState {
    /// Creates a state holding `towers` and no soldiers or selection.
    #[must_use]
    pub fn new(grid_width: u32, grid_height: u32, towers: Vec<Tower>) -> Self {
        Self {
            grid_width,
            grid_height,
            towers,
            soldiers: Vec::new(),
            hovered: None,
            active: None,
        }
    }

    /// Handles of every tower in arena order.
    pub fn tower_ids(&self) -> impl Iterator<Item = TowerId> {
        (0..self.towers.len()).map(|index| TowerId::new(index as u32))
    }

    /// Looks up the tower addressed by `id`.
    pub fn tower(&self, id: TowerId) -> Result<&Tower, EngineError> {
        let count = self.towers.len();
        self.towers
            .get(id.index())
            .ok_or(EngineError::UnknownTower { tower: id, count })
    }

    /// Looks up the tower addressed by `id` for mutation.
    pub fn tower_mut(&mut self, id: TowerId) -> Result<&mut Tower, EngineError> {
        let count = self.towers.len();
        self.towers
            .get_mut(id.index())
            .ok_or(EngineError::UnknownTower { tower: id, count })
    }

    /// First tower whose unit cell contains `point`.
    #[must_use]
    pub fn tower_at(&self, point: GridPoint) -> Option<TowerId> {
        self.towers
            .iter()
            .position(|tower| point.within_cell(tower.position))
            .map(|index| TowerId::new(index as u32))
    }

    /// Adds the link `source -> target`, or removes it when it already exists.
    ///
    /// Removing is always allowed, so an existing link is looked up before
    /// capacity is checked; a capacity-first order would make a tower at its
    /// limit unable to drop a link by toggling it. Adding is refused when the
    /// source already holds as many links as its strength permits, and for
    /// routes with no length. A new link between same-team towers replaces the
    /// reverse link.
    pub fn toggle_link(
        &mut self,
        source: TowerId,
        target: TowerId,
        rules: &Rules,
        out_events: &mut Vec<Event>,
    ) -> Result<(), EngineError> {
        let target_tower = self.tower(target)?;
        let target_position = target_tower.position;
        let target_team = target_tower.team;

        let source_tower = self.tower_mut(source)?;
        let rejection = if source == target {
            Some(LinkRejection::SelfLink)
        } else if let Some(position) = source_tower.link_position(target) {
            let _ = source_tower.links.remove(position);
            debug!(%source, %target, "link removed");
            out_events.push(Event::LinkRemoved { source, target });
            return Ok(());
        } else if source_tower.position == target_position {
            Some(LinkRejection::CoincidentTowers)
        } else if source_tower.links.len() >= source_tower.capacity() {
            Some(LinkRejection::AtCapacity)
        } else {
            None
        };

        if let Some(reason) = rejection {
            debug!(%source, %target, ?reason, "link rejected");
            out_events.push(Event::LinkRejected {
                source,
                target,
                reason,
            });
            return Ok(());
        }

        source_tower.links.push(Link::fresh(target, rules));
        let same_team = source_tower.team == target_team;
        debug!(%source, %target, "link added");
        out_events.push(Event::LinkAdded { source, target });

        if same_team {
            let reverse = self.tower_mut(target)?;
            if let Some(position) = reverse.link_position(source) {
                let _ = reverse.links.remove(position);
                debug!(source = %target, target = %source, "reverse link replaced");
                out_events.push(Event::LinkRemoved {
                    source: target,
                    target: source,
                });
            }
        }

        Ok(())
    }
}

/// Applies the provided command to the state, reporting the resulting mutations.
pub fn apply(
    state: &mut GameState,
    command: Command,
    rules: &Rules,
    out_events: &mut Vec<Event>,
) -> Result<(), EngineError> {
    match command {
        Command::SetHovered { tower } => {
            if let Some(id) = tower {
                let _ = state.tower(id)?;
            }
            if state.hovered != tower {
                state.hovered = tower;
                out_events.push(Event::HoverChanged { tower });
            }
        }
        Command::SelectTower { tower } => {
            let _ = state.tower(tower)?;
            state.active = Some(tower);
            debug!(%tower, "tower selected");
            out_events.push(Event::TowerSelected { tower });
        }
        Command::ToggleLink { source, target } => {
            state.toggle_link(source, target, rules, out_events)?;
        }
        Command::ClearSelection => {
            if state.active.take().is_some() {
                out_events.push(Event::SelectionCleared);
            }
        }
    }

    Ok(())
}

/// Builds the stock three-tower board.
#[must_use]
pub fn default_state() -> GameState {
    GameState::new(
        DEFAULT_GRID_WIDTH,
        DEFAULT_GRID_HEIGHT,
        vec![
            Tower::new(1.0, 1.0)
                .with_value(65)
                .with_team(Team::Blue)
                .with_links(&[TowerId::new(2), TowerId::new(1)]),
            Tower::new(10.0, 6.0)
                .with_value(6)
                .with_kind(TowerKind::Defense)
                .with_team(Team::Purple),
            Tower::new(15.0, 4.0)
                .with_value(10)
                .with_kind(TowerKind::Attack)
                .with_team(Team::Red)
                .with_links(&[TowerId::new(0)]),
        ],
    )
}

/// Query functions that provide read-only access to the state.
pub mod query {
    use super::GameState;
    use towers_core::{Team, TowerId};

    /// Directed links in arena order as `(source, target)` pairs.
    pub fn links(state: &GameState) -> impl Iterator<Item = (TowerId, TowerId)> + '_ {
        state
            .tower_ids()
            .zip(state.towers.iter())
            .flat_map(|(source, tower)| tower.links.iter().map(move |link| (source, link.target)))
    }

    /// Reports whether `a` and `b` route soldiers to each other.
    #[must_use]
    pub fn is_two_way(state: &GameState, a: TowerId, b: TowerId) -> bool {
        let forward = state.tower(a).map_or(false, |tower| tower.links_to(b));
        let backward = state.tower(b).map_or(false, |tower| tower.links_to(a));
        forward && backward
    }

    /// Number of towers owned by `team`.
    #[must_use]
    pub fn towers_owned(state: &GameState, team: Team) -> usize {
        state.towers.iter().filter(|tower| tower.team == team).count()
    }

    /// Combined strength of the towers owned by `team`.
    #[must_use]
    pub fn team_strength(state: &GameState, team: Team) -> u32 {
        state
            .towers
            .iter()
            .filter(|tower| tower.team == team)
            .map(|tower| tower.value)
            .sum()
    }

    /// Number of living soldiers fighting for `team`.
    #[must_use]
    pub fn soldiers_fielded(state: &GameState, team: Team) -> usize {
        state
            .soldiers
            .iter()
            .filter(|soldier| soldier.team == team && soldier.is_alive())
            .count()
    }
}
