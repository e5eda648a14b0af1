#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Towers engine.
//!
//! This crate defines the vocabulary that connects adapters, the authoritative
//! world, and the per-tick systems. Adapters hand the engine a [`TickInput`]
//! describing the pointer, pure systems respond with [`Command`] values, the
//! world applies those commands and reports every mutation as an [`Event`].
//! Programming-contract violations surface as [`EngineError`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Strength at which a tower may hold three outgoing links.
const HIGH_CAPACITY_THRESHOLD: u32 = 30;
/// Strength at which a tower may hold two outgoing links.
const MEDIUM_CAPACITY_THRESHOLD: u32 = 10;

/// Stable handle addressing a tower inside the world arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Position of the tower inside the arena.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for TowerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tower#{}", self.0)
    }
}

/// Allegiance of a tower or soldier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// Unclaimed towers.
    #[default]
    None,
    /// Red faction.
    Red,
    /// Blue faction.
    Blue,
    /// Purple faction.
    Purple,
}

/// Closed set of tower archetypes and their combat stat table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Balanced tower.
    #[default]
    Regular,
    /// Spawns soldiers that hit harder.
    Attack,
    /// Spawns soldiers that absorb more.
    Defense,
}

impl TowerKind {
    /// Attack power stamped onto soldiers spawned by this kind of tower.
    #[must_use]
    pub const fn attack_power(self) -> u32 {
        match self {
            Self::Attack => 2,
            Self::Regular | Self::Defense => 1,
        }
    }

    /// Defense power stamped onto soldiers spawned by this kind of tower.
    #[must_use]
    pub const fn defense_power(self) -> u32 {
        match self {
            Self::Defense => 2,
            Self::Regular | Self::Attack => 1,
        }
    }
}

/// Maximum number of outgoing links a tower holding `value` strength may keep.
#[must_use]
pub const fn link_capacity(value: u32) -> usize {
    if value >= HIGH_CAPACITY_THRESHOLD {
        3
    } else if value >= MEDIUM_CAPACITY_THRESHOLD {
        2
    } else {
        1
    }
}

/// Continuous position measured in grid units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl GridPoint {
    /// Creates a new grid point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: GridPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Reports whether the point lies inside the unit cell anchored at `cell`.
    ///
    /// The cell is half-open: its left and top edges are inside, its right and
    /// bottom edges belong to the neighbouring cells.
    #[must_use]
    pub fn within_cell(self, cell: GridPoint) -> bool {
        self.x >= cell.x && self.x < cell.x + 1.0 && self.y >= cell.y && self.y < cell.y + 1.0
    }
}

/// Reports whether a body travelling along `(dx, dy)` and now at `position`
/// has reached or moved beyond `point` on both axes.
///
/// Each axis is judged in the direction of travel, so a body moving towards
/// negative coordinates has passed once it is at or below the point. A zero
/// component counts as travelling towards positive coordinates.
#[must_use]
pub fn has_passed(dx: f64, dy: f64, position: GridPoint, point: GridPoint) -> bool {
    let reached_x = (dx >= 0.0 && position.x >= point.x) || (dx < 0.0 && position.x <= point.x);
    let reached_y = (dy >= 0.0 && position.y >= point.y) || (dy < 0.0 && position.y <= point.y);
    reached_x && reached_y
}

/// Pointer input supplied to a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Grid position currently under the pointer.
    pub hover: GridPoint,
    /// Grid position of a click that happened since the previous tick.
    pub click: Option<GridPoint>,
}

impl TickInput {
    /// Creates an input record with the pointer hovering at `hover` and no click.
    #[must_use]
    pub const fn hovering(hover: GridPoint) -> Self {
        Self { hover, click: None }
    }

    /// Returns a copy of the input carrying a click at `position`.
    #[must_use]
    pub const fn with_click(mut self, position: GridPoint) -> Self {
        self.click = Some(position);
        self
    }

    /// Returns the pending click, clearing it so it is processed at most once.
    pub fn take_click(&mut self) -> Option<GridPoint> {
        self.click.take()
    }
}

/// Tunable constants that drive the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    /// Spawn delay, in ticks, of a tower sitting at the low end of the interpolation.
    pub active_delay_min: f64,
    /// Spawn delay, in ticks, of a tower sitting at the high end of the interpolation.
    pub active_delay_max: f64,
    /// Ticks an unlinked tower waits before regenerating one point.
    pub inactive_delay: u32,
    /// Ticks a soldier needs to cross one grid unit.
    pub ticks_per_unit: f64,
    /// Cadence counter assigned to links created by the player.
    pub fresh_link_ticks: u32,
    /// Capacity given to towers that do not specify one.
    pub default_max_value: u32,
    /// Strength given to towers that do not specify one.
    pub default_value: u32,
    /// Wall-clock time between ticks when driven in real time.
    pub tick_interval: Duration,
}

impl Rules {
    /// Creates the stock rule set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            active_delay_min: 30.0,
            active_delay_max: 40.0,
            inactive_delay: 50,
            ticks_per_unit: 10.0,
            fresh_link_ticks: 50,
            default_max_value: 65,
            default_value: 10,
            tick_interval: Duration::from_millis(50),
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutations a pure system may request from the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Records which tower, if any, sits under the pointer.
    SetHovered {
        /// Tower under the pointer.
        tower: Option<TowerId>,
    },
    /// Marks a tower as the player's current selection.
    SelectTower {
        /// Tower to select.
        tower: TowerId,
    },
    /// Adds the link `source -> target`, or removes it when it already exists.
    ToggleLink {
        /// Tower that owns the link.
        source: TowerId,
        /// Destination of the link.
        target: TowerId,
    },
    /// Drops the player's current selection.
    ClearSelection,
}

/// Reasons a link toggle was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkRejection {
    /// The source tower already holds as many links as its value allows.
    AtCapacity,
    /// A tower cannot route soldiers to itself.
    SelfLink,
    /// The two towers share a position, leaving no route between them.
    CoincidentTowers,
}

/// Mutations reported by the world while advancing a tick.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A tower emitted a soldier onto one of its links.
    SoldierSpawned {
        /// Tower the soldier leaves from.
        source: TowerId,
        /// Tower the soldier walks towards.
        target: TowerId,
        /// Team the soldier fights for.
        team: Team,
    },
    /// Two opposing soldiers met on the same link.
    ///
    /// The attacker is the soldier whose advance triggered the clash; the
    /// defender walks the reverse leg, from `target` to `source`.
    SoldiersClashed {
        /// Team of the attacker.
        attacker: Team,
        /// Team of the defender.
        defender: Team,
        /// Tower the attacker's leg starts at.
        source: TowerId,
        /// Tower the attacker's leg ends at.
        target: TowerId,
        /// Whether the attacker survived the exchange.
        attacker_survived: bool,
    },
    /// A soldier was removed after losing a clash.
    SoldierPerished {
        /// Team of the fallen soldier.
        team: Team,
        /// Link leg the soldier was walking.
        source: TowerId,
        /// Destination of the leg.
        target: TowerId,
    },
    /// A soldier strengthened a friendly tower.
    TowerReinforced {
        /// Tower that received the soldier.
        tower: TowerId,
        /// Strength after reinforcement.
        value: u32,
    },
    /// A soldier weakened an enemy tower without capturing it.
    TowerDamaged {
        /// Tower that was hit.
        tower: TowerId,
        /// Strength after the hit.
        value: u32,
    },
    /// A tower changed hands.
    TowerCaptured {
        /// Tower that was taken.
        tower: TowerId,
        /// Previous owner.
        from: Team,
        /// New owner.
        to: Team,
    },
    /// A full tower forwarded an arriving soldier along one of its links.
    SoldierRerouted {
        /// Tower that forwarded the soldier.
        via: TowerId,
        /// New destination.
        target: TowerId,
        /// Tower where the soldier's journey began.
        original_source: TowerId,
    },
    /// An idle tower regained strength.
    TowerRegenerated {
        /// Tower that regenerated.
        tower: TowerId,
        /// Strength after regeneration.
        value: u32,
    },
    /// A link was created.
    LinkAdded {
        /// Owner of the link.
        source: TowerId,
        /// Destination of the link.
        target: TowerId,
    },
    /// A link was removed.
    LinkRemoved {
        /// Owner of the link.
        source: TowerId,
        /// Destination of the link.
        target: TowerId,
    },
    /// A link toggle was refused.
    LinkRejected {
        /// Owner of the requested link.
        source: TowerId,
        /// Destination of the requested link.
        target: TowerId,
        /// Why the toggle was refused.
        reason: LinkRejection,
    },
    /// The player selected a tower.
    TowerSelected {
        /// Selected tower.
        tower: TowerId,
    },
    /// The player's selection was dropped.
    SelectionCleared,
    /// The tower under the pointer changed.
    HoverChanged {
        /// Tower now under the pointer.
        tower: Option<TowerId>,
    },
}

/// Contract violations detected while advancing the simulation.
///
/// None of these can be triggered by player input; each one indicates broken
/// link or soldier bookkeeping and is propagated to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum EngineError {
    /// A handle referenced a tower outside the arena.
    #[error("{tower} is outside the arena of {count} towers")]
    UnknownTower {
        /// Offending handle.
        tower: TowerId,
        /// Number of towers in the arena.
        count: usize,
    },
    /// A soldier leg would have zero length, leaving its velocity undefined.
    #[error("route from {from} to {to} has zero length")]
    DegenerateRoute {
        /// Tower the leg starts at.
        from: TowerId,
        /// Tower the leg ends at.
        to: TowerId,
    },
    /// A tower was asked to route soldiers to itself.
    #[error("{tower} cannot link to itself")]
    SelfLink {
        /// Offending tower.
        tower: TowerId,
    },
}

#[cfg(test)]
mod tests {
    use super::{has_passed, link_capacity, GridPoint, Team, TickInput, TowerId, TowerKind};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn capacity_steps_at_ten_and_thirty() {
        assert_eq!(link_capacity(0), 1);
        assert_eq!(link_capacity(9), 1);
        assert_eq!(link_capacity(10), 2);
        assert_eq!(link_capacity(29), 2);
        assert_eq!(link_capacity(30), 3);
        assert_eq!(link_capacity(65), 3);
    }

    #[test]
    fn kind_stat_table() {
        assert_eq!(TowerKind::Regular.attack_power(), 1);
        assert_eq!(TowerKind::Regular.defense_power(), 1);
        assert_eq!(TowerKind::Attack.attack_power(), 2);
        assert_eq!(TowerKind::Attack.defense_power(), 1);
        assert_eq!(TowerKind::Defense.attack_power(), 1);
        assert_eq!(TowerKind::Defense.defense_power(), 2);
    }

    #[test]
    fn passing_respects_direction_of_travel() {
        let point = GridPoint::new(5.0, 5.0);
        assert!(has_passed(1.0, 1.0, GridPoint::new(5.0, 5.0), point));
        assert!(!has_passed(1.0, 1.0, GridPoint::new(4.9, 5.5), point));
        assert!(has_passed(-1.0, -1.0, GridPoint::new(4.9, 4.9), point));
        assert!(!has_passed(-1.0, 0.0, GridPoint::new(5.1, 5.0), point));
        assert!(has_passed(-1.0, 0.0, GridPoint::new(4.0, 5.0), point));
        assert!(!has_passed(0.0, -1.0, GridPoint::new(4.0, 4.0), point));
    }

    #[test]
    fn cells_are_half_open() {
        let cell = GridPoint::new(2.0, 3.0);
        assert!(GridPoint::new(2.0, 3.0).within_cell(cell));
        assert!(GridPoint::new(2.99, 3.5).within_cell(cell));
        assert!(!GridPoint::new(3.0, 3.5).within_cell(cell));
        assert!(!GridPoint::new(2.5, 4.0).within_cell(cell));
        assert!(!GridPoint::new(1.99, 3.5).within_cell(cell));
    }

    #[test]
    fn click_is_taken_once() {
        let mut input =
            TickInput::hovering(GridPoint::new(0.5, 0.5)).with_click(GridPoint::new(1.0, 2.0));
        assert_eq!(input.take_click(), Some(GridPoint::new(1.0, 2.0)));
        assert_eq!(input.take_click(), None);
    }

    #[test]
    fn tower_id_round_trips_through_bincode() {
        assert_round_trip(&TowerId::new(42));
    }

    #[test]
    fn team_round_trips_through_bincode() {
        assert_round_trip(&Team::Purple);
    }
}
