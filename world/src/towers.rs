//! Tower and link records stored inside the world arena.

use serde::{Deserialize, Serialize};
use towers_core::{link_capacity, GridPoint, Rules, Team, TowerId, TowerKind};

/// Directed routing edge owned by its source tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Tower soldiers are sent to.
    pub target: TowerId,
    /// Spawn cadence counter, independent of the owning tower's counter.
    pub ticks_since_update: u32,
}

impl Link {
    /// Creates a link whose cadence counter starts from zero.
    #[must_use]
    pub const fn new(target: TowerId) -> Self {
        Self {
            target,
            ticks_since_update: 0,
        }
    }

    /// Creates a link as the player would, ready to fire on its first eligible tick.
    #[must_use]
    pub const fn fresh(target: TowerId, rules: &Rules) -> Self {
        Self {
            target,
            ticks_since_update: rules.fresh_link_ticks,
        }
    }
}

/// Stationary, team-owned entity holding strength and outgoing links.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tower {
    /// Grid cell anchoring the tower.
    pub position: GridPoint,
    /// Archetype deciding the stats of spawned soldiers.
    pub kind: TowerKind,
    /// Current owner.
    pub team: Team,
    /// Current strength, never above `max_value`.
    pub value: u32,
    /// Strength capacity.
    pub max_value: u32,
    /// Outgoing links in creation order.
    pub links: Vec<Link>,
    /// Passive regeneration counter.
    pub ticks_since_update: u32,
    /// Index of the link that last received a passing soldier.
    pub next_pass_through: usize,
}

impl Tower {
    /// Creates an unclaimed regular tower at `(x, y)` with stock strength.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        let rules = Rules::new();
        Self {
            position: GridPoint::new(x, y),
            kind: TowerKind::Regular,
            team: Team::None,
            value: rules.default_value,
            max_value: rules.default_max_value,
            links: Vec::new(),
            ticks_since_update: 0,
            next_pass_through: 0,
        }
    }

    /// Sets the tower archetype.
    #[must_use]
    pub fn with_kind(mut self, kind: TowerKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the owning team.
    #[must_use]
    pub fn with_team(mut self, team: Team) -> Self {
        self.team = team;
        self
    }

    /// Sets the current strength.
    #[must_use]
    pub fn with_value(mut self, value: u32) -> Self {
        self.value = value;
        self
    }

    /// Sets the strength capacity.
    #[must_use]
    pub fn with_max_value(mut self, max_value: u32) -> Self {
        self.max_value = max_value;
        self
    }

    /// Replaces the outgoing links with idle links to `targets`.
    #[must_use]
    pub fn with_links(mut self, targets: &[TowerId]) -> Self {
        self.links = targets.iter().copied().map(Link::new).collect();
        self
    }

    /// Reports whether the tower sits at its capacity.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.value == self.max_value
    }

    /// Number of links the tower may hold at its current strength.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        link_capacity(self.value)
    }

    /// Position of the link towards `target`, if one exists.
    #[must_use]
    pub fn link_position(&self, target: TowerId) -> Option<usize> {
        self.links.iter().position(|link| link.target == target)
    }

    /// Reports whether the tower routes soldiers to `target`.
    #[must_use]
    pub fn links_to(&self, target: TowerId) -> bool {
        self.link_position(target).is_some()
    }

    /// Drops the newest links until the link count fits the current capacity.
    pub fn shed_links_over_capacity(&mut self) -> impl Iterator<Item = Link> + '_ {
        let keep = self.capacity().min(self.links.len());
        self.links.drain(keep..)
    }

    /// Hands the tower to `team`, wiping its strength and routing.
    pub fn capture(&mut self, team: Team) {
        self.team = team;
        self.value = 0;
        self.links.clear();
    }
}
