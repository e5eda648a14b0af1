//! Soldier records and the factory that launches them along links.

use serde::{Deserialize, Serialize};
use towers_core::{EngineError, GridPoint, Rules, Team, TowerId};

use crate::GameState;

/// Transient combat unit walking one leg between two towers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Soldier {
    /// Current position in grid units.
    pub position: GridPoint,
    /// Team the soldier fights for.
    pub team: Team,
    /// Tower the current leg started from.
    pub source: TowerId,
    /// Tower the current leg ends at.
    pub target: TowerId,
    /// Tower where the whole journey began, kept across pass-through reroutes.
    pub original_source: TowerId,
    /// Damage dealt to enemy towers and soldiers.
    pub attack: u32,
    /// Strength added to friendly towers and absorbed in clashes.
    pub defense: u32,
    /// Horizontal displacement per tick.
    pub dx: f64,
    /// Vertical displacement per tick.
    pub dy: f64,
}

impl Soldier {
    /// Reports whether both combat stats are still above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.attack > 0 && self.defense > 0
    }

    /// Kills the soldier outright.
    pub fn kill(&mut self) {
        self.attack = 0;
        self.defense = 0;
    }

    /// Moves the soldier one tick along its leg.
    pub fn advance(&mut self) {
        self.position.x += self.dx;
        self.position.y += self.dy;
    }

    /// Reports whether the soldier has reached or overshot `point`.
    #[must_use]
    pub fn has_passed(&self, point: GridPoint) -> bool {
        towers_core::has_passed(self.dx, self.dy, self.position, point)
    }
}

impl GameState {
    /// Builds a soldier leaving `source` for `target`.
    ///
    /// Team and combat stats are stamped from the source tower as it is right
    /// now. The displacement is scaled so one grid unit of straight-line
    /// distance takes `rules.ticks_per_unit` ticks.
    pub fn spawn_soldier(
        &self,
        source: TowerId,
        target: TowerId,
        original_source: TowerId,
        rules: &Rules,
    ) -> Result<Soldier, EngineError> {
        if source == target {
            return Err(EngineError::SelfLink { tower: source });
        }

        let from = self.tower(source)?;
        let to = self.tower(target)?;

        let distance = from.position.distance(to.position);
        if distance.is_nan() || distance <= 0.0 {
            return Err(EngineError::DegenerateRoute {
                from: source,
                to: target,
            });
        }

        let scale = distance * rules.ticks_per_unit;
        Ok(Soldier {
            position: from.position,
            team: from.team,
            source,
            target,
            original_source,
            attack: from.kind.attack_power(),
            defense: from.kind.defense_power(),
            dx: (to.position.x - from.position.x) / scale,
            dy: (to.position.y - from.position.y) / scale,
        })
    }
}
