#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Soldier movement and combat resolution.
//!
//! Every living soldier takes one step along its leg, fights opposing soldiers
//! it has walked past on the same link, and then resolves against its target
//! tower once it reaches it: reinforcing a friendly tower, passing through a
//! full friendly tower, or damaging and possibly capturing an enemy one.

use towers_core::{EngineError, Event, Rules};
use towers_world::{GameState, Soldier};
use tracing::debug;

/// Slot of the next soldier list, kept in the order soldiers were resolved.
#[derive(Clone, Copy, Debug)]
enum Outcome {
    /// Soldier at this index of the previous list is still walking.
    Walking(usize),
    /// Soldier launched onward by a full tower.
    Rerouted(Soldier),
}

/// Combat system that advances soldiers and settles their fights.
#[derive(Debug)]
pub struct Combat {
    rules: Rules,
    outcomes: Vec<Outcome>,
}

impl Combat {
    /// Creates a combat system driven by `rules`.
    #[must_use]
    pub fn new(rules: Rules) -> Self {
        Self {
            rules,
            outcomes: Vec::new(),
        }
    }

    /// Advances every soldier of `state` by one tick.
    ///
    /// Soldiers are resolved in list order and every stat reduction applies
    /// immediately, so later pairings see the outcome of earlier ones. Soldiers
    /// that die or arrive are dropped from the list.
    pub fn handle(
        &mut self,
        state: &mut GameState,
        out_events: &mut Vec<Event>,
    ) -> Result<(), EngineError> {
        self.outcomes.clear();

        for index in 0..state.soldiers.len() {
            if !state.soldiers[index].is_alive() {
                continue;
            }

            state.soldiers[index].advance();
            let target_position = state.tower(state.soldiers[index].target)?.position;

            if !resolve_clashes(state, index, out_events) {
                let fallen = state.soldiers[index];
                out_events.push(Event::SoldierPerished {
                    team: fallen.team,
                    source: fallen.source,
                    target: fallen.target,
                });
                continue;
            }

            let soldier = state.soldiers[index];
            if soldier.has_passed(target_position) {
                self.resolve_arrival(state, soldier, out_events)?;
            } else {
                self.outcomes.push(Outcome::Walking(index));
            }
        }

        let previous = std::mem::take(&mut state.soldiers);
        state.soldiers = self
            .outcomes
            .drain(..)
            .map(|outcome| match outcome {
                Outcome::Walking(index) => previous[index],
                Outcome::Rerouted(soldier) => soldier,
            })
            .filter(Soldier::is_alive)
            .collect();

        Ok(())
    }

    fn resolve_arrival(
        &mut self,
        state: &mut GameState,
        soldier: Soldier,
        out_events: &mut Vec<Event>,
    ) -> Result<(), EngineError> {
        let target = soldier.target;
        let tower = state.tower(target)?;

        if tower.team == soldier.team {
            let passes_through = tower.is_full()
                && !tower.links.is_empty()
                && soldier.original_source != target;

            if passes_through {
                let slot = (tower.next_pass_through + 1) % tower.links.len();
                let onward = tower.links[slot].target;
                let rerouted =
                    state.spawn_soldier(target, onward, soldier.original_source, &self.rules)?;
                state.tower_mut(target)?.next_pass_through = slot;
                self.outcomes.push(Outcome::Rerouted(rerouted));
                out_events.push(Event::SoldierRerouted {
                    via: target,
                    target: onward,
                    original_source: soldier.original_source,
                });
            } else {
                let tower = state.tower_mut(target)?;
                tower.value = tower.value.saturating_add(soldier.defense);
                out_events.push(Event::TowerReinforced {
                    tower: target,
                    value: tower.value,
                });
            }

            return Ok(());
        }

        let tower = state.tower_mut(target)?;
        if soldier.attack > tower.value {
            let from = tower.team;
            tower.capture(soldier.team);
            debug!(tower = %target, ?from, to = ?soldier.team, "tower captured");
            out_events.push(Event::TowerCaptured {
                tower: target,
                from,
                to: soldier.team,
            });
            return Ok(());
        }

        tower.value -= soldier.attack;
        out_events.push(Event::TowerDamaged {
            tower: target,
            value: tower.value,
        });
        for link in tower.shed_links_over_capacity() {
            debug!(source = %target, target = %link.target, "link shed after damage");
            out_events.push(Event::LinkRemoved {
                source: target,
                target: link.target,
            });
        }

        Ok(())
    }
}

impl Default for Combat {
    fn default() -> Self {
        Self::new(Rules::default())
    }
}

/// Fights the soldier at `index` against every opponent it has walked past.
///
/// Opponents are soldiers of another team walking the reverse leg of the same
/// link. Returns `false` when the soldier lost at least one fight, in which
/// case it is killed so no later soldier fights it again this tick.
fn resolve_clashes(state: &mut GameState, index: usize, out_events: &mut Vec<Event>) -> bool {
    let mut soldier = state.soldiers[index];
    let mut perished = false;

    for (other, opponent) in state.soldiers.iter_mut().enumerate() {
        if other == index
            || !opponent.is_alive()
            || opponent.source != soldier.target
            || opponent.team == soldier.team
            || !soldier.has_passed(opponent.position)
        {
            continue;
        }

        let attacker_survived = soldier.attack > opponent.defense;
        if attacker_survived {
            soldier.attack -= opponent.defense;
            opponent.kill();
        } else {
            opponent.attack = opponent.attack.saturating_sub(soldier.defense);
            perished = true;
        }

        out_events.push(Event::SoldiersClashed {
            attacker: soldier.team,
            defender: opponent.team,
            source: soldier.source,
            target: soldier.target,
            attacker_survived,
        });
    }

    if perished {
        soldier.kill();
    }
    state.soldiers[index] = soldier;
    !perished
}

