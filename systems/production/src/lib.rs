#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tower production and passive regeneration.
//!
//! Linked towers launch soldiers on a per-link cadence whose delay shrinks as
//! the tower fills up and grows with the number of links. Unlinked towers
//! regenerate one point of strength every `inactive_delay` ticks instead.

use towers_core::{EngineError, Event, Rules, TowerId};
use towers_world::{GameState, Tower};

/// Spawn rate multiplier applied to a tower at full strength.
const FULL_TOWER_HASTE: f64 = 0.5;
/// Delay growth per outgoing link; total output scales sub-linearly with fan-out.
const FAN_OUT_FACTOR: f64 = 0.8;

/// Pure system that spawns soldiers and regenerates idle towers.
#[derive(Clone, Copy, Debug, Default)]
pub struct Production {
    rules: Rules,
}

impl Production {
    /// Creates a production system driven by `rules`.
    #[must_use]
    pub const fn new(rules: Rules) -> Self {
        Self { rules }
    }

    /// Number of ticks a link of `tower` waits between two soldiers.
    #[must_use]
    pub fn spawn_delay(&self, tower: &Tower) -> f64 {
        let min = self.rules.active_delay_min;
        let max = self.rules.active_delay_max;
        let capacity = f64::from(tower.max_value);
        let span = capacity - min;

        let mut delay = if span == 0.0 {
            min
        } else {
            (capacity - f64::from(tower.value) - min) / span * (max - min) + min
        };
        if tower.is_full() {
            delay *= FULL_TOWER_HASTE;
        }

        delay * (tower.links.len() as f64 * FAN_OUT_FACTOR).max(1.0)
    }

    /// Runs production for every tower of `state` in arena order.
    pub fn handle(
        &self,
        state: &mut GameState,
        out_events: &mut Vec<Event>,
    ) -> Result<(), EngineError> {
        for id in state.tower_ids() {
            let tower = state.tower(id)?;

            if tower.links.is_empty() {
                let tower = state.tower_mut(id)?;
                if tower.ticks_since_update >= self.rules.inactive_delay {
                    let before = tower.value;
                    tower.value = tower.value.saturating_add(1).min(tower.max_value);
                    tower.ticks_since_update = 0;
                    if tower.value > before {
                        out_events.push(Event::TowerRegenerated {
                            tower: id,
                            value: tower.value,
                        });
                    }
                }
            } else {
                let delay = self.spawn_delay(tower);
                for slot in 0..tower.links.len() {
                    self.tick_link(state, id, slot, delay, out_events)?;
                }
                state.tower_mut(id)?.ticks_since_update = 0;
            }

            let tower = state.tower_mut(id)?;
            tower.ticks_since_update += 1;
            tower.value = tower.value.min(tower.max_value);
        }

        Ok(())
    }

    fn tick_link(
        &self,
        state: &mut GameState,
        id: TowerId,
        slot: usize,
        delay: f64,
        out_events: &mut Vec<Event>,
    ) -> Result<(), EngineError> {
        let link = state.tower(id)?.links[slot];

        if f64::from(link.ticks_since_update) >= delay {
            let soldier = state.spawn_soldier(id, link.target, id, &self.rules)?;
            out_events.push(Event::SoldierSpawned {
                source: id,
                target: link.target,
                team: soldier.team,
            });
            state.soldiers.push(soldier);
            state.tower_mut(id)?.links[slot].ticks_since_update = 0;
        } else {
            state.tower_mut(id)?.links[slot].ticks_since_update += 1;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_interpolates_between_bounds() {
        let production = Production::default();
        let tower = Tower::new(0.0, 0.0).with_links(&[TowerId::new(1)]);

        let low = production.spawn_delay(&tower.clone().with_value(0));
        let mid = production.spawn_delay(&tower.clone().with_value(35));
        assert!((low - (35.0 / 35.0 * 10.0 + 30.0)).abs() < 1e-9);
        assert!((mid - 30.0).abs() < 1e-9);
    }

    #[test]
    fn full_towers_fire_twice_as_fast() {
        let production = Production::default();
        let tower = Tower::new(0.0, 0.0)
            .with_value(65)
            .with_links(&[TowerId::new(1)]);

        let expected = (-30.0 / 35.0 * 10.0 + 30.0) * 0.5;
        assert!((production.spawn_delay(&tower) - expected).abs() < 1e-9);
    }

    #[test]
    fn fan_out_stretches_delay() {
        let production = Production::default();
        let one = Tower::new(0.0, 0.0).with_value(35).with_links(&[TowerId::new(1)]);
        let two = one.clone().with_links(&[TowerId::new(1), TowerId::new(2)]);
        let three = one
            .clone()
            .with_links(&[TowerId::new(1), TowerId::new(2), TowerId::new(3)]);

        assert!((production.spawn_delay(&two) - 30.0 * 1.6).abs() < 1e-9);
        assert!((production.spawn_delay(&three) - 30.0 * 2.4).abs() < 1e-9);
        assert!((production.spawn_delay(&one) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn capacity_at_minimum_delay_falls_back_to_minimum() {
        let production = Production::default();
        let tower = Tower::new(0.0, 0.0)
            .with_max_value(30)
            .with_value(10)
            .with_links(&[TowerId::new(1)]);

        assert!((production.spawn_delay(&tower) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn small_capacity_towers_keep_positive_delays() {
        let production = Production::default();
        let tower = Tower::new(0.0, 0.0)
            .with_max_value(20)
            .with_value(10)
            .with_links(&[TowerId::new(1)]);

        assert!((production.spawn_delay(&tower) - 50.0).abs() < 1e-9);
    }
}
