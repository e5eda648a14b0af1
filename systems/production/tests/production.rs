use towers_core::{Event, Team, TowerId, TowerKind};
use towers_system_production::Production;
use towers_world::{GameState, Link, Tower};

fn run(state: &mut GameState) -> Vec<Event> {
    let mut events = Vec::new();
    Production::default()
        .handle(state, &mut events)
        .expect("valid board");
    events
}

fn linked_pair(value: u32, link_ticks: u32) -> GameState {
    let mut source = Tower::new(0.0, 0.0)
        .with_team(Team::Blue)
        .with_kind(TowerKind::Defense)
        .with_value(value)
        .with_links(&[TowerId::new(1)]);
    source.links[0].ticks_since_update = link_ticks;
    GameState::new(20, 10, vec![source, Tower::new(4.0, 3.0).with_team(Team::Red)])
}

#[test]
fn idle_tower_regenerates_after_fifty_ticks() {
    let mut state = GameState::new(20, 10, vec![Tower::new(0.0, 0.0).with_value(20)]);
    state.towers[0].ticks_since_update = 50;

    let events = run(&mut state);

    assert_eq!(state.towers[0].value, 21);
    assert_eq!(state.towers[0].ticks_since_update, 1);
    assert_eq!(
        events,
        vec![Event::TowerRegenerated {
            tower: TowerId::new(0),
            value: 21,
        }]
    );
}

#[test]
fn idle_tower_waits_before_regenerating() {
    let mut state = GameState::new(20, 10, vec![Tower::new(0.0, 0.0).with_value(20)]);
    state.towers[0].ticks_since_update = 49;

    let events = run(&mut state);

    assert!(events.is_empty());
    assert_eq!(state.towers[0].value, 20);
    assert_eq!(state.towers[0].ticks_since_update, 50);
}

#[test]
fn regeneration_runs_every_fifty_ticks() {
    let mut state = GameState::new(20, 10, vec![Tower::new(0.0, 0.0).with_value(20)]);

    for _ in 0..51 {
        let _ = run(&mut state);
    }
    assert_eq!(state.towers[0].value, 21);

    for _ in 0..49 {
        let _ = run(&mut state);
    }
    assert_eq!(state.towers[0].value, 21);

    let _ = run(&mut state);
    assert_eq!(state.towers[0].value, 22);
}

#[test]
fn full_idle_tower_stays_at_capacity() {
    let mut state = GameState::new(20, 10, vec![Tower::new(0.0, 0.0).with_value(65)]);
    state.towers[0].ticks_since_update = 50;

    let events = run(&mut state);

    assert!(events.is_empty());
    assert_eq!(state.towers[0].value, 65);
    assert_eq!(state.towers[0].ticks_since_update, 1);
}

#[test]
fn overfilled_tower_is_clamped() {
    let mut state = linked_pair(65, 0);
    state.towers[1].value = 70;

    let _ = run(&mut state);

    assert_eq!(state.towers[1].value, 65);
}

#[test]
fn linked_tower_counter_restarts_at_one() {
    let mut state = linked_pair(35, 0);
    state.towers[0].ticks_since_update = 40;

    let _ = run(&mut state);

    assert_eq!(state.towers[0].ticks_since_update, 1);
    assert_eq!(state.towers[0].value, 35, "linked towers do not regenerate");
}

#[test]
fn link_fires_once_its_counter_reaches_the_delay() {
    let mut state = linked_pair(35, 30);

    let events = run(&mut state);

    assert_eq!(
        events,
        vec![Event::SoldierSpawned {
            source: TowerId::new(0),
            target: TowerId::new(1),
            team: Team::Blue,
        }]
    );
    assert_eq!(state.towers[0].links[0].ticks_since_update, 0);

    let soldier = state.soldiers[0];
    assert_eq!(soldier.source, TowerId::new(0));
    assert_eq!(soldier.target, TowerId::new(1));
    assert_eq!(soldier.original_source, TowerId::new(0));
    assert_eq!(soldier.attack, 1);
    assert_eq!(soldier.defense, 2);
    assert!((soldier.dx - 0.08).abs() < 1e-12);
    assert!((soldier.dy - 0.06).abs() < 1e-12);
}

#[test]
fn link_below_delay_keeps_counting() {
    let mut state = linked_pair(35, 29);

    let events = run(&mut state);

    assert!(events.is_empty());
    assert!(state.soldiers.is_empty());
    assert_eq!(state.towers[0].links[0].ticks_since_update, 30);
}

#[test]
fn player_made_link_fires_on_first_tick() {
    let mut state = linked_pair(10, 0);
    state.towers[0].links = vec![Link::fresh(TowerId::new(1), &Default::default())];

    let events = run(&mut state);

    assert_eq!(events.len(), 1);
    assert_eq!(state.soldiers.len(), 1);
}

#[test]
fn each_link_keeps_its_own_cadence() {
    let mut state = GameState::new(
        20,
        10,
        vec![
            Tower::new(0.0, 0.0)
                .with_team(Team::Blue)
                .with_value(35)
                .with_links(&[TowerId::new(1), TowerId::new(2)]),
            Tower::new(3.0, 0.0),
            Tower::new(0.0, 3.0),
        ],
    );
    state.towers[0].links[0].ticks_since_update = 48;
    state.towers[0].links[1].ticks_since_update = 10;

    let _ = run(&mut state);

    assert_eq!(state.soldiers.len(), 1);
    assert_eq!(state.soldiers[0].target, TowerId::new(1));
    assert_eq!(state.towers[0].links[0].ticks_since_update, 0);
    assert_eq!(state.towers[0].links[1].ticks_since_update, 11);
}

#[test]
fn small_capacity_tower_waits_for_its_delay() {
    let source = Tower::new(0.0, 0.0)
        .with_team(Team::Blue)
        .with_max_value(20)
        .with_value(10)
        .with_links(&[TowerId::new(1)]);
    let mut state = GameState::new(20, 10, vec![source, Tower::new(4.0, 3.0).with_value(65)]);

    for _ in 0..50 {
        let _ = run(&mut state);
    }
    assert!(state.soldiers.is_empty());

    let events = run(&mut state);
    assert_eq!(events.len(), 1);
    assert_eq!(state.soldiers.len(), 1);
}
