use towers_core::{Event, GridPoint, LinkRejection, Rules, TowerId};
use towers_engine::Session;
use towers_world::{default_state, query};

const BLUE_BASE: GridPoint = GridPoint::new(1.5, 1.5);
const PURPLE_OUTPOST: GridPoint = GridPoint::new(10.5, 6.5);
const RED_BASE: GridPoint = GridPoint::new(15.5, 4.5);

fn session() -> Session {
    Session::new(default_state(), Rules::default())
}

fn click(session: &mut Session, position: GridPoint) -> Vec<Event> {
    session.register_click(position);
    session.step().expect("stock board").to_vec()
}

fn targets(session: &Session, tower: u32) -> Vec<TowerId> {
    session.current().towers[tower as usize]
        .links
        .iter()
        .map(|link| link.target)
        .collect()
}

#[test]
fn click_is_seen_by_a_single_tick() {
    let mut session = session();

    let first = click(&mut session, RED_BASE);
    assert!(first.contains(&Event::TowerSelected {
        tower: TowerId::new(2),
    }));

    let second = session.step().expect("stock board").to_vec();
    assert!(!second
        .iter()
        .any(|event| matches!(event, Event::TowerSelected { .. })));
    assert_eq!(session.current().active, Some(TowerId::new(2)));
}

#[test]
fn latest_click_wins() {
    let mut session = session();

    session.register_click(BLUE_BASE);
    session.register_click(RED_BASE);
    let _ = session.step().expect("stock board");

    assert_eq!(session.current().active, Some(TowerId::new(2)));
}

#[test]
fn toggling_a_link_twice_restores_the_link_set() {
    let mut session = session();
    let before = targets(&session, 0);

    let _ = click(&mut session, BLUE_BASE);
    let removed = click(&mut session, PURPLE_OUTPOST);
    assert!(removed.contains(&Event::LinkRemoved {
        source: TowerId::new(0),
        target: TowerId::new(1),
    }));
    assert_eq!(session.current().active, None);
    assert_eq!(targets(&session, 0), vec![TowerId::new(2)]);

    let _ = click(&mut session, BLUE_BASE);
    let added = click(&mut session, PURPLE_OUTPOST);
    assert!(added.contains(&Event::LinkAdded {
        source: TowerId::new(0),
        target: TowerId::new(1),
    }));
    assert_eq!(targets(&session, 0), before);
}

#[test]
fn same_team_link_replaces_the_reverse_link() {
    let mut state = default_state();
    state.towers[2].team = towers_core::Team::Blue;
    state.towers[2].links.clear();
    let mut session = Session::new(state, Rules::default());

    let _ = click(&mut session, RED_BASE);
    let events = click(&mut session, BLUE_BASE);

    assert!(events.contains(&Event::LinkRemoved {
        source: TowerId::new(0),
        target: TowerId::new(2),
    }));
    assert!(query::links(session.current()).any(|link| link == (TowerId::new(2), TowerId::new(0))));
    assert!(!query::is_two_way(
        session.current(),
        TowerId::new(0),
        TowerId::new(2)
    ));
}

#[test]
fn clicking_the_active_tower_again_is_refused_and_clears_selection() {
    let mut session = session();

    let _ = click(&mut session, RED_BASE);
    let events = click(&mut session, RED_BASE);

    assert!(events.contains(&Event::LinkRejected {
        source: TowerId::new(2),
        target: TowerId::new(2),
        reason: LinkRejection::SelfLink,
    }));
    assert_eq!(session.current().active, None);
    assert_eq!(targets(&session, 2), vec![TowerId::new(0)]);
}

#[test]
fn clicking_empty_ground_clears_selection() {
    let mut session = session();

    let _ = click(&mut session, BLUE_BASE);
    let events = click(&mut session, GridPoint::new(5.5, 5.5));

    assert!(events.contains(&Event::SelectionCleared));
    assert_eq!(session.current().active, None);
}

#[test]
fn hover_is_recomputed_every_tick() {
    let mut session = session();

    session.set_hover(BLUE_BASE);
    let _ = session.step().expect("stock board");
    assert_eq!(session.current().hovered, Some(TowerId::new(0)));

    session.set_hover(GridPoint::new(2.0, 1.5));
    let _ = session.step().expect("stock board");
    assert_eq!(session.current().hovered, None);
}

#[test]
fn idle_tower_regenerates_on_the_fifty_first_tick() {
    let mut session = session();

    for _ in 0..50 {
        let _ = session.step().expect("stock board");
    }
    assert_eq!(session.current().towers[1].value, 6);
    assert_eq!(session.current().towers[1].ticks_since_update, 50);

    let events = session.step().expect("stock board").to_vec();
    assert_eq!(session.current().towers[1].value, 7);
    assert_eq!(session.current().towers[1].ticks_since_update, 1);
    assert!(events.contains(&Event::TowerRegenerated {
        tower: TowerId::new(1),
        value: 7,
    }));
}

#[test]
fn linked_tower_counter_reads_one_after_a_tick() {
    let mut session = session();

    let _ = session.step().expect("stock board");

    assert_eq!(session.current().towers[0].ticks_since_update, 1);
    assert_eq!(session.current().towers[2].ticks_since_update, 1);
}

#[test]
fn previous_snapshot_trails_current_by_one_tick() {
    let mut session = session();
    let _ = session.step().expect("stock board");
    let after_one = session.current().clone();

    let _ = session.step().expect("stock board");

    assert_eq!(session.previous(), &after_one);
    assert_eq!(session.ticks(), 2);
}
