use std::sync::{Arc, Mutex};

use lanecraft_session::{GameSession, ManualClock};
use lanecraft_system_input::RawCommand;
use lanecraft_world::{snapshot::Snapshot, SessionBlueprint};
use serde_json::{json, Value};

/// Commands keyed by the tick before which they are dispatched.
fn script() -> Vec<(u64, RawCommand)> {
    vec![
        (
            0,
            RawCommand::new("spawn-unit", json!({ "playerId": "player1", "x": 3.0, "y": 1.5 })),
        ),
        (
            5,
            RawCommand::new("spawn-unit", json!({ "playerId": "player2", "x": 8.0, "y": 1.5 })),
        ),
        (
            25,
            RawCommand::new("play-card", json!({ "playerId": "player2", "card2play": 0 })),
        ),
        (40, RawCommand::new("unknown", json!({}))),
        (
            40,
            RawCommand::new("spawn-unit", json!({ "playerId": "player1", "x": "oops" })),
        ),
        (
            60,
            RawCommand::new("spawn-unit", json!({ "playerId": "player2", "x": 6.5, "y": 5.5 })),
        ),
    ]
}

fn replay(blueprint: &SessionBlueprint, ticks: u64) -> Vec<Snapshot> {
    let mut session =
        GameSession::with_clock(blueprint, Box::new(ManualClock::new(50.0))).expect("session");
    let published = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&published);
    let _ = session.subscribe(Box::new(move |snapshot: &Snapshot| {
        sink.lock().expect("sink").push(snapshot.clone());
    }));

    let script = script();
    session.start();
    for tick in 0..ticks {
        for (_, raw) in script.iter().filter(|(at, _)| *at == tick) {
            let _ = session.dispatch(raw.clone());
        }
        let _ = session.tick();
    }

    let snapshots = published.lock().expect("published");
    snapshots.clone()
}

#[test]
fn identical_scripts_publish_identical_snapshot_streams() {
    let blueprint = SessionBlueprint::reference();
    let first = replay(&blueprint, 300);
    let second = replay(&blueprint, 300);

    assert_eq!(first.len(), 300);
    assert_eq!(first, second);

    let encode = |snapshots: &[Snapshot]| -> Vec<Value> {
        snapshots
            .iter()
            .map(|snapshot| serde_json::to_value(snapshot).expect("snapshot json"))
            .collect()
    };
    assert_eq!(encode(&first), encode(&second));
}

#[test]
fn scripted_spawns_appear_one_tick_after_dispatch() {
    let snapshots = replay(&SessionBlueprint::reference(), 10);
    assert_eq!(snapshots[0].units.len(), 1);
    assert_eq!(snapshots[4].units.len(), 1);
    assert_eq!(snapshots[5].units.len(), 2);
}

#[test]
fn played_card_spends_mana_in_the_stream() {
    let snapshots = replay(&SessionBlueprint::reference(), 30);
    let mana = |index: usize| snapshots[index].teams[1].players[0].mana.current;
    assert!(mana(25) < mana(24));
    assert!(snapshots[25].teams[1].players[0]
        .hand
        .iter()
        .all(|card| card.cooldown_progress < 0.1));
}
