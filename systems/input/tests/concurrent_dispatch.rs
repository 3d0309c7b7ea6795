use std::thread;

use lanecraft_core::EntityId;
use lanecraft_system_input::{Dispatch, InputSystem, RawCommand};
use lanecraft_world::{self as world, query, SessionBlueprint, World};
use serde_json::json;

#[test]
fn commands_from_many_threads_are_neither_lost_nor_duplicated() {
    let mut world = World::from_blueprint(&SessionBlueprint::reference()).expect("world");
    let mut input = InputSystem::new();

    let producers: Vec<_> = (0..4_u8)
        .map(|producer| {
            let sender = input.sender();
            thread::spawn(move || {
                for index in 0..25_u8 {
                    let x = f64::from(producer) + f64::from(index) / 100.0;
                    let raw = RawCommand::new(
                        "spawn-unit",
                        json!({ "playerId": "player1", "x": x, "y": 3.5 }),
                    );
                    assert_eq!(sender.dispatch(raw), Dispatch::Queued);
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().expect("producer thread");
    }

    assert_eq!(input.process(&mut world), 100);
    let units = query::player(&world, &EntityId::new("player1"))
        .expect("player1")
        .units();
    assert_eq!(units.len(), 100);
    assert_eq!(input.process(&mut world), 0);
}

#[test]
fn commands_submitted_during_a_tick_apply_on_the_next_one() {
    let mut world = World::from_blueprint(&SessionBlueprint::reference()).expect("world");
    let mut input = InputSystem::new();
    let sender = input.sender();
    let player = EntityId::new("player2");

    let _ = input.process(&mut world);
    world::advance(&mut world, 50.0);
    let _ = sender.dispatch(RawCommand::new(
        "spawn-unit",
        json!({ "playerId": "player2", "x": 8.0, "y": 1.5 }),
    ));
    assert!(query::player(&world, &player).expect("player2").units().is_empty());

    let _ = input.process(&mut world);
    world::advance(&mut world, 50.0);
    assert_eq!(query::player(&world, &player).expect("player2").units().len(), 1);
}
