use std::sync::{Arc, Mutex};

use lanecraft_core::{CardTarget, Command, EntityId, HandSlot, Vec2};
use lanecraft_world::{
    self as world,
    cards::{CardPlay, PlayPhase},
    query, Applied, SessionBlueprint, World,
};

fn reference_world() -> World {
    World::from_blueprint(&SessionBlueprint::reference()).expect("reference world")
}

fn play(world: &mut World, player: &str, slot: usize) -> Applied {
    world::apply(
        world,
        Command::PlayCard {
            player: EntityId::new(player),
            slot: HandSlot::ALL[slot],
            target: CardTarget::PlayerBoard,
        },
    )
    .expect("known player")
}

fn hand(world: &World, player: &str) -> Vec<EntityId> {
    query::player(world, &EntityId::new(player))
        .expect("player")
        .deck()
        .hand()
        .iter()
        .map(|card| card.id().clone())
        .collect()
}

#[test]
fn mana_regenerates_up_to_each_players_capacity() {
    let mut world = reference_world();
    for _ in 0..200 {
        world::advance(&mut world, 50.0);
    }
    let snapshot = query::snapshot(&world);
    let first = snapshot.teams[0].players[0].mana;
    let second = snapshot.teams[1].players[0].mana;
    assert_eq!(first.current, 5.0);
    assert_eq!(first.capacity, 5.0);
    assert!(second.current > 9.9 && second.current <= 10.0);
}

#[test]
fn playing_without_mana_changes_nothing() {
    let mut world = reference_world();
    let before = hand(&world, "player1");

    assert_eq!(play(&mut world, "player1", 0), Applied::CardRejected);
    assert_eq!(hand(&world, "player1"), before);

    let deck = query::player(&world, &EntityId::new("player1"))
        .expect("player1")
        .deck();
    assert_eq!(deck.draw_pile_len(), 2);
    assert!(deck.discard_pile().is_empty());
}

#[test]
fn played_card_is_discarded_and_the_hand_cools_down() {
    let mut world = reference_world();
    world::advance(&mut world, 2000.0);
    let before = hand(&world, "player1");
    let listened = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&listened);
    let _ = world
        .player_mut(&EntityId::new("player1"))
        .expect("player1")
        .deck_mut()
        .subscribe(
            PlayPhase::OnPlay,
            Box::new(move |play: &CardPlay| {
                sink.lock().expect("sink").push(play.card.id().clone());
            }),
        );

    assert_eq!(play(&mut world, "player1", 1), Applied::CardPlayed);

    let player = query::player(&world, &EntityId::new("player1")).expect("player1");
    assert!((player.mana().current() - 1.0).abs() < 1e-9);
    assert_eq!(player.deck().discard_pile()[0].id(), &before[1]);
    assert_eq!(player.deck().total_cards(), 6);
    assert!(player
        .deck()
        .hand()
        .iter()
        .all(|card| card.cooldown_progress() == 0.0));
    assert_eq!(*listened.lock().expect("listened"), vec![before[1].clone()]);

    assert_eq!(play(&mut world, "player1", 0), Applied::CardRejected);
}

#[test]
fn same_blueprint_and_commands_replay_identically() {
    let run = || {
        let mut world = reference_world();
        let mut snapshots = Vec::new();
        for tick in 0..120_u32 {
            if tick % 30 == 0 {
                let _ = world::apply(
                    &mut world,
                    Command::SpawnTestUnit {
                        player: EntityId::new("player1"),
                        position: Vec2::new(4.0, 1.5),
                    },
                );
                let _ = play(&mut world, "player2", (tick / 30) as usize);
            }
            world::advance(&mut world, 50.0);
            snapshots.push(query::snapshot(&world));
        }
        snapshots
    };

    assert_eq!(run(), run());
}

#[test]
fn seeds_drive_each_players_shuffle() {
    let blueprint = SessionBlueprint::reference();
    let first = World::from_blueprint(&blueprint).expect("world");
    let again = World::from_blueprint(&blueprint).expect("world");
    assert_eq!(hand(&first, "player1"), hand(&again, "player1"));
    assert_eq!(hand(&first, "player2"), hand(&again, "player2"));
}

#[test]
fn negative_deltas_never_rewind_cooldowns_or_mana() {
    let mut world = reference_world();
    world::advance(&mut world, 2000.0);
    assert_eq!(play(&mut world, "player1", 2), Applied::CardPlayed);
    world::advance(&mut world, 500.0);

    let player1 = EntityId::new("player1");
    let progress = |world: &World| -> Vec<f64> {
        query::player(world, &player1)
            .expect("player1")
            .deck()
            .hand()
            .iter()
            .map(|card| card.cooldown_progress())
            .collect()
    };
    let cooling = progress(&world);
    let mana = query::player(&world, &player1).expect("player1").mana().current();
    let elapsed = query::elapsed(&world);

    world::advance(&mut world, -5000.0);
    world::advance(&mut world, f64::NAN);

    assert_eq!(progress(&world), cooling);
    assert_eq!(
        query::player(&world, &player1).expect("player1").mana().current(),
        mana
    );
    assert_eq!(query::elapsed(&world), elapsed);
    assert_eq!(query::tick_index(&world), 4);
}
