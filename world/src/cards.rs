//! Cards, decks and the draw/hand/discard cycle.
//!
//! A [`DeckSystem`] only governs which card can be played when. What a card
//! does once played is left to whoever subscribes to its play events.

use std::collections::VecDeque;

use lanecraft_core::{
    settle_delta, CardTarget, EntityId, HandSlot, Millis, Subscribers, SubscriptionId,
    HAND_SIZE,
};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::{
    blueprint::{CardBlueprint, DeckBlueprint},
    error::DeckError,
    mana::ManaSystem,
};

/// Smallest deck that fills a hand and still leaves a card to draw.
pub const MIN_DECK_SIZE: usize = HAND_SIZE + 1;

/// Playable card with its own cooldown timer.
#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    id: EntityId,
    name: String,
    cost: f64,
    targets: Vec<CardTarget>,
    cooldown_delay: Millis,
    current_cooldown: Millis,
}

impl Card {
    /// Instantiates a ready-to-play card from its blueprint.
    #[must_use]
    pub fn new(blueprint: &CardBlueprint) -> Self {
        Self {
            id: blueprint.id.clone(),
            name: blueprint.name.clone(),
            cost: blueprint.cost,
            targets: blueprint.targets.clone(),
            cooldown_delay: blueprint.cooldown,
            current_cooldown: 0.0,
        }
    }

    /// Identifier of the card within its deck.
    #[must_use]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mana spent to play the card.
    #[must_use]
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Targets the card may be played onto.
    #[must_use]
    pub fn targets(&self) -> &[CardTarget] {
        &self.targets
    }

    /// Full cooldown duration.
    #[must_use]
    pub fn cooldown_delay(&self) -> Millis {
        self.cooldown_delay
    }

    /// Cooldown left before the card is ready.
    #[must_use]
    pub fn current_cooldown(&self) -> Millis {
        self.current_cooldown
    }

    /// How far the card has cooled down, from `0.0` (just triggered) to
    /// `1.0` (ready).
    #[must_use]
    pub fn cooldown_progress(&self) -> f64 {
        if self.cooldown_delay <= 0.0 {
            return 1.0;
        }
        (1.0 - self.current_cooldown / self.cooldown_delay).clamp(0.0, 1.0)
    }

    /// Restarts the cooldown from its full delay.
    pub fn trigger_cooldown(&mut self) {
        self.current_cooldown = self.cooldown_delay.max(0.0);
    }

    /// Ages the cooldown by `dt`; unusable deltas leave it where it is.
    pub fn update(&mut self, dt: Millis) {
        self.current_cooldown = (self.current_cooldown - settle_delta(dt)).max(0.0);
    }
}

/// Fixed, ordered card list a deck system is dealt from.
#[derive(Clone, Debug, PartialEq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Instantiates every card of the blueprint once.
    #[must_use]
    pub fn new(blueprint: &DeckBlueprint) -> Self {
        Self {
            cards: blueprint.cards.iter().map(Card::new).collect(),
        }
    }

    /// Cards in blueprint order.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Number of cards in the deck.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Reports whether the deck holds no card.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Moment of a successful play a listener is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayPhase {
    /// After mana was spent, before the card takes effect.
    BeforePlay,
    /// When the card takes effect.
    OnPlay,
    /// After the hand was refilled and cooldowns were triggered.
    AfterPlay,
}

/// Description of a successful play handed to listeners.
#[derive(Clone, Debug, PartialEq)]
pub struct CardPlay {
    /// Player who played the card.
    pub player: EntityId,
    /// The played card as it was in hand.
    pub card: Card,
    /// Target the card was played onto.
    pub target: CardTarget,
    /// Hand slot the card was played from.
    pub slot: HandSlot,
}

/// Callback notified of successful plays.
pub type PlayListener = dyn FnMut(&CardPlay) + Send;

/// Handle detaching a play listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlaySubscription {
    phase: PlayPhase,
    id: SubscriptionId,
}

/// Draw pile, discard pile and hand of a single player.
///
/// The three piles always add up to the full deck: cards move between them
/// and are never duplicated or lost.
#[derive(Debug)]
pub struct DeckSystem {
    deck: Deck,
    draw_pile: VecDeque<Card>,
    discard_pile: Vec<Card>,
    hand: [Card; HAND_SIZE],
    rng: ChaCha8Rng,
    before_play: Subscribers<PlayListener>,
    on_play: Subscribers<PlayListener>,
    after_play: Subscribers<PlayListener>,
}

impl DeckSystem {
    /// Shuffles the deck and deals the opening hand.
    pub fn new(deck: Deck, mut rng: ChaCha8Rng) -> Result<Self, DeckError> {
        if deck.len() < MIN_DECK_SIZE {
            return Err(DeckError::TooSmall {
                minimum: MIN_DECK_SIZE,
                actual: deck.len(),
            });
        }

        let mut cards: Vec<Card> = deck.cards().to_vec();
        cards.shuffle(&mut rng);
        let mut draw_pile: VecDeque<Card> = cards.into();
        let dealt: Vec<Card> = draw_pile.drain(..HAND_SIZE).collect();
        let hand = <[Card; HAND_SIZE]>::try_from(dealt).map_err(|dealt| DeckError::TooSmall {
            minimum: MIN_DECK_SIZE,
            actual: dealt.len(),
        })?;

        Ok(Self {
            deck,
            draw_pile,
            discard_pile: Vec::new(),
            hand,
            rng,
            before_play: Subscribers::new(),
            on_play: Subscribers::new(),
            after_play: Subscribers::new(),
        })
    }

    /// Deck the system was dealt from.
    #[must_use]
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Cards in hand, in slot order.
    #[must_use]
    pub fn hand(&self) -> &[Card; HAND_SIZE] {
        &self.hand
    }

    /// Card held in `slot`.
    #[must_use]
    pub fn card(&self, slot: HandSlot) -> &Card {
        &self.hand[slot.index()]
    }

    /// Cards waiting to be drawn, next draw first.
    pub fn draw_pile(&self) -> impl Iterator<Item = &Card> + '_ {
        self.draw_pile.iter()
    }

    /// Number of cards waiting to be drawn.
    #[must_use]
    pub fn draw_pile_len(&self) -> usize {
        self.draw_pile.len()
    }

    /// Cards played since the last reshuffle, oldest first.
    #[must_use]
    pub fn discard_pile(&self) -> &[Card] {
        &self.discard_pile
    }

    /// Card that the next play will draw.
    #[must_use]
    pub fn peek(&self) -> Option<&Card> {
        self.draw_pile.front()
    }

    /// Number of cards across hand, draw pile and discard pile.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.hand.len() + self.draw_pile.len() + self.discard_pile.len()
    }

    /// Moves the discard pile back into the draw pile and shuffles it.
    ///
    /// The hand is left alone.
    pub fn shuffle_deck(&mut self) {
        debug!(
            target: "lanecraft_world::cards",
            discarded = self.discard_pile.len(),
            "reshuffling deck"
        );
        self.draw_pile.extend(self.discard_pile.drain(..));
        self.draw_pile.make_contiguous().shuffle(&mut self.rng);
    }

    /// Reports whether the card in `slot` could be played right now.
    ///
    /// The target must be allowed by the card, the pool must hold at least
    /// the card's cost and the card must be fully cooled down.
    #[must_use]
    pub fn player_can_play(&self, mana: &ManaSystem, target: CardTarget, slot: HandSlot) -> bool {
        let card = self.card(slot);
        card.targets.contains(&target)
            && mana.current() >= card.cost
            && card.cooldown_progress() == 1.0
    }

    /// Plays the card in `slot` for `player`.
    ///
    /// On success the cost is paid, the play events fire, the slot is
    /// refilled from the draw pile, the played card is discarded and every
    /// card in hand starts cooling down. A rejected play changes nothing.
    pub fn try_play(
        &mut self,
        player: &EntityId,
        mana: &mut ManaSystem,
        target: CardTarget,
        slot: HandSlot,
    ) -> bool {
        if !self.player_can_play(mana, target, slot) {
            trace!(target: "lanecraft_world::cards", %player, ?slot, ?target, "card play rejected");
            return false;
        }
        let Some(replacement) = self.draw_pile.pop_front() else {
            return false;
        };

        let played = std::mem::replace(&mut self.hand[slot.index()], replacement);
        mana.subtract(played.cost);
        let play = CardPlay {
            player: player.clone(),
            card: played,
            target,
            slot,
        };

        notify(&mut self.before_play, &play);
        notify(&mut self.on_play, &play);

        self.discard_pile.push(play.card.clone());
        if self.draw_pile.is_empty() {
            self.shuffle_deck();
        }
        for card in &mut self.hand {
            card.trigger_cooldown();
        }

        notify(&mut self.after_play, &play);
        true
    }

    /// Ages the cooldown of every card in hand.
    pub fn update(&mut self, dt: Millis) {
        for card in &mut self.hand {
            card.update(dt);
        }
    }

    /// Attaches `listener` to a play phase.
    pub fn subscribe(&mut self, phase: PlayPhase, listener: Box<PlayListener>) -> PlaySubscription {
        let id = self.listeners(phase).subscribe(listener);
        PlaySubscription { phase, id }
    }

    /// Detaches a listener. Returns `false` when it was already detached.
    pub fn unsubscribe(&mut self, subscription: PlaySubscription) -> bool {
        self.listeners(subscription.phase).unsubscribe(subscription.id)
    }

    fn listeners(&mut self, phase: PlayPhase) -> &mut Subscribers<PlayListener> {
        match phase {
            PlayPhase::BeforePlay => &mut self.before_play,
            PlayPhase::OnPlay => &mut self.on_play,
            PlayPhase::AfterPlay => &mut self.after_play,
        }
    }
}

fn notify(listeners: &mut Subscribers<PlayListener>, play: &CardPlay) {
    for listener in listeners.iter_mut() {
        listener(play);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use lanecraft_core::{CardTarget, EntityId, HandSlot};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{Card, CardPlay, Deck, DeckSystem, PlayPhase, MIN_DECK_SIZE};
    use crate::{
        blueprint::{CardBlueprint, DeckBlueprint, ManaBlueprint},
        error::DeckError,
        mana::ManaSystem,
    };

    fn deck_system(cards: usize, seed: u64) -> Result<DeckSystem, DeckError> {
        let blueprint = DeckBlueprint {
            cards: (0..cards)
                .map(|index| CardBlueprint {
                    id: EntityId::new(format!("card{index}")),
                    name: format!("CARD {index}"),
                    cost: 1.0,
                    targets: vec![CardTarget::PlayerBoard],
                    cooldown: 1000.0,
                })
                .collect(),
        };
        DeckSystem::new(Deck::new(&blueprint), ChaCha8Rng::seed_from_u64(seed))
    }

    fn mana(initial: f64) -> ManaSystem {
        ManaSystem::new(&ManaBlueprint {
            initial,
            rate: 0.0,
            capacity: 10.0,
        })
    }

    fn slot(index: u8) -> HandSlot {
        HandSlot::try_from(index).expect("valid slot")
    }

    fn hand_ids(system: &DeckSystem) -> Vec<EntityId> {
        system.hand().iter().map(|card| card.id().clone()).collect()
    }

    #[test]
    fn cooldown_progress_runs_from_zero_to_one() {
        let mut card = Card::new(&CardBlueprint {
            id: EntityId::new("card"),
            name: "CARD".into(),
            cost: 1.0,
            targets: vec![CardTarget::PlayerBoard],
            cooldown: 2000.0,
        });
        assert_eq!(card.cooldown_progress(), 1.0);

        card.trigger_cooldown();
        assert_eq!(card.cooldown_progress(), 0.0);

        card.update(500.0);
        assert!((card.cooldown_progress() - 0.25).abs() < 1e-12);

        card.update(1500.0);
        assert_eq!(card.cooldown_progress(), 1.0);

        card.update(1000.0);
        assert_eq!(card.current_cooldown(), 0.0);
    }

    #[test]
    fn zero_delay_card_is_always_ready() {
        let mut card = Card::new(&CardBlueprint {
            id: EntityId::new("instant"),
            name: "INSTANT".into(),
            cost: 0.0,
            targets: Vec::new(),
            cooldown: 0.0,
        });
        card.trigger_cooldown();
        assert_eq!(card.cooldown_progress(), 1.0);
    }

    #[test]
    fn small_decks_are_refused() {
        assert_eq!(
            deck_system(4, 0).err(),
            Some(DeckError::TooSmall {
                minimum: MIN_DECK_SIZE,
                actual: 4
            })
        );
        assert!(deck_system(5, 0).is_ok());
    }

    #[test]
    fn opening_hand_is_dealt_from_a_shuffled_deck() {
        let system = deck_system(6, 7).expect("deck");
        assert_eq!(system.hand().len(), 4);
        assert_eq!(system.draw_pile_len(), 2);
        assert!(system.discard_pile().is_empty());
        assert_eq!(system.total_cards(), 6);

        let again = deck_system(6, 7).expect("deck");
        assert_eq!(hand_ids(&system), hand_ids(&again));
    }

    #[test]
    fn play_without_mana_changes_nothing() {
        let mut system = deck_system(6, 1).expect("deck");
        let mut pool = mana(0.0);
        let hand_before = hand_ids(&system);
        let next_before = system.peek().map(|card| card.id().clone());

        assert!(!system.try_play(&EntityId::new("p"), &mut pool, CardTarget::PlayerBoard, slot(0)));

        assert_eq!(hand_ids(&system), hand_before);
        assert_eq!(system.peek().map(|card| card.id().clone()), next_before);
        assert_eq!(system.draw_pile_len(), 2);
        assert!(system.discard_pile().is_empty());
        assert_eq!(pool.current(), 0.0);
    }

    #[test]
    fn play_onto_a_foreign_target_is_rejected() {
        let mut system = deck_system(6, 1).expect("deck");
        let mut pool = mana(5.0);
        assert!(!system.try_play(
            &EntityId::new("p"),
            &mut pool,
            CardTarget::OpponentTower,
            slot(1)
        ));
        assert_eq!(pool.current(), 5.0);
    }

    #[test]
    fn successful_play_refills_the_slot_and_cools_down_the_whole_hand() {
        let mut system = deck_system(6, 3).expect("deck");
        let mut pool = mana(5.0);
        let played = system.card(slot(2)).id().clone();
        let drawn = system.peek().map(|card| card.id().clone());

        assert!(system.try_play(&EntityId::new("p"), &mut pool, CardTarget::PlayerBoard, slot(2)));

        assert_eq!(pool.current(), 4.0);
        assert_eq!(Some(system.card(slot(2)).id().clone()), drawn);
        assert_eq!(system.discard_pile().len(), 1);
        assert_eq!(system.discard_pile()[0].id(), &played);
        assert!(system.hand().iter().all(|card| card.cooldown_progress() == 0.0));

        assert!(!system.try_play(&EntityId::new("p"), &mut pool, CardTarget::PlayerBoard, slot(0)));
        system.update(1000.0);
        assert!(system.try_play(&EntityId::new("p"), &mut pool, CardTarget::PlayerBoard, slot(0)));
    }

    #[test]
    fn emptied_draw_pile_reshuffles_the_discards() {
        let mut system = deck_system(5, 9).expect("deck");
        let mut pool = mana(10.0);

        assert!(system.try_play(&EntityId::new("p"), &mut pool, CardTarget::PlayerBoard, slot(0)));

        assert_eq!(system.draw_pile_len(), 1);
        assert!(system.discard_pile().is_empty());
        assert_eq!(system.total_cards(), 5);
    }

    #[test]
    fn listeners_observe_phases_in_order() {
        let mut system = deck_system(6, 4).expect("deck");
        let mut pool = mana(5.0);
        let log = Arc::new(Mutex::new(Vec::new()));

        for phase in [PlayPhase::AfterPlay, PlayPhase::OnPlay, PlayPhase::BeforePlay] {
            let log = Arc::clone(&log);
            let _ = system.subscribe(
                phase,
                Box::new(move |play: &CardPlay| {
                    log.lock()
                        .expect("log lock")
                        .push((phase, play.slot, play.card.cooldown_progress()));
                }),
            );
        }

        assert!(system.try_play(&EntityId::new("p"), &mut pool, CardTarget::PlayerBoard, slot(1)));

        let log = log.lock().expect("log lock");
        let phases: Vec<PlayPhase> = log.iter().map(|(phase, _, _)| *phase).collect();
        assert_eq!(
            phases,
            vec![PlayPhase::BeforePlay, PlayPhase::OnPlay, PlayPhase::AfterPlay]
        );
        assert!(log.iter().all(|(_, played, _)| *played == slot(1)));
    }

    #[test]
    fn unsubscribed_listener_stays_silent() {
        let mut system = deck_system(6, 4).expect("deck");
        let mut pool = mana(5.0);
        let hits = Arc::new(Mutex::new(0_u32));
        let counter = Arc::clone(&hits);
        let subscription = system.subscribe(
            PlayPhase::OnPlay,
            Box::new(move |_: &CardPlay| *counter.lock().expect("counter lock") += 1),
        );

        assert!(system.unsubscribe(subscription));
        assert!(!system.unsubscribe(subscription));
        assert!(system.try_play(&EntityId::new("p"), &mut pool, CardTarget::PlayerBoard, slot(3)));
        assert_eq!(*hits.lock().expect("counter lock"), 0);
    }

    fn any_delta() -> impl Strategy<Value = f64> {
        prop_oneof![
            -5000.0..5000.0_f64,
            Just(f64::NAN),
            Just(f64::INFINITY),
            Just(f64::NEG_INFINITY),
        ]
    }

    proptest! {
        #[test]
        fn cooldown_only_winds_down_within_its_delay(
            delay in 0.0..5000.0_f64,
            steps in prop::collection::vec((any::<bool>(), any_delta()), 0..48),
        ) {
            let mut card = Card::new(&CardBlueprint {
                id: EntityId::new("card"),
                name: "CARD".into(),
                cost: 1.0,
                targets: vec![CardTarget::PlayerBoard],
                cooldown: delay,
            });
            for (trigger, dt) in steps {
                if trigger {
                    card.trigger_cooldown();
                    prop_assert_eq!(card.current_cooldown(), delay);
                }
                let before = card.current_cooldown();
                card.update(dt);
                let after = card.current_cooldown();
                prop_assert!(after <= before);
                prop_assert!((0.0..=delay).contains(&after));
            }
        }

        #[test]
        fn cards_are_never_lost_or_duplicated(
            seed in any::<u64>(),
            size in 5_usize..12,
            plays in prop::collection::vec((0_u8..4, 0.0..3000.0_f64), 0..40),
        ) {
            let mut system = deck_system(size, seed).expect("deck");
            let mut pool = mana(10.0);
            let mut expected: Vec<EntityId> =
                system.deck().cards().iter().map(|card| card.id().clone()).collect();
            expected.sort();

            for (index, wait) in plays {
                let _ = system.try_play(&EntityId::new("p"), &mut pool, CardTarget::PlayerBoard, slot(index));
                system.update(wait);
                pool.add(1.0);

                prop_assert_eq!(system.total_cards(), size);
                let mut held: Vec<EntityId> = system
                    .hand()
                    .iter()
                    .chain(system.draw_pile())
                    .chain(system.discard_pile().iter())
                    .map(|card| card.id().clone())
                    .collect();
                held.sort();
                prop_assert_eq!(&held, &expected);
            }
        }
    }
}
