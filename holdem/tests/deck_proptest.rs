/// Property-based tests for dealing using proptest
///
/// These tests verify that no card is ever dealt twice and that a player's
/// pocket lookup never exposes anyone else's cards, across random table
/// sizes, seeds and betting sequences.
use holdem::{
    ActionType, Card, Game, PlayerId, PocketCards, Stage,
    game::{Deck, GameError},
};
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use std::collections::BTreeSet;
use uuid::Uuid;

// Strategy to generate any non-folding action
fn staying_action_strategy() -> impl Strategy<Value = ActionType> {
    prop_oneof![
        Just(ActionType::Check),
        Just(ActionType::Call),
        Just(ActionType::Bet),
        Just(ActionType::ReRaise),
    ]
}

// Strategy to generate any action, folds included
fn action_strategy() -> impl Strategy<Value = ActionType> {
    prop_oneof![4 => staying_action_strategy(), 1 => Just(ActionType::Fold)]
}

// Strategy to generate a set of excluded cards
fn excluded_cards_strategy(max: usize) -> impl Strategy<Value = BTreeSet<Card>> {
    let universe: Vec<Card> = Deck::cards().collect();
    prop::sample::subsequence(universe, 0..=max).prop_map(|cards| cards.into_iter().collect())
}

fn all_dealt_cards(game: &Game) -> Vec<Card> {
    let mut cards = game.community_cards().to_vec();
    for player in game.players() {
        cards.extend(player.pocket.into_iter().flatten());
    }
    cards
}

// Drive a game to the end. Re-raises are capped so every round terminates.
fn play_out(game: &mut Game, actions: &[ActionType], rng: &mut StdRng) {
    let mut actions = actions.iter().copied().cycle();
    let mut reraises = 0;
    while game.stage() != Stage::GameOver {
        while let Some(player) = game.player_to_action() {
            let mut action = actions.next().unwrap_or(ActionType::Call);
            if action == ActionType::ReRaise {
                reraises += 1;
                if reraises > 3 {
                    action = ActionType::Call;
                }
            }
            game.record_action(player, action).unwrap();
        }
        assert!(game.advance_if_ready_with(rng).unwrap());
    }
}

proptest! {
    #[test]
    fn test_full_hand_never_repeats_a_card(
        num_players in 2usize..=10,
        seed in any::<u64>(),
        actions in prop::collection::vec(action_strategy(), 1..40),
    ) {
        let players: Vec<PlayerId> = (0..num_players).map(|_| Uuid::new_v4()).collect();
        let mut game = Game::with_players(players).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);

        play_out(&mut game, &actions, &mut rng);

        let cards = all_dealt_cards(&game);
        let unique: BTreeSet<Card> = cards.iter().copied().collect();
        prop_assert_eq!(cards.len(), num_players * 2 + 5);
        prop_assert_eq!(unique.len(), cards.len());
    }

    #[test]
    fn test_pocket_lookup_is_private(
        num_players in 2usize..=10,
        seed in any::<u64>(),
        viewer in 0usize..10,
    ) {
        let players: Vec<PlayerId> = (0..num_players).map(|_| Uuid::new_v4()).collect();
        let mut game = Game::with_players(players.clone()).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let viewer = viewer % num_players;
        let stranger = Uuid::new_v4();

        loop {
            prop_assert_eq!(game.pocket_cards(&stranger), PocketCards::UnknownPlayer);

            match game.pocket_cards(&players[viewer]) {
                PocketCards::NotYetDealt => prop_assert_eq!(game.stage(), Stage::Initial),
                PocketCards::Dealt(own) => {
                    for (idx, player) in game.players().iter().enumerate() {
                        let cards = player.pocket.unwrap();
                        if idx == viewer {
                            prop_assert_eq!(cards, own);
                        } else {
                            prop_assert!(cards.iter().all(|card| !own.contains(card)));
                        }
                    }
                }
                PocketCards::UnknownPlayer => {
                    return Err(TestCaseError::fail("seated player reported unknown"));
                }
            }

            if game.stage() == Stage::GameOver {
                break;
            }
            while let Some(player) = game.player_to_action() {
                game.record_action(player, ActionType::Call).unwrap();
            }
            prop_assert!(game.advance_if_ready_with(&mut rng).unwrap());
        }
    }

    #[test]
    fn test_draw_respects_exclusions(
        excluded in excluded_cards_strategy(40),
        count in 0usize..=12,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let available = 52 - excluded.len();

        match Deck::draw(count, &excluded, &mut rng) {
            Ok(drawn) => {
                prop_assert!(count <= available);
                prop_assert_eq!(drawn.len(), count);
                let unique: BTreeSet<Card> = drawn.iter().copied().collect();
                prop_assert_eq!(unique.len(), count);
                prop_assert!(drawn.iter().all(|card| !excluded.contains(card)));
            }
            Err(GameError::ExhaustedDeck { requested, available: left }) => {
                prop_assert!(count > available);
                prop_assert_eq!(requested, count);
                prop_assert_eq!(left, available);
            }
            Err(other) => return Err(TestCaseError::fail(other.to_string())),
        }
    }

    #[test]
    fn test_incomplete_round_never_advances(
        num_players in 3usize..=10,
        acted in 0usize..=8,
    ) {
        let players: Vec<PlayerId> = (0..num_players).map(|_| Uuid::new_v4()).collect();
        let mut game = Game::with_players(players).unwrap();
        game.advance_if_ready().unwrap();

        // Everyone but the last player calls at most.
        for _ in 0..acted.min(num_players - 1) {
            let player = game.player_to_action().unwrap();
            game.record_action(player, ActionType::Call).unwrap();
        }

        let before = game.clone();
        prop_assert!(!game.advance_if_ready().unwrap());
        prop_assert_eq!(game.stage(), before.stage());
        prop_assert_eq!(game.players(), before.players());
        prop_assert_eq!(game.community_cards(), before.community_cards());
    }
}
