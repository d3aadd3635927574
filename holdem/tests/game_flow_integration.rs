/// Integration tests for game flow scenarios
///
/// These tests drive whole hands through the public engine API: seating,
/// dealing, betting rounds with re-raises and folds, and the card ledger.
use holdem::{
    ActionType, BettingStatus, Card, Game, GameError, PlayerId, PocketCards, Stage,
    game::{Deck, GameEventKind},
};
use rand::{SeedableRng, rngs::StdRng};
use std::collections::BTreeSet;
use uuid::Uuid;

fn new_game(n: usize) -> (Game, Vec<PlayerId>) {
    let players: Vec<PlayerId> = (0..n).map(|_| Uuid::new_v4()).collect();
    let game = Game::with_players(players.clone()).unwrap();
    (game, players)
}

fn pocket(game: &Game, player: &PlayerId) -> [Card; 2] {
    match game.pocket_cards(player) {
        PocketCards::Dealt(cards) => cards,
        other => panic!("expected dealt pocket cards, got {other:?}"),
    }
}

fn status_of(game: &Game, player: &PlayerId) -> BettingStatus {
    game.betting_status()
        .into_iter()
        .find(|(id, _)| id == player)
        .map(|(_, status)| status)
        .unwrap()
}

fn call_around(game: &mut Game) {
    while let Some(player) = game.player_to_action() {
        game.record_action(player, ActionType::Call).unwrap();
    }
}

#[test]
fn test_two_player_hand_to_flop() {
    let (mut game, players) = new_game(2);
    let mut rng = StdRng::seed_from_u64(2024);

    assert!(game.advance_if_ready_with(&mut rng).unwrap());
    assert_eq!(game.stage(), Stage::PocketDealt);
    assert_eq!(game.player_to_action(), Some(players[0]));

    let pockets: BTreeSet<Card> = players
        .iter()
        .flat_map(|player| pocket(&game, player))
        .collect();
    assert_eq!(pockets.len(), 4);

    game.record_action(players[0], ActionType::Call).unwrap();
    game.record_action(players[1], ActionType::Call).unwrap();
    assert!(game.advance_if_ready_with(&mut rng).unwrap());

    assert_eq!(game.stage(), Stage::FlopDealt);
    assert_eq!(game.community_cards().len(), 3);
    assert!(
        game.community_cards()
            .iter()
            .all(|card| !pockets.contains(card))
    );
}

#[test]
fn test_reraise_reopens_round() {
    let (mut game, players) = new_game(2);
    game.advance_if_ready().unwrap();

    game.record_action(players[0], ActionType::Call).unwrap();
    game.record_action(players[1], ActionType::ReRaise).unwrap();

    assert_eq!(status_of(&game, &players[0]), BettingStatus::NotYetActed);
    assert_eq!(status_of(&game, &players[1]), BettingStatus::ReRaise);
    assert_eq!(game.player_to_action(), Some(players[0]));
    assert!(!game.is_ready_to_advance());
    assert!(!game.advance_if_ready().unwrap());
    assert_eq!(game.stage(), Stage::PocketDealt);

    game.record_action(players[0], ActionType::Call).unwrap();
    assert!(game.advance_if_ready().unwrap());
    assert_eq!(game.stage(), Stage::FlopDealt);
}

#[test]
fn test_three_player_hand_uses_eleven_unique_cards() {
    let (mut game, players) = new_game(3);
    let mut rng = StdRng::seed_from_u64(11);

    while game.stage() != Stage::GameOver {
        call_around(&mut game);
        assert!(game.advance_if_ready_with(&mut rng).unwrap());
    }

    let mut cards: Vec<Card> = game.community_cards().to_vec();
    for player in &players {
        cards.extend(pocket(&game, player));
    }
    let unique: BTreeSet<Card> = cards.iter().copied().collect();

    assert_eq!(cards.len(), 3 * 2 + 5);
    assert_eq!(unique.len(), cards.len());
    assert_eq!(game.player_to_action(), None);
    assert!(!game.advance_if_ready().unwrap());
}

#[test]
fn test_folded_player_is_skipped_in_later_rounds() {
    let (mut game, players) = new_game(3);
    game.advance_if_ready().unwrap();

    game.record_action(players[0], ActionType::Fold).unwrap();
    game.record_action(players[1], ActionType::Bet).unwrap();
    game.record_action(players[2], ActionType::Call).unwrap();
    assert!(game.advance_if_ready().unwrap());

    assert_eq!(game.stage(), Stage::FlopDealt);
    assert_eq!(game.player_to_action(), Some(players[1]));
    assert_eq!(status_of(&game, &players[0]), BettingStatus::Fold);
    assert_eq!(
        game.record_action(players[0], ActionType::Check),
        Err(GameError::NotPlayersTurn)
    );
}

#[test]
fn test_last_player_standing_runs_out_the_board() {
    let (mut game, players) = new_game(3);
    game.advance_if_ready().unwrap();

    game.record_action(players[0], ActionType::Fold).unwrap();
    game.record_action(players[1], ActionType::Fold).unwrap();

    assert_eq!(game.player_to_action(), None);
    while game.advance_if_ready().unwrap() {}

    assert_eq!(game.stage(), Stage::GameOver);
    assert_eq!(game.community_cards().len(), 5);
}

#[test]
fn test_out_of_turn_and_unknown_players_rejected() {
    let (mut game, players) = new_game(3);
    game.advance_if_ready().unwrap();
    let stranger = Uuid::new_v4();

    assert_eq!(
        game.record_action(players[2], ActionType::Call),
        Err(GameError::NotPlayersTurn)
    );
    assert_eq!(
        game.record_action(stranger, ActionType::Call),
        Err(GameError::UnknownPlayer(stranger))
    );
    assert!(game.bets().is_empty());
}

#[test]
fn test_pocket_lookup_only_returns_own_cards() {
    let (mut game, players) = new_game(4);

    assert_eq!(game.pocket_cards(&players[0]), PocketCards::NotYetDealt);
    game.advance_if_ready().unwrap();

    for (idx, player) in players.iter().enumerate() {
        assert_eq!(
            game.pocket_cards(player),
            PocketCards::Dealt(game.players()[idx].pocket.unwrap())
        );
    }
    assert_eq!(
        game.pocket_cards(&Uuid::new_v4()),
        PocketCards::UnknownPlayer
    );
}

#[test]
fn test_seating_fills_table_then_closes() {
    let mut game = Game::new(2).unwrap();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    game.seat_player(alice).unwrap();
    assert!(!game.is_ready_to_advance());
    assert!(!game.advance_if_ready().unwrap());

    game.seat_player(bob).unwrap();
    assert_eq!(game.seat_player(Uuid::new_v4()), Err(GameError::TableFull(2)));
    assert!(game.advance_if_ready().unwrap());
    assert_eq!(game.seat_player(Uuid::new_v4()), Err(GameError::SeatingClosed));

    let kinds: Vec<GameEventKind> = game.drain_events().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            GameEventKind::PlayerSeated,
            GameEventKind::PlayerSeated,
            GameEventKind::StageAdvanced
        ]
    );
}

#[test]
fn test_bet_history_records_every_action() {
    let (mut game, players) = new_game(2);
    game.advance_if_ready().unwrap();

    game.record_action(players[0], ActionType::Bet).unwrap();
    game.record_action(players[1], ActionType::ReRaise).unwrap();
    game.record_action(players[0], ActionType::Call).unwrap();

    let actions: Vec<(PlayerId, ActionType)> = game
        .bets()
        .iter()
        .map(|bet| (bet.player, bet.action))
        .collect();
    assert_eq!(
        actions,
        vec![
            (players[0], ActionType::Bet),
            (players[1], ActionType::ReRaise),
            (players[0], ActionType::Call)
        ]
    );
    assert!(game.bets().iter().all(|bet| bet.stage == Stage::PocketDealt));
    assert!(game.bets().windows(2).all(|pair| pair[0].at <= pair[1].at));
}

#[test]
fn test_ten_player_game_never_exhausts_deck() {
    let (mut game, _) = new_game(10);
    while game.stage() != Stage::GameOver {
        call_around(&mut game);
        game.advance_if_ready().unwrap();
    }

    let used: BTreeSet<Card> = game
        .players()
        .iter()
        .flat_map(|player| player.pocket.unwrap())
        .chain(game.community_cards().iter().copied())
        .collect();
    assert_eq!(used.len(), 25);
    assert_eq!(Deck::cards().count() - used.len(), 27);
}
