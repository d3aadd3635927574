use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use holdem::{
    ActionType, Game, PlayerId, Stage,
    db::GameRecord,
    game::{CardLedger, Deck, codec},
};
use rand::{SeedableRng, rngs::StdRng};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Helper to create a game with N seated players
fn setup_game_with_players(n_players: usize) -> Game {
    let players: Vec<PlayerId> = (0..n_players).map(|_| Uuid::new_v4()).collect();
    Game::with_players(players).unwrap()
}

/// Helper to play a game to the river, everyone calling
fn setup_game_at_river(n_players: usize) -> Game {
    let mut game = setup_game_with_players(n_players);
    let mut rng = StdRng::seed_from_u64(7);
    while game.stage() != Stage::RiverDealt {
        while let Some(player) = game.player_to_action() {
            game.record_action(player, ActionType::Call).unwrap();
        }
        game.advance_if_ready_with(&mut rng).unwrap();
    }
    game
}

/// Benchmark drawing the flop from a deck with pocket cards excluded
fn bench_deck_draw(c: &mut Criterion) {
    let mut group = c.benchmark_group("deck_draw");
    let mut rng = StdRng::seed_from_u64(42);

    for excluded in [0usize, 20, 45].iter() {
        let exclude: BTreeSet<_> = Deck::cards().take(*excluded).collect();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_excluded", excluded)),
            &exclude,
            |b, exclude| {
                b.iter(|| Deck::draw(3, exclude, &mut rng).unwrap());
            },
        );
    }

    group.finish();
}

/// Benchmark a full hand from seating to game over
fn bench_full_hand(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_hand");

    for n_players in [2, 6, 10].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_players", n_players)),
            n_players,
            |b, &n| {
                let mut rng = StdRng::seed_from_u64(1);
                b.iter_batched(
                    || setup_game_with_players(n),
                    |mut game| {
                        while game.stage() != Stage::GameOver {
                            while let Some(player) = game.player_to_action() {
                                game.record_action(player, ActionType::Call).unwrap();
                            }
                            game.advance_if_ready_with(&mut rng).unwrap();
                        }
                        game
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Benchmark the ledger rebuild done before every draw
fn bench_ledger_build(c: &mut Criterion) {
    let game = setup_game_at_river(10);

    c.bench_function("ledger_build_10_players", |b| {
        b.iter(|| CardLedger::build(game.community_cards(), game.players()).unwrap());
    });
}

/// Benchmark encoding and decoding the stored game record
fn bench_record_codec(c: &mut Criterion) {
    let game = setup_game_at_river(10);

    c.bench_function("record_encode_10_players", |b| {
        b.iter(|| GameRecord::from_game(&game).unwrap());
    });

    let record = GameRecord::from_game(&game).unwrap();
    c.bench_function("record_decode_10_players", |b| {
        b.iter(|| record.clone().into_game().unwrap());
    });

    c.bench_function("pocket_cards_encode_10_players", |b| {
        b.iter(|| codec::encode_pocket_cards(game.players()));
    });
}

criterion_group!(dealing, bench_deck_draw, bench_full_hand, bench_ledger_build);

criterion_group!(persistence, bench_record_codec);

criterion_main!(dealing, persistence);
