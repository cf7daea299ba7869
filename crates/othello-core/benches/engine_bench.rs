//! Criterion benchmarks for the rule engine and the wire codec.
//!
//! Run with:
//! ```bash
//! cargo bench --package othello-core --bench engine_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use othello_core::protocol::messages::{ChatMessage, MoveRequest, StateMessage};
use othello_core::{decode_message, encode_message, rules, Game, Move, OthelloMessage, Player};

/// A mid-game position reached by always taking the first legal move.
fn midgame(moves: usize) -> Game {
    let mut game = Game::new();
    for _ in 0..moves {
        let Some(player) = game.turn().active_player() else {
            break;
        };
        let Some(&coord) = rules::legal_moves(game.board(), player).first() else {
            break;
        };
        game.play(Move { coord, player })
            .expect("first legal move must be accepted");
    }
    game
}

fn bench_legal_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("legal_moves");
    for depth in [0usize, 20, 40] {
        let game = midgame(depth);
        group.bench_with_input(BenchmarkId::new("ply", depth), &game, |b, game| {
            b.iter(|| rules::legal_moves(black_box(game.board()), Player::Black))
        });
    }
    group.finish();
}

fn bench_full_playout(c: &mut Criterion) {
    c.bench_function("playout_first_legal_move", |b| {
        b.iter(|| midgame(black_box(60)))
    });
}

fn bench_codec(c: &mut Criterion) {
    let messages = [
        ("State", OthelloMessage::State(StateMessage::from_game(&midgame(20)))),
        (
            "Move",
            OthelloMessage::Move(MoveRequest {
                row: 2,
                col: 3,
                claimed: Player::Black,
            }),
        ),
        (
            "Chat",
            OthelloMessage::Chat(ChatMessage {
                sender: Player::White,
                text: "nice corner".to_string(),
            }),
        ),
    ];

    let mut group = c.benchmark_group("encode_decode_roundtrip");
    for (name, msg) in &messages {
        group.bench_with_input(BenchmarkId::new("msg", name), msg, |b, msg| {
            b.iter(|| {
                let bytes = encode_message(black_box(msg), black_box(1)).unwrap();
                decode_message(black_box(&bytes)).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_legal_moves, bench_full_playout, bench_codec);
criterion_main!(benches);
