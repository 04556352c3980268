use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sgf_core::go::Go;
use sgf_core::normalizer::normalize;
use sgf_core::parser::tokenizer::tokenize;
use sgf_core::{GameCollection, Node, PropertySchema};

/// A 19x19 record with `moves` moves and a variation every 25 moves
fn game_record(moves: usize) -> String {
    let letters: Vec<char> = ('a'..='s').collect();
    let mut text = String::from("(;FF[4]GM[1]SZ[19]KM[6.5]PB[Black]PW[White]");
    let mut open = 0;
    for i in 0..moves {
        let color = if i % 2 == 0 { 'B' } else { 'W' };
        let column = letters[(i * 7) % 19];
        let row = letters[(i * 11) % 19];
        if i > 0 && i % 25 == 0 {
            text.push_str(&format!("(;{}[{}{}]C[variation {}])(", color, row, column, i));
            open += 1;
        }
        text.push_str(&format!(";{}[{}{}]", color, column, row));
    }
    for _ in 0..open {
        text.push(')');
    }
    text.push(')');
    text
}

fn bench_tokenize(c: &mut Criterion) {
    let input = game_record(300);
    c.bench_function("tokenize_300_moves", |b| {
        b.iter(|| tokenize(black_box(&input)).unwrap())
    });
}

fn bench_parse(c: &mut Criterion) {
    let input = game_record(300);
    c.bench_function("parse_tree_300_moves", |b| {
        b.iter(|| GameCollection::<Go>::from_sgf(black_box(&input)).unwrap())
    });
}

fn bench_normalize(c: &mut Criterion) {
    let input = game_record(300);
    c.bench_function("normalize_300_moves", |b| {
        b.iter(|| normalize(black_box(&input)).unwrap())
    });
}

fn bench_renumber(c: &mut Criterion) {
    let input = game_record(300);
    c.bench_function("append_child_renumber", |b| {
        b.iter_batched(
            || GameCollection::<Go>::from_sgf(&input).unwrap(),
            |mut game| {
                let root = game.roots()[0];
                game.append_child(root, Node::new())
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_schema(c: &mut Criterion) {
    c.bench_function("build_go_schema", |b| {
        b.iter(|| PropertySchema::for_game::<Go>())
    });
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_parse,
    bench_normalize,
    bench_renumber,
    bench_schema
);
criterion_main!(benches);
