//! Key replay throughput: editing commands, `.` repeats and macro playback
//! over a mid-sized buffer.

use core_actions::Engine;
use core_events::parse_notation;
use core_model::EditorModel;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn buffer(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("    let value_{i} = compute({i}, \"text\") + other_{i};\n"))
        .collect()
}

fn replay(text: &str, keys: &[char]) -> usize {
    let mut model = EditorModel::from_text(text);
    let mut engine = Engine::default();
    engine.feed_keys(&mut model, keys);
    model.doc.len_chars()
}

fn benchmark_commands(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");
    let text = buffer(500);
    let scripts = [
        ("motions", "50j10wbe$0gg30G{}%"),
        ("delete_repeat", "dw..j.j.j3dd...u<C-r>"),
        ("insert", "3Ohello world<Esc>jA;<Esc>j.j.j.ccnew<Esc>"),
        ("visual", "Vjjd<C-v>jj$Atail<Esc>vee~"),
        ("macro", "qa0wcwx<Esc>jq20@a"),
        ("search", "/value_4<CR>nnnNcwz<Esc>n.n."),
    ];
    for (name, notation) in scripts {
        let keys = parse_notation(notation).unwrap_or_default();
        group.bench_with_input(BenchmarkId::from_parameter(name), &keys, |b, keys| {
            b.iter(|| black_box(replay(&text, keys)));
        });
    }
    group.finish();
}

fn benchmark_counted_insert(c: &mut Criterion) {
    let keys = parse_notation("200ia<Esc>").unwrap_or_default();
    c.bench_function("counted_insert_200", |b| {
        b.iter(|| black_box(replay("", &keys)));
    });
}

criterion_group!(benches, benchmark_commands, benchmark_counted_insert);
criterion_main!(benches);
