use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pylex::{Tokenizer, TokenizerConfig};

/// A realistic mix of imports, control flow, f-strings, and an `async def`
/// so every sub-lexer (indentation, f-string stack, keyword resolver) gets
/// exercised, not just the simple-token fast paths.
fn make_python_module(index: usize) -> String {
    format!(
        r#"
import os
import sys
from pathlib import Path

CONSTANT_{i} = {i}

def compute_{i}(x, y):
    result = x + y
    name = f"module_{{x}}_{{y}}"
    return result, name

class Widget_{i}:
    def __init__(self, value):
        self.value = value

    async def refresh(self):
        await self.fetch()
        for attempt in range(3):
            if attempt == 2:
                break
        return self.value

w_{i} = Widget_{i}({i})
print(os.path.join("a", "b"), sys.version, Path("."))
"#,
        i = index
    )
}

fn bench_tokenize(c: &mut Criterion) {
    let corpus: Vec<String> = (0..50).map(make_python_module).collect();

    c.bench_function("tokenize_50_modules", |b| {
        b.iter(|| {
            for src in &corpus {
                let tokens = Tokenizer::tokenize(black_box(src), TokenizerConfig::default()).unwrap();
                black_box(tokens);
            }
        });
    });

    let big_source: String = (0..200).map(make_python_module).collect::<Vec<_>>().join("\n");

    c.bench_function("tokenize_single_large_module", |b| {
        b.iter(|| {
            let tokens = Tokenizer::tokenize(black_box(&big_source), TokenizerConfig::default()).unwrap();
            black_box(tokens);
        });
    });
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
