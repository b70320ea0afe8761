use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use tragax_core::model::{QuestionType, TranslationItem};
use tragax_core::quiz::{generate_questions, QuizConfig};

fn make_items(n: usize) -> Vec<TranslationItem> {
    (0..n)
        .map(|i| TranslationItem {
            id: format!("item-{i}"),
            list_id: "bench".into(),
            source_text: format!("word {i}"),
            // Repeat targets so duplicate filtering has work to do.
            target_text: format!("mot {}", i % (n / 2).max(1)),
            source_language: "en".into(),
            target_language: "fr".into(),
            created_at: chrono::Utc::now(),
            last_reviewed: None,
            difficulty: None,
            learned: i % 3 == 0,
        })
        .collect()
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_questions");

    for size in [10usize, 100, 1000] {
        let items = make_items(size);
        let config = QuizConfig {
            types: vec![
                QuestionType::TrueFalse,
                QuestionType::MultipleChoice,
                QuestionType::Writing,
            ],
            count: 20,
            include_learned: true,
            random_order: true,
        };
        group.bench_function(format!("mixed/{size}"), |b| {
            let mut rng = StdRng::seed_from_u64(42);
            b.iter(|| generate_questions(black_box(&items), black_box(&config), &mut rng))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_generate);
criterion_main!(benches);
