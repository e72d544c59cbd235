use criterion::{black_box, criterion_group, criterion_main, Criterion};

use studyquiz_core::model::{AnswerMap, Question};
use studyquiz_core::scoring::{mark_options, score};

fn make_questions(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| Question {
            text: format!("Question {i}?"),
            options: vec![
                "a) alpha".into(),
                "b) beta".into(),
                "c) gamma".into(),
                "d) delta".into(),
            ],
            correct_answer: (i % 5 != 0).then(|| "c) gamma".to_string()),
        })
        .collect()
}

fn make_answers(n: usize) -> AnswerMap {
    (0..n)
        .filter(|i| i % 3 != 0)
        .map(|i| (i, if i % 2 == 0 { "c) gamma" } else { "a) alpha" }.to_string()))
        .collect()
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");

    for n in [10usize, 100, 1000] {
        let questions = make_questions(n);
        let answers = make_answers(n);
        group.bench_function(format!("{n}_questions"), |b| {
            b.iter(|| score(black_box(&questions), black_box(&answers)))
        });
    }

    group.finish();
}

fn bench_marks(c: &mut Criterion) {
    let questions = make_questions(1);
    c.bench_function("mark_options", |b| {
        b.iter(|| mark_options(black_box(&questions[0]), black_box(Some("a) alpha"))))
    });
}

criterion_group!(benches, bench_score, bench_marks);
criterion_main!(benches);
