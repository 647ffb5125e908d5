use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use competency_core::bank::CompetencyBank;
use competency_core::model::*;
use competency_core::scoring::calculate_test_score;
use competency_core::selector::generate_random_test_with_rng;

fn make_bank(per_category: usize) -> CompetencyBank {
    let mut questions = Vec::new();
    for category in Category::ALL {
        for i in 0..per_category {
            questions.push(Question {
                id: format!("{}_{i}", category.as_str().to_lowercase()),
                category,
                subcategory: String::new(),
                prompt: format!("Question {i}"),
                question_type: QuestionType::MultipleChoice,
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_answer: CorrectAnswer::from("B"),
                explanation: String::new(),
                reference: String::new(),
                difficulty: Difficulty::Basic,
                points: (i % 3 + 5) as u32,
                time_limit_secs: 60,
            });
        }
    }
    CompetencyBank::new("bench", "Benchmark", questions, PassThresholds::standard())
        .expect("bench bank is valid")
}

fn answer_half(questions: &[Question]) -> AnswerSheet {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let answer = if i % 2 == 0 { "B" } else { "A" };
            (q.id.clone(), Answer::from(answer))
        })
        .collect()
}

fn bench_calculate_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculate_test_score");
    let thresholds = PassThresholds::standard();

    for per_category in [3, 20, 100] {
        let bank = make_bank(per_category);
        let answers = answer_half(bank.questions());
        let name = format!("{}_questions", bank.questions().len());
        group.bench_function(name, |b| {
            b.iter(|| {
                calculate_test_score(
                    black_box(&answers),
                    black_box(bank.questions()),
                    black_box(&thresholds),
                )
            })
        });
    }

    group.finish();
}

fn bench_generate_test(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_random_test");
    let bank = make_bank(50);
    let mut rng = StdRng::seed_from_u64(7);

    group.bench_function("all_categories_5_each", |b| {
        b.iter(|| generate_random_test_with_rng(&bank, black_box(&Category::ALL), 5, &mut rng))
    });

    group.bench_function("one_category_20", |b| {
        b.iter(|| {
            generate_random_test_with_rng(&bank, black_box(&[Category::WhsSafety]), 20, &mut rng)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_calculate_score, bench_generate_test);
criterion_main!(benches);
