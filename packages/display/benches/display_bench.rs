use criterion::{black_box, criterion_group, criterion_main, Criterion};
use diagrammer_display::{get_display_lexemes, get_label_data, DisplayModel, DisplaySettings};
use diagrammer_editor::fixtures::{quick_brown_fox, DiagramBuilder};
use diagrammer_editor::DiagramState;
use diagrammer_grammar::{Category, ElementType};

/// A long run-on sentence with every noun wrapped in its own phrase
fn long_sentence(nouns: usize) -> DiagramState {
    let text: Vec<String> = (0..nouns).map(|n| format!("cat{}", n)).collect();
    let mut builder = DiagramBuilder::from_text(&text.join(" ")).unwrap();

    for word in &text {
        let noun = format!("{}Noun", word);
        let phrase = format!("{}Phrase", word);
        builder = builder
            .element(ElementType::Noun, &noun)
            .unwrap()
            .reference(ElementType::Noun, &noun, "words", &[word.as_str()])
            .unwrap()
            .element(ElementType::NounPhrase, &phrase)
            .unwrap()
            .reference(ElementType::NounPhrase, &phrase, "head", &[noun.as_str()])
            .unwrap();
    }

    builder.build()
}

fn display_model_init(c: &mut Criterion) {
    let state = quick_brown_fox();

    c.bench_function("display_model_init", |b| {
        b.iter(|| DisplayModel::init(black_box(&state)))
    });
}

fn label_data_focused(c: &mut Criterion) {
    let state = quick_brown_fox();
    let settings = DisplaySettings::focused(&state, Category::Phrase, "overPrepPhrase").unwrap();

    c.bench_function("label_data_focused", |b| {
        b.iter(|| get_label_data(black_box(&state), black_box(&settings)))
    });
}

fn long_sentence_projection(c: &mut Criterion) {
    let state = long_sentence(60);
    let settings = DisplaySettings::default();

    c.bench_function("long_sentence_model", |b| {
        b.iter(|| DisplayModel::init(black_box(&state)))
    });

    c.bench_function("long_sentence_lexemes", |b| {
        b.iter(|| get_display_lexemes(black_box(&state), black_box(&settings)))
    });
}

criterion_group!(
    benches,
    display_model_init,
    label_data_focused,
    long_sentence_projection
);
criterion_main!(benches);
