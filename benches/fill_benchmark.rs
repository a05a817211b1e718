//! Benchmarks for docfill template filling.
//!
//! Run with: cargo bench
//!
//! Templates are built in memory; no files are read.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use docfill::{Document, FillOptions, Paragraph, Run, SaveOptions, VariableMap, VariableReplacer};

const CONTENT_HTML: &str = "<p>El programa comprende:</p>\
<ol><li>Fundamentos de <b>Rust</b></li><li>Propiedad y préstamos</li>\
<li>Concurrencia<ul><li>Hilos</li><li>async</li></ul></li></ol>\
<table><tr><th>Módulo</th><th>Horas</th></tr><tr><td>1</td><td>20</td></tr></table>";

/// A certificate-like template with `paragraphs` body paragraphs, each
/// holding a placeholder split across two runs.
fn create_template(paragraphs: usize) -> Document {
    let mut doc = Document::new();
    doc.add_paragraph(Paragraph::with_text("La Universidad Estatal de Milagro confiere a"));
    doc.add_paragraph(Paragraph::with_text("{{NOMBRES}}"));
    for i in 0..paragraphs {
        let mut p = Paragraph::new();
        p.add_text(format!("Párrafo {} del curso {{{{NOMBRE", i));
        p.add_run(Run::bold("_CURSO}} con "));
        p.add_text("{{HORAS}} horas");
        doc.add_paragraph(p);
    }
    doc.add_paragraph(Paragraph::with_text("Contenido: {{CONTENIDO}}"));
    doc
}

fn variables() -> VariableMap {
    VariableMap::from_pairs([
        ("NOMBRES", "Juan Pérez"),
        ("NOMBRE_CURSO", "Programación en Rust"),
        ("HORAS", "40"),
        ("CONTENIDO", CONTENT_HTML),
    ])
}

/// Benchmark replacement at various template sizes.
fn bench_replace(c: &mut Criterion) {
    let mut group = c.benchmark_group("replace");
    let vars = variables();
    let replacer = VariableReplacer::new();

    for count in [10, 100, 500].iter() {
        let template = create_template(*count);

        group.bench_function(format!("{}_paragraphs", count), |b| {
            b.iter(|| {
                let mut doc = template.clone();
                replacer.replace(black_box(&mut doc), black_box(&vars))
            });
        });
    }

    group.finish();
}

/// Benchmark HTML conversion on its own.
fn bench_markup(c: &mut Criterion) {
    let options = docfill::markup::EmitOptions::default();
    c.bench_function("markup_parse_emit", |b| {
        b.iter(|| {
            let block = docfill::markup::parse(black_box(CONTENT_HTML)).unwrap();
            docfill::markup::emit(&block, &options)
        });
    });
}

/// Benchmark serialization of a filled document.
fn bench_save(c: &mut Criterion) {
    let mut doc = create_template(100);
    VariableReplacer::new().replace(&mut doc, &variables());
    let options = SaveOptions::default();

    c.bench_function("save_100_paragraphs", |b| {
        b.iter(|| black_box(&doc).to_bytes(&options).unwrap());
    });
}

/// Benchmark parallel batch generation.
fn bench_batch(c: &mut Criterion) {
    let template = create_template(20);
    let records: Vec<VariableMap> = (0..64)
        .map(|i| {
            let mut vars = variables();
            vars.insert("NOMBRES", format!("Persona {}", i));
            vars
        })
        .collect();
    let options = FillOptions::default();

    c.bench_function("batch_64_records", |b| {
        b.iter(|| docfill::fill_batch(black_box(&template), black_box(&records), &options));
    });
}

criterion_group!(benches, bench_replace, bench_markup, bench_save, bench_batch);
criterion_main!(benches);
