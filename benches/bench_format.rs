#![allow(
    clippy::unwrap_used,
    clippy::tests_outside_test_module,
    reason = "benchmark"
)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use glimfmt::{format, parse, FormatOptions, Template};

/// A synthetic template: `depth` nested conditional sections, each wrapping
/// the next, with `leaves` paragraphs at the bottom.
fn build_deep_template(depth: usize, leaves: usize) -> String {
    let mut out = String::new();
    for level in 0..depth {
        out.push_str(&format!(
            "{{{{#if level{level}}}}}<section data-level=\"{level}\">"
        ));
    }
    for leaf in 0..leaves {
        out.push_str(&format!("<p>{{{{ item{leaf} }}}}</p>"));
    }
    for _ in 0..depth {
        out.push_str("</section>{{/if}}");
    }
    out
}

fn format_benchmark(c: &mut Criterion) {
    let template_content = include_str!("template_profile.hbs");
    let options = FormatOptions::default();

    let mut group = c.benchmark_group("Template Formatting");
    group.sample_size(50);

    group.bench_function("parse_profile", |b| {
        b.iter(|| black_box(parse(template_content).unwrap()));
    });

    group.bench_function("format_profile", |b| {
        b.iter(|| black_box(format(template_content, &options).unwrap()));
    });

    let preparsed = Template::new(template_content).unwrap();
    group.bench_function("format_profile_preparsed", |b| {
        b.iter(|| black_box(preparsed.format(&options).unwrap()));
    });

    let deep = build_deep_template(8, 16);
    group.bench_function("format_deep_nesting", |b| {
        b.iter(|| black_box(format(&deep, &options).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, format_benchmark);
criterion_main!(benches);
