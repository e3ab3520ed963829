//! Benchmarks for URL classification and page extraction.
//!
//! Classification runs once per request before any network I/O, so it
//! should stay in the sub-microsecond range. Extraction benchmarks use
//! small synthetic pages shaped like the real hosts'.
//!
//! Run with: `cargo bench --bench classify_bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use url::Url;
use vidresolve::resolve::classify::classify;
use vidresolve::resolve::source_url::normalize;
use vidresolve::resolve::strategies::{
    ExtractionStrategy, Fast4SpeedStrategy, GenericStrategy, OkRuStrategy,
};

// ---------------------------------------------------------------------------
// URL datasets
// ---------------------------------------------------------------------------

const DIRECT_URLS: &[&str] = &[
    "https://example.com/video.mp4",
    "https://cdn.example/hls/master.m3u8?token=abc",
    "https://cdn.example/play?type=hls",
];

const REGISTERED_URLS: &[&str] = &[
    "https://ok.ru/videoembed/123456789",
    "https://m.ok.ru/videoembed/987654321",
    "https://tools.fast4speed.rsvp//media9/videos/abc/sub/1",
    "https://odnoklassniki.ru/video/42",
];

/// Hosts that fall through to the generic strategy.
const GENERIC_URLS: &[&str] = &[
    "https://example.com/embed/1",
    "https://notok.ru/videoembed/1",
    "https://ok.ru.evil.example/v/1",
    "https://player.example/e/abcdef?autoplay=1",
];

fn parsed(urls: &[&str]) -> Vec<Url> {
    urls.iter().filter_map(|u| Url::parse(u).ok()).collect()
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    for (name, urls) in [
        ("direct", DIRECT_URLS),
        ("registered", REGISTERED_URLS),
        ("generic", GENERIC_URLS),
    ] {
        let urls = parsed(urls);
        group.bench_function(name, |b| {
            b.iter(|| {
                for url in &urls {
                    black_box(classify(black_box(url)));
                }
            });
        });
    }

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    group.bench_function("plain", |b| {
        b.iter(|| {
            for url in REGISTERED_URLS {
                black_box(normalize(black_box(url)).ok());
            }
        });
    });

    group.bench_function("obfuscated", |b| {
        b.iter(|| black_box(normalize(black_box("--504c4c484b0217175753164a4d174e1655480c")).ok()));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

fn ok_ru_page() -> String {
    let metadata = serde_json::json!({
        "videos": [
            { "name": "mobile", "url": "https://vd1.mycdn.me/?id=1&type=4" },
            { "name": "sd", "url": "https://vd1.mycdn.me/?id=1&type=2" },
            { "name": "hd", "url": "https://vd1.mycdn.me/?id=1&type=1" },
            { "name": "full", "url": "https://vd1.mycdn.me/?id=1&type=3" }
        ],
        "hlsManifestUrl": "https://vd1.mycdn.me/video.m3u8?id=1"
    });
    let options = serde_json::json!({ "flashvars": { "metadata": metadata.to_string() } })
        .to_string()
        .replace('&', "&amp;")
        .replace('"', "&quot;");
    format!("<html><body>{}<div data-options=\"{options}\"></div></body></html>", "<p>filler</p>".repeat(200))
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");

    let ok_ru = ok_ru_page();
    group.bench_function("ok_ru", |b| {
        b.iter(|| black_box(OkRuStrategy.extract(black_box(&ok_ru), "https://ok.ru/videoembed/1")));
    });

    let fast4speed = r#"<html><body><video src="/media/ep1.mp4"></video></body></html>"#;
    group.bench_function("fast4speed_html", |b| {
        b.iter(|| {
            black_box(Fast4SpeedStrategy.extract(black_box(fast4speed), "https://tools.fast4speed.rsvp/"))
        });
    });

    let generic = format!(
        "{}<script>var src = \"https:\\/\\/cdn.example\\/720p\\/ep.mp4\";</script>",
        "<p>https://example.com/page</p>".repeat(200)
    );
    group.bench_function("generic_scan", |b| {
        b.iter(|| black_box(GenericStrategy.extract(black_box(&generic), "https://player.example/")));
    });

    group.finish();
}

criterion_group!(benches, bench_classify, bench_normalize, bench_extract);
criterion_main!(benches);
