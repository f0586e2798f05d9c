#![allow(
  clippy::expect_used,
  clippy::unwrap_used,
  reason = "Fine in benchmarks"
)]
use std::{hint::black_box, path::Path};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use webconv_rewrite::{Site, detect_and_decode, markdown, normalize, rewrite_html};

const HTML_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta http-equiv="Content-Type" content="text/html; charset=gb2312">
    <title>Documentation</title>
    <link rel="stylesheet" href="css/style.css" />
    <script defer src="/js/main.js"></script>
  </head>
  <body>
    <nav>
      <a href="/">Home</a>
      <a href="guide">Guide</a>
      <a href="reference/index.md#options">Reference</a>
      <a href="https://example.org/">Elsewhere</a>
      <a href="mailto:team@example.com">Mail</a>
    </nav>
    <main>
      <h1>Getting Started</h1>
      <p>Read the <a href="install.md">install notes</a> first.</p>
      <img src="img/diagram.png" alt="Diagram">
      <p>Then move on to <a href="usage?lang=en">usage</a>.</p>
    </main>
  </body>
</html>"#;

const HTML_FRAGMENT: &str = r#"<h2>Changelog</h2>
<ul>
  <li><a href="v2/notes">2.0</a></li>
  <li><a href="v1/notes.html">1.0</a></li>
</ul>"#;

const MARKDOWN: &str = r"# Handbook

Some *emphasis*, a [relative link](chapter/one.md) and a table:

| Name | Value |
|------|-------|
| a    | 1     |
| b    | 2     |

- [x] done
- [ ] pending
";

const LINKS: &[&str] = &[
  "about",
  "about.md",
  "/docs/guide/",
  "images/logo.png",
  "https://example.org/x",
  "#top",
  "page.md?x=1#y",
];

fn bench_normalize(c: &mut Criterion) {
  c.bench_function("normalize_links", |b| {
    b.iter(|| {
      for link in LINKS {
        black_box(normalize(black_box(link), "example.com"));
      }
    });
  });
}

fn bench_decode(c: &mut Criterion) {
  let mut group = c.benchmark_group("decode");

  let utf8 = HTML_PAGE.as_bytes().to_vec();
  let (gbk, ..) = encoding_rs::GBK.encode(&HTML_PAGE.replace("Home", "首页"));
  let gbk = gbk.into_owned();

  group.bench_with_input(BenchmarkId::new("utf8", "page"), &utf8, |b, raw| {
    b.iter(|| detect_and_decode(black_box(raw)));
  });
  group.bench_with_input(BenchmarkId::new("gbk", "page"), &gbk, |b, raw| {
    b.iter(|| detect_and_decode(black_box(raw)));
  });

  group.finish();
}

fn bench_rewrite(c: &mut Criterion) {
  let mut group = c.benchmark_group("rewrite");
  let site = Site::new("example.com").unwrap();

  group.bench_with_input(
    BenchmarkId::new("html", "document"),
    &HTML_PAGE,
    |b, html| {
      b.iter(|| {
        rewrite_html(
          black_box(html.as_bytes()),
          &site,
          Path::new("index.html"),
        )
        .unwrap()
      });
    },
  );

  group.bench_with_input(
    BenchmarkId::new("html", "fragment"),
    &HTML_FRAGMENT,
    |b, html| {
      b.iter(|| {
        rewrite_html(
          black_box(html.as_bytes()),
          &site,
          Path::new("changelog.html"),
        )
        .unwrap()
      });
    },
  );

  group.bench_with_input(
    BenchmarkId::new("markdown", "handbook"),
    &MARKDOWN,
    |b, md| {
      b.iter(|| markdown::render(black_box(md.as_bytes()), &site).unwrap());
    },
  );

  group.finish();
}

criterion_group!(benches, bench_normalize, bench_decode, bench_rewrite);
criterion_main!(benches);
