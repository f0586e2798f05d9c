#![allow(clippy::unwrap_used, reason = "Tests can unwrap")]
use std::path::Path;

use webconv_rewrite::{Site, detect_and_decode, markdown, rewrite_html};

fn site() -> Site {
  Site::new("d").unwrap().with_title("Docs")
}

#[test]
fn test_markdown_page() {
  let converted = markdown::render(b"# Hello\n\nWorld", &site()).unwrap();

  assert_eq!(converted.title.as_deref(), Some("Hello"));
  assert!(converted.synthesized);
  assert!(converted.html.contains("<title>Hello</title>"));
  assert!(converted.html.contains("<h1>Hello</h1>"));
  assert!(converted.html.contains("World"));
  assert!(converted.html.contains(r#"href="/d/static/index.css""#));
  assert!(converted.html.contains(r#"href="/d/index.html""#));
}

#[test]
fn test_markdown_without_heading_gets_default_title() {
  let converted = markdown::render(b"just text", &site()).unwrap();
  assert_eq!(
    converted.title.as_deref(),
    Some(markdown::DEFAULT_MARKDOWN_TITLE)
  );
}

#[test]
fn test_markdown_links_are_normalized() {
  let converted =
    markdown::render(b"See [setup](setup.md) and [home](https://x.org).", &site())
      .unwrap();
  assert!(converted.html.contains(r#"href="/d/setup.html""#));
  assert!(converted.html.contains(r#"href="https://x.org""#));
}

#[test]
fn test_html_document_links_rewritten() {
  let raw = br##"<html><head><meta http-equiv="Content-Type" content="text/html; charset=iso-8859-1"><title>T</title></head>
<body><img src="img/a.png"><a href="/x/">x</a><a href="#frag">f</a></body></html>"##;
  let converted = rewrite_html(raw, &site(), Path::new("t.html")).unwrap();

  assert!(converted.html.contains(r#"src="/d/img/a.png""#));
  assert!(converted.html.contains(r#"href="/d/x/""#));
  assert!(converted.html.contains(r##"href="#frag""##));
  assert!(converted.html.contains(r#"<meta charset="utf-8">"#));
  assert!(!converted.html.contains("iso-8859-1"));
}

#[test]
fn test_rewriting_twice_is_stable() {
  let raw = b"<html><head><title>T</title></head><body><a href='a/b'>x</a></body></html>";
  let once = rewrite_html(raw, &site(), Path::new("t.html")).unwrap();
  let twice =
    rewrite_html(once.html.as_bytes(), &site(), Path::new("t.html")).unwrap();
  assert_eq!(once.html, twice.html);
}

#[test]
fn test_decoding_never_fails() {
  let samples: [&[u8]; 4] = [
    b"",
    b"\xEF\xBB\xBFplain",
    b"\xFF\xFE\x00\x81\x82",
    &[0x80; 64],
  ];
  for raw in samples {
    // Any byte sequence yields some text
    let _ = detect_and_decode(raw).into_text();
  }
  assert_eq!(detect_and_decode(b"\xEF\xBB\xBFplain").text(), "plain");
}
