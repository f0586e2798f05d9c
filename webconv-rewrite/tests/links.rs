use webconv_rewrite::normalize;

const DOMAIN: &str = "example.com";

#[test]
fn test_relative_links_are_anchored() {
  assert_eq!(normalize("about", DOMAIN), "/example.com/about.html");
  assert_eq!(normalize("docs/guide", DOMAIN), "/example.com/docs/guide.html");
  assert_eq!(
    normalize("images/a.png", DOMAIN),
    "/example.com/images/a.png"
  );
  assert_eq!(normalize("docs/", DOMAIN), "/example.com/docs/");
}

#[test]
fn test_absolute_links_gain_domain() {
  assert_eq!(normalize("/", DOMAIN), "/example.com/");
  assert_eq!(normalize("/docs/intro", DOMAIN), "/example.com/docs/intro.html");
  assert_eq!(normalize("/css/site.css", DOMAIN), "/example.com/css/site.css");
  assert_eq!(
    normalize("/example.com/page.html", DOMAIN),
    "/example.com/page.html"
  );
}

#[test]
fn test_domain_prefix_must_be_a_full_segment() {
  assert_eq!(
    normalize("/example.com-other/x.html", DOMAIN),
    "/example.com/example.com-other/x.html"
  );
  assert_eq!(normalize("/d-other/x", "d"), "/d/d-other/x.html");
}

#[test]
fn test_markdown_links_become_html() {
  assert_eq!(normalize("readme.md", DOMAIN), "/example.com/readme.html");
  assert_eq!(
    normalize("guide.md?x=1", DOMAIN),
    "/example.com/guide.html?x=1"
  );
  assert_eq!(
    normalize("/api/ref.md#types", DOMAIN),
    "/example.com/api/ref.html#types"
  );
}

#[test]
fn test_query_and_fragment_are_preserved() {
  assert_eq!(
    normalize("search?q=rust#results", DOMAIN),
    "/example.com/search.html?q=rust#results"
  );
  assert_eq!(normalize("page#top", DOMAIN), "/example.com/page.html#top");
}

#[test]
fn test_passthrough_links() {
  for link in [
    "http://other.org/a",
    "https://other.org/a",
    "HTTPS://OTHER.ORG",
    "mailto:me@example.com",
    "tel:+123456",
    "javascript:void(0)",
    "ftp://files.example.com/x",
    "data:image/png;base64,AAAA",
    "//cdn.example.com/lib.js",
    "#section",
    "?page=2",
    "",
  ] {
    assert_eq!(normalize(link, DOMAIN), link, "{link:?} should pass through");
  }
}

#[test]
fn test_normalize_is_idempotent() {
  for link in [
    "about",
    "about.md",
    "docs/",
    "/",
    "/docs/intro",
    "/example.com/x",
    "../up/there",
    "./here.htm",
    "images/a.png",
    "page.md?x=1#y",
    "https://other.org",
    "#top",
    "/example.com-other/a",
  ] {
    let once = normalize(link, DOMAIN);
    let twice = normalize(&once, DOMAIN);
    assert_eq!(once, twice, "normalize({link:?}) is not idempotent");
  }
}
