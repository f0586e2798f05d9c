//! The site being converted: its domain namespace and the page shell shared
//! by every generated document.
use std::{fs, path::Path};

use log::debug;
use serde::Serialize;
use tera::Tera;
use url::Url;
use webconv_templates as templates;

use crate::error::{Result, RewriteError};

/// Domain used when no source URL is given.
pub const LOCAL_DOMAIN: &str = "local_content";

/// Title used when none is configured.
pub const DEFAULT_SITE_TITLE: &str = "Offline Mirror";

const PAGE: &str = "page";
const INDEX: &str = "index";
const REDIRECT: &str = "redirect";

/// Derive the site domain from an optional source URL.
///
/// The host (plus `_<port>` when the URL names one) becomes the single
/// top-level directory of the output tree, so anything outside
/// `[A-Za-z0-9._-]` is replaced with `_`. A URL without a scheme is read
/// as `http://<url>`.
///
/// # Errors
///
/// Returns an error if the URL cannot be parsed or has no host.
pub fn domain_from_url(url: Option<&str>) -> Result<String> {
  let Some(raw) = url.map(str::trim).filter(|u| !u.is_empty()) else {
    return Ok(LOCAL_DOMAIN.to_string());
  };

  let candidate = if raw.contains("://") {
    raw.to_string()
  } else {
    format!("http://{raw}")
  };

  let parsed = Url::parse(&candidate).map_err(|e| {
    RewriteError::InvalidUrl {
      url:    raw.to_string(),
      reason: e.to_string(),
    }
  })?;

  let host = parsed.host_str().ok_or_else(|| {
    RewriteError::InvalidUrl {
      url:    raw.to_string(),
      reason: "URL has no host".to_string(),
    }
  })?;

  let domain = match parsed.port() {
    Some(port) => format!("{host}_{port}"),
    None => host.to_string(),
  };

  Ok(sanitize_domain(&domain))
}

fn sanitize_domain(domain: &str) -> String {
  domain
    .chars()
    .map(|c| {
      if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
        c
      } else {
        '_'
      }
    })
    .collect()
}

fn is_path_safe(domain: &str) -> bool {
  !domain.is_empty()
    && domain != "."
    && domain != ".."
    && !domain.contains(['/', '\\'])
}

/// Summary of a page as listed in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
  pub path:  String,
  pub title: String,
}

/// A category card in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCard {
  pub name:  String,
  pub pages: Vec<PageLink>,
}

/// A site under conversion.
#[derive(Debug, Clone)]
pub struct Site {
  domain:     String,
  title:      String,
  lang:       String,
  templates:  Tera,
  stylesheet: String,
}

impl Site {
  /// Create a site using the built-in templates.
  ///
  /// # Errors
  ///
  /// Returns an error if the domain is not a single path-safe token or the
  /// built-in templates fail to compile.
  pub fn new(domain: impl Into<String>) -> Result<Self> {
    let domain = domain.into();
    if !is_path_safe(&domain) {
      return Err(RewriteError::InvalidDomain(domain));
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
      (PAGE, templates::PAGE_TEMPLATE),
      (INDEX, templates::INDEX_TEMPLATE),
      (REDIRECT, templates::REDIRECT_TEMPLATE),
    ])?;

    Ok(Self {
      domain,
      title: DEFAULT_SITE_TITLE.to_string(),
      lang: "en".to_string(),
      templates: tera,
      stylesheet: templates::DEFAULT_CSS.to_string(),
    })
  }

  #[must_use]
  pub fn with_title(mut self, title: impl Into<String>) -> Self {
    self.title = title.into();
    self
  }

  #[must_use]
  pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
    self.lang = lang.into();
    self
  }

  /// Override built-in templates and the stylesheet with same-named files
  /// from `dir`. Files that do not exist keep the built-in version.
  ///
  /// # Errors
  ///
  /// Returns an error if an override cannot be read or does not compile.
  pub fn with_template_dir(mut self, dir: &Path) -> Result<Self> {
    for (name, file) in [
      (PAGE, templates::PAGE_TEMPLATE_NAME),
      (INDEX, templates::INDEX_TEMPLATE_NAME),
      (REDIRECT, templates::REDIRECT_TEMPLATE_NAME),
    ] {
      if let Some(content) = read_override(dir, file)? {
        self.templates.add_raw_template(name, &content)?;
      }
    }

    if let Some(css) = read_override(dir, templates::STYLESHEET_NAME)? {
      self.stylesheet = css;
    }

    Ok(self)
  }

  #[must_use]
  pub fn domain(&self) -> &str {
    &self.domain
  }

  #[must_use]
  pub fn title(&self) -> &str {
    &self.title
  }

  /// Stylesheet contents to be written to `static/index.css`.
  #[must_use]
  pub fn stylesheet(&self) -> &str {
    &self.stylesheet
  }

  #[must_use]
  pub fn stylesheet_path(&self) -> String {
    format!("/{}/static/index.css", self.domain)
  }

  #[must_use]
  pub fn home_path(&self) -> String {
    format!("/{}/index.html", self.domain)
  }

  /// Wrap content in the page shell.
  ///
  /// # Errors
  ///
  /// Returns an error if the page template fails to render.
  pub fn render_page(&self, title: &str, content: &str) -> Result<String> {
    let mut context = self.base_context();
    context.insert("title", title);
    context.insert("content", content);
    Ok(self.templates.render(PAGE, &context)?)
  }

  /// Render the categorized index page.
  ///
  /// # Errors
  ///
  /// Returns an error if the index template fails to render.
  pub fn render_index(
    &self,
    categories: &[CategoryCard],
    placeholder: bool,
    generated_at: &str,
  ) -> Result<String> {
    let total_pages: usize = categories.iter().map(|c| c.pages.len()).sum();

    let mut context = self.base_context();
    context.insert("site_title", &self.title);
    context.insert("categories", categories);
    context.insert("total_pages", &total_pages);
    context.insert("total_categories", &categories.len());
    context.insert("placeholder", &placeholder);
    context.insert("generated_at", generated_at);
    Ok(self.templates.render(INDEX, &context)?)
  }

  /// Render the root redirect to the site index.
  ///
  /// # Errors
  ///
  /// Returns an error if the redirect template fails to render.
  pub fn render_redirect(&self) -> Result<String> {
    let mut context = self.base_context();
    context.insert("site_title", &self.title);
    context.insert("target", &self.home_path());
    Ok(self.templates.render(REDIRECT, &context)?)
  }

  fn base_context(&self) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("lang", &self.lang);
    context.insert("stylesheet_path", &self.stylesheet_path());
    context.insert("home_path", &self.home_path());
    context
  }
}

fn read_override(dir: &Path, file: &str) -> Result<Option<String>> {
  let path = dir.join(file);
  if !path.exists() {
    return Ok(None);
  }
  debug!("Using template override: {}", path.display());
  fs::read_to_string(&path)
    .map(Some)
    .map_err(|e| RewriteError::io(path, e))
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]

  use super::*;

  #[test]
  fn test_domain_from_url() {
    assert_eq!(
      domain_from_url(Some("https://example.com/docs/")).unwrap(),
      "example.com"
    );
    assert_eq!(
      domain_from_url(Some("http://localhost:8000/")).unwrap(),
      "localhost_8000"
    );
    assert_eq!(domain_from_url(Some("example.org")).unwrap(), "example.org");
    assert_eq!(domain_from_url(None).unwrap(), LOCAL_DOMAIN);
    assert_eq!(domain_from_url(Some("  ")).unwrap(), LOCAL_DOMAIN);
  }

  #[test]
  fn test_domain_from_url_rejects_garbage() {
    assert!(domain_from_url(Some("http://")).is_err());
  }

  #[test]
  fn test_site_rejects_unsafe_domain() {
    assert!(Site::new("a/b").is_err());
    assert!(Site::new("..").is_err());
    assert!(Site::new("").is_err());
  }

  #[test]
  fn test_render_page_shell() {
    let site = Site::new("d").unwrap().with_lang("de");
    let html = site.render_page("A & B", "<p>Body</p>").unwrap();

    assert!(html.contains(r#"<html lang="de">"#));
    assert!(html.contains("<title>A &amp; B</title>"));
    assert!(html.contains(r#"href="/d/static/index.css""#));
    assert!(html.contains(r#"<a href="/d/index.html">"#));
    assert!(html.contains("<p>Body</p>"));
  }

  #[test]
  fn test_render_redirect() {
    let site = Site::new("d").unwrap();
    let html = site.render_redirect().unwrap();
    assert!(html.contains(r#"content="0;url=/d/index.html""#));
  }

  #[test]
  fn test_template_dir_override() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("page.html"), "<main>{{ title }}</main>")
      .unwrap();
    fs::write(dir.path().join("index.css"), "body{}").unwrap();

    let site = Site::new("d")
      .unwrap()
      .with_template_dir(dir.path())
      .unwrap();
    assert_eq!(site.render_page("T", "").unwrap(), "<main>T</main>");
    assert_eq!(site.stylesheet(), "body{}");
    // Untouched templates keep the built-in version
    assert!(site.render_redirect().unwrap().contains("http-equiv"));
  }
}
