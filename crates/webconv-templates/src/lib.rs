use std::collections::HashMap;

pub const PAGE_TEMPLATE: &str = include_str!("../templates/page.html");
pub const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");
pub const REDIRECT_TEMPLATE: &str = include_str!("../templates/redirect.html");

pub const DEFAULT_CSS: &str = include_str!("../templates/index.css");

/// File names of the built-in templates, as looked up in a user template
/// directory.
pub const PAGE_TEMPLATE_NAME: &str = "page.html";
pub const INDEX_TEMPLATE_NAME: &str = "index.html";
pub const REDIRECT_TEMPLATE_NAME: &str = "redirect.html";
pub const STYLESHEET_NAME: &str = "index.css";

#[must_use]
pub fn all_templates() -> HashMap<&'static str, &'static str> {
  let mut templates = HashMap::new();
  templates.insert(PAGE_TEMPLATE_NAME, PAGE_TEMPLATE);
  templates.insert(INDEX_TEMPLATE_NAME, INDEX_TEMPLATE);
  templates.insert(REDIRECT_TEMPLATE_NAME, REDIRECT_TEMPLATE);
  templates.insert(STYLESHEET_NAME, DEFAULT_CSS);
  templates
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_all_templates_are_embedded() {
    let templates = all_templates();
    assert_eq!(templates.len(), 4);
    assert!(templates.values().all(|content| !content.is_empty()));
  }

  #[test]
  fn test_page_template_links_stylesheet() {
    assert!(PAGE_TEMPLATE.contains("{{ stylesheet_path | escape_xml }}"));
    assert!(PAGE_TEMPLATE.contains("{{ content }}"));
  }
}
