//! # webconv-rewrite
//!
//! The conversion core behind `webconv`: it turns the files of a mirrored
//! website into a self-contained static site served under a single
//! `/<domain>/` namespace.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::path::Path;
//!
//! use webconv_rewrite::{Site, rewrite_html};
//!
//! let site = Site::new("example.com").unwrap();
//! let page = rewrite_html(
//!   b"<p>See <a href='guide'>the guide</a></p>",
//!   &site,
//!   Path::new("intro.html"),
//! )
//! .unwrap();
//!
//! assert!(page.html.contains(r#"href="/example.com/guide.html""#));
//! ```
//!
//! ## Features
//!
//! - **Encoding detection** that probes raw bytes against UTF-8 and common
//!   legacy encodings, never failing
//! - **Link normalization** into the site namespace, idempotent by
//!   construction
//! - **HTML rewriting** on a parsed DOM, collapsing charset declarations
//! - **Markdown rendering** with `comrak` (behind the `markdown` feature)
//! - **Site index** grouping pages into categories by their first directory

pub mod encoding;
mod error;
pub mod html;
pub mod index;
pub mod links;
pub mod markdown;
pub mod page;
mod rewriter;
pub mod site;
pub mod utils;

pub use crate::{
  encoding::{Decoded, Detector, detect_and_decode},
  error::{Result, RewriteError},
  index::{IndexOptions, IndexSummary, build_index},
  links::normalize,
  page::{Converted, ContentKind, Page},
  rewriter::rewrite_html,
  site::{Site, domain_from_url},
};
