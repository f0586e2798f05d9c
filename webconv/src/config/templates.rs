use crate::error::ConfigError;

/// Default configuration template in TOML, with every key explained.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# webconv configuration file

# URL of the site to mirror. Leave unset to convert an existing download
# directory instead.
# url = "https://example.com"

# Directory httrack downloads into (defaults to "<domain>_httrack")
# download_dir = "example.com_httrack"

# Output directory for the converted site (defaults to "<domain>_html")
# output_dir = "example.com_html"

# Skip mirroring even when a URL is set
no_download = false

# Which files to convert: "all", "md-only", "html-only" or "md-html".
# "all" also copies every other file verbatim.
file_types = "md-html"

# Only process this many files (also passed to httrack as --max-files)
# limit = 100

# httrack mirror depth
depth = 5

# Extra options passed to httrack, split on whitespace
# httrack_options = "--robots=0"

# Title of the generated index page
title = "Offline Mirror"

# Document language of generated pages
lang = "en"

# Abort the run after this many seconds, 0 disables the limit
timeout = 3600

# Number of threads used to convert files (defaults to number of CPU cores)
# jobs = 4

# Directory with templates overriding the built-in ones
# template_dir = "templates"

# List converted Markdown pages on the index page
index_markdown = false

# Serve the converted site when done
server = false

# First port to try when serving; up to 100 ports are probed
port = 8080

# Open a browser when serving
open_browser = true
"#;

/// Default configuration template in JSON format.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "no_download": false,
  "file_types": "md-html",
  "depth": 5,
  "title": "Offline Mirror",
  "lang": "en",
  "timeout": 3600,
  "index_markdown": false,
  "server": false,
  "port": 8080,
  "open_browser": true
}
"#;

/// Get the correct configuration template based on the requested format.
///
/// # Errors
///
/// Returns an error for formats other than `toml` and `json`.
pub fn get_template(format: &str) -> Result<&'static str, ConfigError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => Err(ConfigError::UnsupportedFormat(format.to_string())),
  }
}
