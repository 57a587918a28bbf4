//! Sitemap fetching and parsing.
//!
//! The fetcher performs a conditional GET against the sitemap and hands the
//! body to the parser, which walks `<url>` entries with a streaming XML
//! reader and pulls a product id out of each entry's `<loc>` path.

mod fetcher;
mod parser;

pub use fetcher::{HttpSitemapFetcher, SitemapFetch, SitemapSource};
pub use parser::{SitemapProduct, extract_id, parse_sitemap};
