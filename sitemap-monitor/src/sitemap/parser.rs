use quick_xml::Reader;
use quick_xml::events::{BytesRef, Event};
use tracing::debug;

use crate::{Error, Result};

/// One product entry parsed from the sitemap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapProduct {
    pub id: String,
    /// First `<image:loc>` of the entry, used for liveness probing.
    pub probe_url: Option<String>,
    /// The entry's page `<loc>`.
    pub loc: String,
}

/// Which `<loc>` the reader is currently inside.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Target {
    None,
    Page,
    Image,
}

#[derive(Default)]
struct Entry {
    page_loc: String,
    image_loc: Option<String>,
}

impl Entry {
    fn push(&mut self, target: Target, text: &str) {
        match target {
            Target::Page => self.page_loc.push_str(text),
            Target::Image => {
                if let Some(loc) = self.image_loc.as_mut() {
                    loc.push_str(text);
                }
            }
            Target::None => {}
        }
    }
}

/// Extract the product id from an entry URL: the path segment right after
/// `marker` (e.g. `item` in `/us/item/N2712345001/`).
pub fn extract_id(loc: &str, marker: &str) -> Option<String> {
    let url = url::Url::parse(loc.trim()).ok()?;
    let mut segments = url.path_segments()?;
    segments.find(|segment| *segment == marker)?;
    segments
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn resolve_entity(entity: &BytesRef<'_>) -> Option<String> {
    let name = std::str::from_utf8(entity).ok()?;
    let resolved = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)?
        }
    };
    Some(resolved.to_string())
}

/// Parse a sitemap document into products in document order.
///
/// Entries whose `<loc>` carries no id after `marker` are skipped. Duplicate
/// ids are kept as separate entries.
pub fn parse_sitemap(xml: &str, marker: &str) -> Result<Vec<SitemapProduct>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut products = Vec::new();
    let mut entry: Option<Entry> = None;
    let mut in_image = false;
    let mut target = Target::None;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::SitemapParse(format!(
                "at position {}: {}",
                reader.error_position(),
                e
            ))
        })?;

        match event {
            Event::Start(start) => match start.local_name().as_ref() {
                b"url" => {
                    entry = Some(Entry::default());
                    in_image = false;
                }
                b"image" if entry.is_some() => in_image = true,
                b"loc" => {
                    if let Some(current) = entry.as_mut() {
                        if in_image {
                            // Only the first image of an entry is probed
                            if current.image_loc.is_none() {
                                current.image_loc = Some(String::new());
                                target = Target::Image;
                            }
                        } else {
                            target = Target::Page;
                        }
                    }
                }
                _ => {}
            },
            Event::Text(text) => {
                if let Some(current) = entry.as_mut() {
                    current.push(target, &String::from_utf8_lossy(&text));
                }
            }
            Event::CData(data) => {
                if let Some(current) = entry.as_mut() {
                    current.push(target, &String::from_utf8_lossy(&data));
                }
            }
            Event::GeneralRef(entity) => {
                if let (Some(current), Some(resolved)) = (entry.as_mut(), resolve_entity(&entity)) {
                    current.push(target, &resolved);
                }
            }
            Event::End(end) => match end.local_name().as_ref() {
                b"loc" => target = Target::None,
                b"image" => in_image = false,
                b"url" => {
                    if let Some(done) = entry.take() {
                        let loc = done.page_loc.trim().to_string();
                        match extract_id(&loc, marker) {
                            Some(id) => products.push(SitemapProduct {
                                id,
                                probe_url: done
                                    .image_loc
                                    .map(|u| u.trim().to_string())
                                    .filter(|u| !u.is_empty()),
                                loc,
                            }),
                            None => debug!(loc = %loc, "Skipping sitemap entry without product id"),
                        }
                    }
                    target = Target::None;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(products)
}
