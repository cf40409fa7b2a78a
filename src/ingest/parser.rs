// src/ingest/parser.rs
//
// Feed parser: raw RSS/Atom document -> ordered `RawItem`s.
// Event-driven quick-xml reader so a truncated or malformed document
// degrades to "items parsed so far" instead of an error.

use once_cell::sync::OnceCell;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::ingest::types::RawItem;

/// Hard cap on items taken from a single feed document.
pub const MAX_ITEMS_PER_FEED: usize = 10;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Description,
    Content,
    PubDate,
}

fn field_for(name: &[u8]) -> Option<Field> {
    match name {
        b"title" => Some(Field::Title),
        b"link" => Some(Field::Link),
        b"description" | b"summary" => Some(Field::Description),
        b"content:encoded" | b"content" => Some(Field::Content),
        b"pubDate" | b"published" | b"updated" | b"dc:date" => Some(Field::PubDate),
        _ => None,
    }
}

#[derive(Default)]
struct ItemAccum {
    title: String,
    link: String,
    description: String,
    content: String,
    pub_date: String,
    enclosure_image: Option<String>,
    media_image: Option<String>,
}

impl ItemAccum {
    fn has_text(&self, field: Field) -> bool {
        let buf = match field {
            Field::Title => &self.title,
            Field::Link => &self.link,
            Field::Description => &self.description,
            Field::Content => &self.content,
            Field::PubDate => &self.pub_date,
        };
        !buf.trim().is_empty()
    }

    fn push_text(&mut self, field: Field, text: &str) {
        let buf = match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Description => &mut self.description,
            Field::Content => &mut self.content,
            Field::PubDate => &mut self.pub_date,
        };
        buf.push_str(text);
    }

    /// Validate and clean one accumulated entry. Items without a usable
    /// title or link cannot be deduplicated or displayed and are dropped.
    fn finish(self) -> Option<RawItem> {
        let title = clean_text(&self.title);
        let link = clean_text(&self.link);
        if title.is_empty() || link.is_empty() {
            metrics::counter!("ingest_rejected_total").increment(1);
            return None;
        }

        // Description falls back to the full-content field when absent.
        let raw_body = if self.description.trim().is_empty() {
            self.content
        } else {
            self.description
        };

        // Image precedence: typed enclosure, then image media:content,
        // then the first <img> embedded in the body markup.
        let image_reference = self
            .enclosure_image
            .or(self.media_image)
            .or_else(|| extract_img_src(&raw_body));

        let pub_date = {
            let p = clean_text(&self.pub_date);
            if p.is_empty() {
                None
            } else {
                Some(p)
            }
        };

        Some(RawItem {
            title,
            link,
            description: clean_text(&raw_body),
            pub_date,
            image_reference,
        })
    }
}

/// Parse a feed document into at most [`MAX_ITEMS_PER_FEED`] items,
/// preserving document order. Never panics and never returns an error:
/// malformed input yields whatever was parsed before the breakage.
pub fn parse_feed(xml: &str) -> Vec<RawItem> {
    let mut reader = Reader::from_str(xml);
    let mut items: Vec<RawItem> = Vec::new();
    let mut current: Option<ItemAccum> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                match name.as_ref() {
                    b"item" | b"entry" => {
                        current = Some(ItemAccum::default());
                        field = None;
                    }
                    n => {
                        if let Some(accum) = current.as_mut() {
                            handle_element(accum, n, &e, &mut field);
                        }
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                if let Some(accum) = current.as_mut() {
                    let name = e.name();
                    handle_element(accum, name.as_ref(), &e, &mut field);
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(accum), Some(f)) = (current.as_mut(), field) {
                    let text = t
                        .unescape()
                        .map(|c| c.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(t.as_ref()).into_owned());
                    accum.push_text(f, &text);
                }
            }
            Ok(Event::CData(t)) => {
                if let (Some(accum), Some(f)) = (current.as_mut(), field) {
                    let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                    accum.push_text(f, &text);
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"item" | b"entry" => {
                    if let Some(accum) = current.take() {
                        if let Some(item) = accum.finish() {
                            items.push(item);
                            if items.len() >= MAX_ITEMS_PER_FEED {
                                break;
                            }
                        }
                    }
                    field = None;
                }
                n => {
                    if field_for(n).is_some() {
                        field = None;
                    }
                }
            },
            Ok(Event::Eof) => break,
            // Malformed markup: keep what we have.
            Err(_) => break,
            Ok(_) => {}
        }
    }

    items
}

fn handle_element(
    accum: &mut ItemAccum,
    name: &[u8],
    e: &BytesStart<'_>,
    field: &mut Option<Field>,
) {
    match name {
        b"enclosure" => {
            if let Some(url) = image_url_from_attrs(e, b"type") {
                accum.enclosure_image.get_or_insert(url);
            }
        }
        b"media:content" => {
            let url = image_url_from_attrs(e, b"medium").or_else(|| image_url_from_attrs(e, b"type"));
            if let Some(url) = url {
                accum.media_image.get_or_insert(url);
            }
        }
        b"link" => {
            // Atom links carry the target in `href`; RSS links are text.
            if let Some(href) = attr_value(e, b"href") {
                let rel = attr_value(e, b"rel");
                let is_alternate = rel.as_deref().map_or(true, |r| r == "alternate");
                if is_alternate && accum.link.trim().is_empty() {
                    accum.link = href;
                }
                *field = None;
            } else {
                *field = Some(Field::Link);
            }
        }
        n => {
            // First element wins per field: an entry carrying both
            // <published> and <updated> keeps the earlier one intact.
            if let Some(f) = field_for(n) {
                *field = if accum.has_text(f) { None } else { Some(f) };
            }
        }
    }
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// `url` attribute of an element whose `kind_attr` marks it as an image
/// (`type="image/..."` or `medium="image"`).
fn image_url_from_attrs(e: &BytesStart<'_>, kind_attr: &[u8]) -> Option<String> {
    let kind = attr_value(e, kind_attr)?;
    if !kind.to_ascii_lowercase().starts_with("image") {
        return None;
    }
    attr_value(e, b"url").filter(|u| !u.is_empty())
}

/// Clean one extracted field: unwrap CDATA wrappers, strip markup tags,
/// decode character entities, trim. Tags are stripped before decoding so
/// escaped markup (`&lt;b&gt;`) survives as literal text.
///
/// The entity decode is for text the XML layer never touched: CDATA
/// sections and double-escaped feed bodies. A literal `&amp;amp;` in
/// plain element text therefore decodes twice, down to `&`.
pub fn clean_text(s: &str) -> String {
    static RE_CDATA: OnceCell<regex::Regex> = OnceCell::new();
    let re_cdata =
        RE_CDATA.get_or_init(|| regex::Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap());
    let unwrapped = re_cdata.replace_all(s, "$1");

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    let stripped = re_tags.replace_all(&unwrapped, "");

    html_escape::decode_html_entities(stripped.as_ref())
        .trim()
        .to_string()
}

/// First `<img src="...">` inside body markup, if any.
fn extract_img_src(body: &str) -> Option<String> {
    static RE_IMG: OnceCell<regex::Regex> = OnceCell::new();
    let re_img =
        RE_IMG.get_or_init(|| regex::Regex::new(r#"(?i)<img[^>]*src="([^"]*)""#).unwrap());
    re_img
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|u| !u.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_decodes_the_standard_entities() {
        assert_eq!(clean_text("Fish &amp; Chips"), "Fish & Chips");
        assert_eq!(clean_text("&lt;b&gt;bold&lt;/b&gt;"), "<b>bold</b>");
        assert_eq!(clean_text("say &quot;hi&quot; &#39;now&#39;"), "say \"hi\" 'now'");
    }

    #[test]
    fn clean_text_unwraps_cdata_and_strips_tags() {
        let s = "<![CDATA[<p>Hello <b>world</b></p>]]>";
        assert_eq!(clean_text(s), "Hello world");
    }

    #[test]
    fn cdata_wrapped_entities_still_decode() {
        // CDATA content bypasses XML unescaping, so its entities reach
        // the cleaner intact and must be decoded there.
        let xml = r#"<rss><channel><item>
            <title><![CDATA[Fish &amp; Chips]]></title>
            <link>https://example.com/fish</link>
        </item></channel></rss>"#;
        let items = parse_feed(xml);
        assert_eq!(items[0].title, "Fish & Chips");
    }

    #[test]
    fn clean_text_trims_whitespace() {
        assert_eq!(clean_text("  spaced out \n"), "spaced out");
    }

    #[test]
    fn img_src_extraction_is_case_insensitive() {
        let body = r#"<p>x</p><IMG src="https://cdn.example.com/a.png" alt="a">"#;
        assert_eq!(
            extract_img_src(body).as_deref(),
            Some("https://cdn.example.com/a.png")
        );
        assert_eq!(extract_img_src("<p>no image</p>"), None);
    }

    #[test]
    fn items_without_title_or_link_are_dropped() {
        let xml = r#"<rss><channel>
            <item><title>Only title</title></item>
            <item><link>https://example.com/only-link</link></item>
            <item><title>Ok</title><link>https://example.com/ok</link></item>
        </channel></rss>"#;
        let items = parse_feed(xml);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Ok");
    }

    #[test]
    fn malformed_document_degrades_to_empty() {
        let items = parse_feed("this is not xml at all <<<>>>");
        assert!(items.is_empty());
    }
}
