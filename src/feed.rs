//! Deals RSS feed reading.
//!
//! Only the parts of the feed the deals listing needs are read: each item's
//! title and its `content:encoded` body, from which the product image and
//! community thumb score are lifted out.

use crate::domain::ParsedTitle;
use crate::error::{DealError, DealResult};
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of items read from a feed unless told otherwise.
pub const DEFAULT_ITEM_LIMIT: usize = 15;

/// Item body with the image and thumb score removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealContent {
    pub html: String,
    pub text: String,
}

/// One `<item>` of the feed before its title is parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub image: String,
    pub thumb_score: Option<String>,
    pub content: DealContent,
}

/// A deal as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb_score: Option<String>,
    pub content: DealContent,
}

impl Deal {
    /// Combines a feed item with its parsed title. Empty price and note
    /// fields are dropped.
    pub fn from_parts(item: FeedItem, parsed: &ParsedTitle) -> Self {
        Self {
            name: parsed.name.clone(),
            price: parsed.has_price().then(|| parsed.price.clone()),
            note: parsed.has_note().then(|| parsed.note.clone()),
            image: item.image,
            thumb_score: item.thumb_score,
            content: item.content,
        }
    }
}

/// Patterns applied to the decoded `content:encoded` body.
struct ContentPatterns;

impl ContentPatterns {
    fn image_src() -> &'static Regex {
        static PATTERN: Lazy<Regex> =
            Lazy::new(|| Regex::new(r#"<img src="([^"]+)""#).expect("Valid regex pattern"));
        &PATTERN
    }

    fn image_tag() -> &'static Regex {
        static PATTERN: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"(?i)<img[^>]*>").expect("Valid regex pattern"));
        &PATTERN
    }

    fn thumb_score() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?i)Thumb Score:\s*([+-]?\d+)").expect("Valid regex pattern")
        });
        &PATTERN
    }

    fn tag() -> &'static Regex {
        static PATTERN: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"<[^>]+>").expect("Valid regex pattern"));
        &PATTERN
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Encoded,
}

/// Text being gathered for one field of the open item.
#[derive(Debug)]
struct Capture {
    field: Field,
    text: String,
    /// Elements opened inside the field and not yet closed.
    depth: usize,
}

#[derive(Debug, Default)]
struct OpenItem {
    title: Option<String>,
    encoded: Option<String>,
    capture: Option<Capture>,
}

impl OpenItem {
    fn open(&mut self, name: &[u8]) {
        if let Some(capture) = self.capture.as_mut() {
            capture.depth += 1;
            return;
        }

        let field = match name {
            b"title" if self.title.is_none() => Field::Title,
            b"content:encoded" if self.encoded.is_none() => Field::Encoded,
            _ => return,
        };
        self.capture = Some(Capture {
            field,
            text: String::new(),
            depth: 0,
        });
    }

    fn close_capture(&mut self) {
        if let Some(capture) = self.capture.as_mut() {
            if capture.depth > 0 {
                capture.depth -= 1;
                return;
            }
        }

        if let Some(capture) = self.capture.take() {
            match capture.field {
                Field::Title => self.title = Some(capture.text),
                Field::Encoded => self.encoded = Some(capture.text),
            }
        }
    }
}

/// Gathers `<item>` elements from the event stream of a feed document.
#[derive(Debug)]
struct ItemCollector {
    limit: usize,
    has_root: bool,
    current: Option<OpenItem>,
    items: Vec<FeedItem>,
}

impl ItemCollector {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            has_root: false,
            current: None,
            items: Vec::new(),
        }
    }

    fn is_done(&self) -> bool {
        self.has_root && self.items.len() >= self.limit
    }

    fn open(&mut self, name: &[u8]) {
        if let Some(item) = self.current.as_mut() {
            item.open(name);
            return;
        }
        match name {
            b"rss" | b"channel" => self.has_root = true,
            b"item" => self.current = Some(OpenItem::default()),
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        let Some(item) = self.current.as_mut() else {
            return;
        };
        if item.capture.is_some() {
            item.close_capture();
            return;
        }
        if name == b"item" {
            if let Some(item) = self.current.take() {
                self.finish(item);
            }
        }
    }

    /// Handles a self-closing element such as `<item/>`.
    fn empty(&mut self, name: &[u8]) {
        if self.current.is_some() {
            return;
        }
        match name {
            b"rss" | b"channel" => self.has_root = true,
            b"item" => self.finish(OpenItem::default()),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(capture) = self.current.as_mut().and_then(|item| item.capture.as_mut()) {
            capture.text.push_str(text);
        }
    }

    fn finish(&mut self, item: OpenItem) {
        if self.items.len() < self.limit {
            self.items.push(build_item(
                item.title.unwrap_or_default(),
                item.encoded.as_deref().unwrap_or_default(),
            ));
        }
    }
}

/// Reads up to `limit` items from a deals RSS document.
///
/// Markup inside comments is ignored, and `<item/>` counts as an item with
/// no fields. Malformed XML is rejected.
pub fn parse_feed(xml: &str, limit: usize) -> DealResult<Vec<FeedItem>> {
    let mut reader = Reader::from_str(xml);
    let mut collector = ItemCollector::new(limit);

    while !collector.is_done() {
        match reader.read_event() {
            Ok(Event::Start(element)) => collector.open(element.name().as_ref()),
            Ok(Event::Empty(element)) => collector.empty(element.name().as_ref()),
            Ok(Event::End(element)) => collector.close(element.name().as_ref()),
            Ok(Event::Text(text)) => {
                let raw = String::from_utf8_lossy(&text.into_inner()).into_owned();
                collector.text(&html_escape::decode_html_entities(&raw));
            }
            Ok(Event::CData(data)) => {
                collector.text(&String::from_utf8_lossy(&data.into_inner()));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(DealError::InvalidFeed {
                    reason: format!(
                        "malformed XML at byte {}: {}",
                        reader.buffer_position(),
                        err
                    ),
                })
            }
        }
    }

    if !collector.has_root {
        return Err(DealError::InvalidFeed {
            reason: "document has no <rss> or <channel> element".to_string(),
        });
    }

    debug!(items = collector.items.len(), limit, "read feed items");
    Ok(collector.items)
}

fn build_item(title: String, encoded: &str) -> FeedItem {
    let image = ContentPatterns::image_src()
        .captures(encoded)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let thumb_score = ContentPatterns::thumb_score()
        .captures(encoded)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    let html = ContentPatterns::image_tag().replace_all(encoded, "");
    let html = ContentPatterns::thumb_score().replace_all(&html, "").into_owned();
    let text = ContentPatterns::tag().replace_all(&html, "").trim().to_string();

    FeedItem {
        title,
        image,
        thumb_score,
        content: DealContent { html, text },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEM: &str = r#"<rss><channel><item>
        <title>Lenovo 1080p Webcam $20 &amp; More</title>
        <content:encoded><![CDATA[<img src="https://img.example/1.jpg" /><p>Great cam</p> Thumb Score: +12]]></content:encoded>
    </item></channel></rss>"#;

    #[test]
    fn test_item_fields() {
        let items = parse_feed(ITEM, DEFAULT_ITEM_LIMIT).unwrap();
        assert_eq!(items.len(), 1);

        let item = &items[0];
        assert_eq!(item.title, "Lenovo 1080p Webcam $20 & More");
        assert_eq!(item.image, "https://img.example/1.jpg");
        assert_eq!(item.thumb_score.as_deref(), Some("+12"));
        assert_eq!(item.content.html, "<p>Great cam</p> ");
        assert_eq!(item.content.text, "Great cam");
    }

    #[test]
    fn test_rejects_non_feed() {
        let err = parse_feed("<html><body/></html>", 5).unwrap_err();
        assert!(matches!(err, DealError::InvalidFeed { .. }));
    }

    fn titles(xml: &str) -> Vec<String> {
        parse_feed(xml, DEFAULT_ITEM_LIMIT)
            .unwrap()
            .into_iter()
            .map(|item| item.title)
            .collect()
    }

    #[test]
    fn test_title_mixes_cdata_and_entities() {
        let xml = "<rss><item><title>a &lt;b&gt; <![CDATA[&amp;]]></title></item></rss>";
        assert_eq!(titles(xml), vec!["a <b> &amp;"]);
    }

    #[test]
    fn test_commented_out_item_is_skipped() {
        let xml = "<rss><channel>\
            <!-- <item><title>Ghost $1</title></item> -->\
            <item><title>Real $2</title></item>\
            </channel></rss>";
        assert_eq!(titles(xml), vec!["Real $2"]);
    }

    #[test]
    fn test_self_closing_item_keeps_its_neighbour() {
        let xml = "<rss><channel><item/><item><title>Card Game 2 for $6</title></item></channel></rss>";
        let items = parse_feed(xml, DEFAULT_ITEM_LIMIT).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], FeedItem::default());
        assert_eq!(items[1].title, "Card Game 2 for $6");
    }

    #[test]
    fn test_channel_title_is_not_an_item() {
        let xml = "<rss><channel><title>Deals</title><item><title>Anvil $5</title></item></channel></rss>";
        assert_eq!(titles(xml), vec!["Anvil $5"]);
    }

    #[test]
    fn test_rejects_mismatched_tags() {
        let err = parse_feed("<rss><channel><item></channel></rss>", 5).unwrap_err();
        assert!(matches!(err, DealError::InvalidFeed { .. }));
    }

    #[test]
    fn test_deal_drops_empty_fields() {
        let parsed = ParsedTitle {
            name: "Webcam".to_string(),
            price: "$20".to_string(),
            note: String::new(),
        };
        let deal = Deal::from_parts(FeedItem::default(), &parsed);
        assert_eq!(deal.price.as_deref(), Some("$20"));
        assert_eq!(deal.note, None);

        let json = serde_json::to_string(&deal).unwrap();
        assert!(!json.contains("note"));
        assert!(!json.contains("thumbScore"));
    }
}
