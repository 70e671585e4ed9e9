//! Test fixtures and feed builders.
//!
//! Provides the recorded deal title corpus and a builder for RSS feed
//! documents, following the Builder pattern for clean test setup.

use serde::Deserialize;

/// A real deal title and the split it is expected to produce.
#[derive(Debug, Clone, Deserialize)]
pub struct TitleCase {
    pub title: String,
    pub name: String,
    pub price: String,
    pub note: String,
}

/// Loads the recorded title corpus from `tests/fixtures/deal_titles.json`.
pub fn title_corpus() -> Vec<TitleCase> {
    serde_json::from_str(include_str!("../fixtures/deal_titles.json"))
        .expect("title corpus should be valid JSON")
}

/// One `<item>` in a generated feed.
#[derive(Debug, Clone)]
struct TestItem {
    title: String,
    image: Option<String>,
    thumb_score: Option<i32>,
    body: String,
}

/// Builder for deals RSS documents.
///
/// # Example
///
/// ```ignore
/// let xml = TestFeedBuilder::new()
///     .with_item("Card Game 2 for $6")
///     .with_image("https://img.example/card.jpg")
///     .with_thumb_score(7)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct TestFeedBuilder {
    items: Vec<TestItem>,
}

impl TestFeedBuilder {
    /// Creates an empty feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item with the given raw title. The title is entity-escaped.
    pub fn with_item(mut self, title: &str) -> Self {
        self.items.push(TestItem {
            title: title.to_string(),
            image: None,
            thumb_score: None,
            body: String::new(),
        });
        self
    }

    /// Adds `count` items titled `"Item N $N"`.
    pub fn with_numbered_items(mut self, count: usize) -> Self {
        for n in 1..=count {
            self = self.with_item(&format!("Item {} ${}", n, n));
        }
        self
    }

    /// Sets the image of the last added item.
    pub fn with_image(mut self, url: &str) -> Self {
        if let Some(item) = self.items.last_mut() {
            item.image = Some(url.to_string());
        }
        self
    }

    /// Sets the thumb score of the last added item.
    pub fn with_thumb_score(mut self, score: i32) -> Self {
        if let Some(item) = self.items.last_mut() {
            item.thumb_score = Some(score);
        }
        self
    }

    /// Sets the HTML body of the last added item.
    pub fn with_body(mut self, html: &str) -> Self {
        if let Some(item) = self.items.last_mut() {
            item.body = html.to_string();
        }
        self
    }

    /// Renders the RSS document.
    pub fn build(&self) -> String {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <rss version=\"2.0\" xmlns:content=\"http://purl.org/rss/1.0/modules/content/\">\n\
             <channel>\n<title>Deals</title>\n",
        );

        for item in &self.items {
            let mut content = String::new();
            if let Some(url) = &item.image {
                content.push_str(&format!("<img src=\"{}\" alt=\"\" />", url));
            }
            content.push_str(&item.body);
            if let Some(score) = item.thumb_score {
                content.push_str(&format!("<br/>Thumb Score: {:+}", score));
            }

            xml.push_str("<item>\n");
            xml.push_str(&format!("<title>{}</title>\n", escape(&item.title)));
            xml.push_str(&format!(
                "<content:encoded><![CDATA[{}]]></content:encoded>\n",
                content
            ));
            xml.push_str("</item>\n");
        }

        xml.push_str("</channel>\n</rss>\n");
        xml
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
