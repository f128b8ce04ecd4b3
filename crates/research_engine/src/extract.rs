use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub title: Option<String>,
    pub text: String,
}

pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str) -> ExtractedText;
}

/// Readable-text extractor:
/// - pulls `<title>` text if present
/// - walks `<article>` if present, otherwise `<body>`, otherwise the document
/// - drops scripting and presentation-only elements
/// - keeps block structure as line breaks.
#[derive(Debug, Default, Clone, Copy)]
pub struct MainTextExtractor;

impl Extractor for MainTextExtractor {
    fn extract(&self, html: &str) -> ExtractedText {
        let doc = Html::parse_document(html);

        let title = Selector::parse("title")
            .ok()
            .and_then(|sel| doc.select(&sel).next())
            .map(|t| collapse_whitespace(&t.text().collect::<String>()))
            .filter(|t| !t.is_empty());

        let root = first_match(&doc, "article")
            .or_else(|| first_match(&doc, "body"))
            .unwrap_or_else(|| doc.root_element());

        let mut builder = TextBuilder::default();
        for child in root.children() {
            visit_node(child, &mut builder);
        }

        ExtractedText {
            title,
            text: builder.finish(),
        }
    }
}

fn first_match<'a>(doc: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel).next()
}

fn visit_node(node: NodeRef<'_, Node>, builder: &mut TextBuilder) {
    match node.value() {
        Node::Text(text) => builder.append_text(text),
        Node::Element(element) => {
            let tag = element.name().to_ascii_lowercase();
            match tag.as_str() {
                "script" | "style" | "noscript" | "iframe" | "template" | "svg" | "head" => {}
                "br" => builder.ensure_newline(),
                "li" => {
                    builder.ensure_newline();
                    builder.append_text("- ");
                    visit_children(node, builder);
                    builder.ensure_newline();
                }
                "td" | "th" => {
                    visit_children(node, builder);
                    builder.append_text(" ");
                }
                "p" | "div" | "section" | "article" | "main" | "header" | "footer" | "nav"
                | "aside" | "figure" | "figcaption" | "table" | "tr" | "blockquote" | "ul"
                | "ol" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "pre" | "address" => {
                    builder.ensure_newline();
                    visit_children(node, builder);
                    builder.ensure_newline();
                }
                _ => visit_children(node, builder),
            }
        }
        _ => visit_children(node, builder),
    }
}

fn visit_children(node: NodeRef<'_, Node>, builder: &mut TextBuilder) {
    for child in node.children() {
        visit_node(child, builder);
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Default)]
struct TextBuilder {
    text: String,
    last_char: Option<char>,
}

impl TextBuilder {
    fn append_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                if self.last_char.is_none()
                    || self.last_char == Some(' ')
                    || self.last_char == Some('\n')
                {
                    continue;
                }
                self.push_char(' ');
            } else {
                self.push_char(ch);
            }
        }
    }

    fn ensure_newline(&mut self) {
        if self.text.is_empty() || self.last_char == Some('\n') {
            return;
        }
        if self.last_char == Some(' ') {
            self.text.pop();
        }
        self.push_char('\n');
    }

    fn push_char(&mut self, ch: char) {
        self.text.push(ch);
        self.last_char = Some(ch);
    }

    fn finish(self) -> String {
        self.text.trim().to_string()
    }
}
