//! Raw markup to [`Element`] tree.

use scraper::{ElementRef, Html};

use crate::tree::{Element, Node};

/// Tag name of the synthetic root returned by [`MarkupParser::parse`].
pub const DOCUMENT_ROOT: &str = "#document";

/// Turns a raw page into an owned tree.
///
/// The returned root is a synthetic `#document` element, so every real
/// element of the page (including `<html>`) is reachable as a descendant.
pub trait MarkupParser: Send + Sync {
    fn parse(&self, raw: &str) -> Element;
}

/// HTML5 parser backed by `scraper` / html5ever.
///
/// Elements and text are kept; comments, doctypes and processing
/// instructions are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl MarkupParser for HtmlParser {
    fn parse(&self, raw: &str) -> Element {
        let doc = Html::parse_document(raw);
        Element::new(DOCUMENT_ROOT).child(convert(doc.root_element()))
    }
}

fn convert(el: ElementRef<'_>) -> Element {
    let value = el.value();
    let mut out = Element::new(value.name());
    out.attrs = value
        .attrs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    for child in el.children() {
        match child.value() {
            scraper::Node::Text(text) => out.children.push(Node::Text(String::from(&**text))),
            scraper::Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    out.children.push(Node::Element(convert(child_el)));
                }
            }
            _ => {}
        }
    }

    out
}
