//! Section text normalizer.
//!
//! Each member node of a section goes through these rewrites, in order,
//! before its text is flattened:
//!
//! 1. `<b>` descendants become `**text**`
//! 2. `<a href>` descendants with visible text become `[text](href)`
//! 3. an `h3`/`h4` node becomes `### text\n` / `#### text\n`
//! 4. math images (`img.latex`, `img.latexcenter`) become their `alt` text
//!
//! Rule 3 flattens the heading before rule 4 runs, so math inside a
//! level-3/4 heading is dropped while bold and link markers survive.

use wikiharvest_shared::NormalizedText;

use crate::tree::Element;

/// Classes the wiki puts on rendered LaTeX images.
const MATH_IMAGE_CLASSES: [&str; 2] = ["latex", "latexcenter"];

/// Normalize a section's members into one text blob.
pub fn normalize(members: impl IntoIterator<Item = Element>) -> NormalizedText {
    let mut text = String::new();
    for member in members {
        text.push_str(&normalize_node(member));
    }
    NormalizedText::new(text)
}

/// Apply every rewrite to one node and return its flattened text.
pub fn normalize_node(mut node: Element) -> String {
    rewrite_bold(&mut node);
    rewrite_links(&mut node);
    rewrite_heading(&mut node);
    rewrite_math_images(&mut node);
    node.text()
}

fn rewrite_bold(node: &mut Element) {
    node.replace_with_text(|el| {
        if !el.is("b") {
            return None;
        }
        let text = el.text();
        (!text.is_empty()).then(|| format!("**{text}**"))
    });
}

fn rewrite_links(node: &mut Element) {
    node.replace_with_text(|el| {
        if !el.is("a") {
            return None;
        }
        let href = el.attr("href")?;
        let text = el.text();
        (!text.is_empty()).then(|| format!("[{text}]({href})"))
    });
}

fn rewrite_heading(node: &mut Element) {
    let Some(level @ (3 | 4)) = node.heading_level() else {
        return;
    };
    let text = node.text();
    if text.is_empty() {
        return;
    }
    node.set_text(format!("{} {text}\n", "#".repeat(level)));
}

fn rewrite_math_images(node: &mut Element) {
    node.replace_with_text(|el| {
        let is_math = el.is("img") && MATH_IMAGE_CLASSES.iter().any(|c| el.has_class(c));
        is_math.then(|| el.attr("alt").unwrap_or_default().to_string())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{HtmlParser, MarkupParser};

    /// Parse an HTML fragment and return the children of `<body>`.
    fn members(html: &str) -> Vec<Element> {
        let root = HtmlParser.parse(&format!("<html><body>{html}</body></html>"));
        root.find(|e| e.is("body"))
            .expect("body")
            .child_elements()
            .cloned()
            .collect()
    }

    fn norm(html: &str) -> String {
        normalize(members(html)).text
    }

    #[test]
    fn plain_paragraphs_concatenate() {
        assert_eq!(norm("<p>Find x.</p><p>Then y.</p>"), "Find x.Then y.");
    }

    #[test]
    fn bold_is_wrapped() {
        assert_eq!(norm("<p><b>Answer:</b> x=1</p>"), "**Answer:** x=1");
    }

    #[test]
    fn every_bold_in_a_node_is_wrapped() {
        assert_eq!(
            norm("<p><b>Lemma 1.</b> foo. <span><b>Lemma 2.</b></span> bar.</p>"),
            "**Lemma 1.** foo. **Lemma 2.** bar."
        );
    }

    #[test]
    fn empty_bold_is_left_alone() {
        assert_eq!(norm("<p>a<b></b>b</p>"), "ab");
    }

    #[test]
    fn link_with_text_and_target_becomes_markdown() {
        assert_eq!(
            norm(r#"<p>See <a href="/wiki/index.php/AM-GM">AM-GM</a>.</p>"#),
            "See [AM-GM](/wiki/index.php/AM-GM)."
        );
    }

    #[test]
    fn link_without_target_keeps_raw_text() {
        assert_eq!(norm("<p>See <a>anchor</a>.</p>"), "See anchor.");
    }

    #[test]
    fn link_without_text_contributes_nothing() {
        assert_eq!(norm(r#"<p>x<a href="/y"></a>z</p>"#), "xz");
    }

    #[test]
    fn bold_inside_link_is_kept_in_link_text() {
        assert_eq!(
            norm(r#"<p><a href="/t"><b>Theorem</b></a></p>"#),
            "[**Theorem**](/t)"
        );
    }

    #[test]
    fn level_three_and_four_headings_get_hashes() {
        assert_eq!(norm("<h3>Lemma</h3>"), "### Lemma\n");
        assert_eq!(norm("<h4>Case 1</h4><p>done</p>"), "#### Case 1\ndone");
    }

    #[test]
    fn other_heading_levels_are_flattened_only() {
        assert_eq!(norm("<h5>Note</h5>"), "Note");
    }

    #[test]
    fn heading_keeps_bold_markers_but_drops_math() {
        let html = r#"<h3><b>Claim</b> for <img class="latex" alt="$n$"></h3>"#;
        assert_eq!(norm(html), "### **Claim** for \n");
    }

    #[test]
    fn math_images_become_alt_text() {
        let html = r#"<p>Let <img class="latex" alt="$a+b$" src="a.png"> and</p><p><img class="latexcenter" alt="\[x^2\]"></p>"#;
        assert_eq!(norm(html), r"Let $a+b$ and\[x^2\]");
    }

    #[test]
    fn non_math_images_are_dropped_by_flattening() {
        assert_eq!(norm(r#"<p>x<img class="photo" alt="cat">y</p>"#), "xy");
    }

    #[test]
    fn math_image_without_alt_becomes_empty() {
        assert_eq!(norm(r#"<p>a<img class="latex">b</p>"#), "ab");
    }

    #[test]
    fn output_is_empty_iff_every_node_is_empty() {
        assert_eq!(norm("<p></p><div><span></span></div>"), "");
        assert!(normalize(Vec::new()).is_empty());
        assert_eq!(norm("<p></p><p>.</p>"), ".");
    }

    #[test]
    fn bold_rewrite_is_idempotent_in_content() {
        let first = norm("<p><b>Answer:</b> x=1 and <b>y</b></p>");
        let second = normalize([Element::new("p").child(first.as_str())]).text;
        assert_eq!(first, second);
    }

    #[test]
    fn hand_built_tree_normalizes_like_parsed_html() {
        let node = Element::new("p")
            .child(Element::new("b").child("Answer:"))
            .child(" x=1");
        assert_eq!(normalize_node(node), "**Answer:** x=1");
    }
}
