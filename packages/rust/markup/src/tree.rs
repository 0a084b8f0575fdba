//! Owned markup tree.
//!
//! Parsed pages are copied into this tree so the rewrite rules can mutate it
//! freely and so tests can build pages by hand without going through a parser.
//! Searches walk descendants in document order and never match the element
//! they are called on.

/// A node in the markup tree: an element or a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

/// An element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute.
    pub fn attr_with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Builder: append a child node.
    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn is(&self, tag: &str) -> bool {
        self.name.eq_ignore_ascii_case(tag)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Whether the whitespace-separated `class` attribute contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// `Some(n)` for `h1`..`h6`.
    pub fn heading_level(&self) -> Option<usize> {
        let level = self.name.strip_prefix('h')?;
        match level {
            "1" | "2" | "3" | "4" | "5" | "6" => level.parse().ok(),
            _ => None,
        }
    }

    /// All descendant text concatenated in document order, no tags.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }

    /// Direct children that are elements, skipping bare text.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// Consume the element, yielding its direct element children.
    pub fn into_child_elements(self) -> impl Iterator<Item = Element> {
        self.children.into_iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// Every descendant element in document order.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants<'a>(&'a self, out: &mut Vec<&'a Element>) {
        for el in self.child_elements() {
            out.push(el);
            el.collect_descendants(out);
        }
    }

    /// First descendant matching `pred`.
    pub fn find(&self, pred: impl Fn(&Element) -> bool) -> Option<&Element> {
        self.find_inner(&pred)
    }

    fn find_inner(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        for el in self.child_elements() {
            if pred(el) {
                return Some(el);
            }
            if let Some(found) = el.find_inner(pred) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_by_tag_class(&self, tag: &str, class: &str) -> Option<&Element> {
        self.find(|el| el.is(tag) && el.has_class(class))
    }

    pub fn find_by_tag_id(&self, tag: &str, id: &str) -> Option<&Element> {
        self.find(|el| el.is(tag) && el.id() == Some(id))
    }

    pub fn find_all_by_tag(&self, tag: &str) -> Vec<&Element> {
        self.descendants().into_iter().filter(|el| el.is(tag)).collect()
    }

    /// Descendants with the given tag carrying any of `classes`.
    pub fn find_all_by_tag_class(&self, tag: &str, classes: &[&str]) -> Vec<&Element> {
        self.descendants()
            .into_iter()
            .filter(|el| el.is(tag) && classes.iter().any(|c| el.has_class(c)))
            .collect()
    }

    /// Detach and return the first descendant matching `pred`.
    pub fn remove_first(&mut self, pred: impl Fn(&Element) -> bool) -> Option<Element> {
        self.remove_first_inner(&pred)
    }

    fn remove_first_inner(&mut self, pred: &dyn Fn(&Element) -> bool) -> Option<Element> {
        for i in 0..self.children.len() {
            let Node::Element(el) = &mut self.children[i] else {
                continue;
            };
            if pred(&*el) {
                return match self.children.remove(i) {
                    Node::Element(removed) => Some(removed),
                    Node::Text(_) => None,
                };
            }
            if let Some(found) = el.remove_first_inner(pred) {
                return Some(found);
            }
        }
        None
    }

    /// Replace descendants with text.
    ///
    /// `replacement` is offered each descendant in document order; when it
    /// returns `Some`, that whole subtree becomes a single text node and is not
    /// visited further. Returns the number of replacements made.
    pub fn replace_with_text(
        &mut self,
        mut replacement: impl FnMut(&Element) -> Option<String>,
    ) -> usize {
        self.replace_inner(&mut replacement)
    }

    fn replace_inner(&mut self, replacement: &mut dyn FnMut(&Element) -> Option<String>) -> usize {
        let mut count = 0;
        for child in &mut self.children {
            let Node::Element(el) = child else {
                continue;
            };
            match replacement(&*el) {
                Some(text) => {
                    *child = Node::Text(text);
                    count += 1;
                }
                None => count += el.replace_inner(replacement),
            }
        }
        count
    }

    /// Replace all of this element's content with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }
}
