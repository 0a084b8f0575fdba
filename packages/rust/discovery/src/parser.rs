//! Item links on the index page.
//!
//! The index page links every item as
//! `/wiki/index.php/<year>_IMO_Problems/Problem_<n>`. Links are matched in
//! the raw markup, so no HTML parse is needed.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Matches an item link path.
static ITEM_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/wiki/index\.php/\d{4}_IMO_Problems/Problem_\d+").expect("item link regex")
});

/// Item locations found on an index page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemLinks {
    /// Unique locations, in the order they first appear.
    pub locations: Vec<String>,
    /// Matches dropped because the location was already listed.
    pub duplicates: usize,
}

/// Collect every item location in `html`, first occurrence wins.
pub(crate) fn find_item_links(html: &str) -> ItemLinks {
    let mut seen = HashSet::new();
    let mut links = ItemLinks::default();

    for m in ITEM_LINK_RE.find_iter(html) {
        let location = m.as_str();
        if seen.insert(location) {
            links.locations.push(location.to_string());
        } else {
            links.duplicates += 1;
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_links_in_document_order() {
        let html = r#"<a href="/wiki/index.php/2019_IMO_Problems/Problem_2">2</a>
<a href="/wiki/index.php/2019_IMO_Problems/Problem_1">1</a>"#;
        let links = find_item_links(html);
        assert_eq!(
            links.locations,
            vec![
                "/wiki/index.php/2019_IMO_Problems/Problem_2",
                "/wiki/index.php/2019_IMO_Problems/Problem_1",
            ]
        );
        assert_eq!(links.duplicates, 0);
    }

    #[test]
    fn duplicates_are_dropped() {
        let html = "/wiki/index.php/2018_IMO_Problems/Problem_1 \
                    /wiki/index.php/2018_IMO_Problems/Problem_1";
        let links = find_item_links(html);
        assert_eq!(links.locations.len(), 1);
        assert_eq!(links.duplicates, 1);
    }

    #[test]
    fn other_pages_are_not_items() {
        let html = r#"<a href="/wiki/index.php/2019_IMO">IMO</a>
<a href="/wiki/index.php/2019_IMO_Problems">Problems</a>
<a href="/wiki/index.php/19_IMO_Problems/Problem_1">bad year</a>"#;
        assert!(find_item_links(html).locations.is_empty());
    }

    #[test]
    fn index_fixture() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/html/imo_index.html");
        let html = std::fs::read_to_string(path).expect("read index fixture");
        let links = find_item_links(&html);
        assert_eq!(links.locations.len(), 3);
        assert_eq!(links.duplicates, 1);
        assert_eq!(links.locations[0], "/wiki/index.php/2019_IMO_Problems/Problem_1");
    }
}
