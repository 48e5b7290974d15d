//! The little HTML knowledge the tree needs: which elements never
//! have content (and hence no closing tag).

use std::collections::HashSet;

use kstring::KString;
use lazy_static::lazy_static;

// https://html.spec.whatwg.org/multipage/syntax.html#void-elements
const VOID_ELEMENT_NAMES: &[&str] = &[
    "area",
    "base",
    "br",
    "col",
    "embed",
    "hr",
    "img",
    "input",
    "link",
    "meta",
    "source",
    "track",
    "wbr",
];

lazy_static!{
    static ref VOID_ELEMENTS: HashSet<KString> =
        VOID_ELEMENT_NAMES.iter().map(|s| KString::from_static(s)).collect();
}

/// True for elements that are written without a closing tag and
/// can't take children.
pub fn is_void_element(tag_name: &str) -> bool {
    VOID_ELEMENTS.contains(tag_name)
}

/// The element whose content is registered as a template.
pub const TEMPLATE_TAG: &str = "template";

#[cfg(test)]
#[test]
fn t_is_void_element() {
    assert!(is_void_element("br"));
    assert!(is_void_element("img"));
    assert!(!is_void_element("div"));
    assert!(!is_void_element(TEMPLATE_TAG));
}
