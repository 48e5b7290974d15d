//! The attribute names the library reacts to, all sharing one
//! prefix (`jx-` by default).

use kstring::KString;

pub const DEFAULT_PREFIX: &str = "jx-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub prefix: KString,
    /// Repetition anchor: `jx-each="items"` or `jx-each="."`.
    pub each: KString,
    /// Conditional: `jx-if="path"`.
    pub cond: KString,
    pub get: KString,
    pub post: KString,
    pub template: KString,
    pub target: KString,
    pub save: KString,
    pub trigger: KString,
}

impl Markers {
    pub fn with_prefix(prefix: &str) -> Markers {
        let name = |s: &str| KString::from_string(format!("{prefix}{s}"));
        Markers {
            prefix: KString::from_ref(prefix),
            each: name("each"),
            cond: name("if"),
            get: name("get"),
            post: name("post"),
            template: name("template"),
            target: name("target"),
            save: name("save"),
            trigger: name("trigger"),
        }
    }
}

impl Default for Markers {
    fn default() -> Self {
        Markers::with_prefix(DEFAULT_PREFIX)
    }
}

#[cfg(test)]
#[test]
fn t_with_prefix() {
    let m = Markers::default();
    assert_eq!(m.each, "jx-each");
    assert_eq!(m.cond, "jx-if");
    let m = Markers::with_prefix("data-x-");
    assert_eq!(m.get, "data-x-get");
    assert_eq!(m.trigger, "data-x-trigger");
}
