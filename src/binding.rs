//! Trigger elements: which element fetches what, renders it with
//! which template, and where the result goes.

use std::fmt::{self, Display};

use jxdom::{Tree, NodeId};
use kstring::KString;

use crate::{markers::Markers, value::Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_TRIGGER: &str = "click";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub element: NodeId,
    pub method: Method,
    pub url: KString,
    pub template: Option<KString>,
    pub target: Option<KString>,
    pub save: Option<KString>,
    /// The event name; only recorded, there is no event loop here.
    pub trigger: KString,
}

/// The binding declared on element `id`, if it carries a GET or POST
/// attribute. POST wins if both are present.
pub fn binding_of(page: &Tree, id: NodeId, markers: &Markers) -> Option<Binding> {
    let e = page.element(id)?;
    let (method, url) = match (e.get_attribute(&markers.post), e.get_attribute(&markers.get)) {
        (Some(url), _) => (Method::Post, url),
        (None, Some(url)) => (Method::Get, url),
        (None, None) => return None,
    };
    Some(Binding {
        element: id,
        method,
        url: url.clone(),
        template: e.get_attribute(&markers.template).cloned(),
        target: e.get_attribute(&markers.target).cloned(),
        save: e.get_attribute(&markers.save).cloned(),
        trigger: e.get_attribute(&markers.trigger).cloned()
            .unwrap_or_else(|| KString::from_static(DEFAULT_TRIGGER)),
    })
}

/// All bindings in `page`, in document order.
pub fn discover_bindings(page: &Tree, markers: &Markers) -> Vec<Binding> {
    page.descendants(page.root())
        .filter_map(|id| binding_of(page, id, markers))
        .collect()
}

/// The binding an event on `id` is delegated to: the one on `id`
/// itself or on its nearest ancestor.
pub fn closest_binding(page: &Tree, id: NodeId, markers: &Markers) -> Option<Binding> {
    page.ancestors_or_self(id).find_map(|n| binding_of(page, n, markers))
}

/// Element lookup for the selector strings used in the markup and in
/// `BindConfig`: `#id` or a bare id.
pub fn select(page: &Tree, selector: &str) -> Option<NodeId> {
    page.find_element_by_id(selector.strip_prefix('#').unwrap_or(selector))
}

/// Binding set up from code instead of markup.
#[derive(Debug, Clone, PartialEq)]
pub struct BindConfig {
    pub url: Option<KString>,
    pub method: Method,
    pub template: KString,
    pub save: Option<KString>,
    /// Render this instead of fetching anything.
    pub data: Option<Value>,
}

impl BindConfig {
    pub fn fetch(url: &str, template: &str) -> BindConfig {
        BindConfig {
            url: Some(KString::from_ref(url)),
            method: Method::Get,
            template: KString::from_ref(template),
            save: None,
            data: None,
        }
    }

    pub fn data(template: &str, data: Value) -> BindConfig {
        BindConfig {
            url: None,
            method: Method::Get,
            template: KString::from_ref(template),
            save: None,
            data: Some(data),
        }
    }
}

/// Write the attributes for a fetching `config` onto element `id`, so
/// that it is picked up like a binding declared in markup. Nothing is
/// written for static-data configs (those have no markup form).
pub fn apply_bind_config(page: &mut Tree, id: NodeId, config: &BindConfig, markers: &Markers) {
    if config.data.is_some() {
        return
    }
    let url = match &config.url {
        Some(url) => url.clone(),
        None => return,
    };
    if let Some(e) = page.element_mut(id) {
        let (set, clear) = match config.method {
            Method::Get => (&markers.get, &markers.post),
            Method::Post => (&markers.post, &markers.get),
        };
        e.remove_attribute(clear);
        e.set_attribute(set, url);
        e.set_attribute(&markers.template, &config.template);
        if let Some(save) = &config.save {
            e.set_attribute(&markers.save, save);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use jxdom::parse_html;

    const PAGE: &str = "<div id=\"box\" jx-get=\"/a.json\" jx-template=\"a\">\
        <span id=\"inner\">click me</span></div>\
        <button id=\"b\" jx-post=\"/b\" jx-get=\"/ignored\" jx-target=\"#out\" \
        jx-save=\"bkey\" jx-trigger=\"mouseover\">b</button>\
        <p id=\"plain\">nothing</p><div id=\"out\"></div>";

    #[test]
    fn t_discover() {
        let page = parse_html(PAGE).unwrap();
        let m = Markers::default();
        let bindings = discover_bindings(&page, &m);
        assert_eq!(bindings.len(), 2);
        let a = &bindings[0];
        assert_eq!(a.method, Method::Get);
        assert_eq!(a.url, "/a.json");
        assert_eq!(a.template.as_deref(), Some("a"));
        assert_eq!(a.target, None);
        assert_eq!(a.trigger, "click");
        let b = &bindings[1];
        assert_eq!(b.method, Method::Post);
        assert_eq!(b.url, "/b");
        assert_eq!(b.template, None);
        assert_eq!(b.target.as_deref(), Some("#out"));
        assert_eq!(b.save.as_deref(), Some("bkey"));
        assert_eq!(b.trigger, "mouseover");
    }

    #[test]
    fn t_closest() {
        let page = parse_html(PAGE).unwrap();
        let m = Markers::default();
        let inner = select(&page, "#inner").unwrap();
        let b = closest_binding(&page, inner, &m).unwrap();
        assert_eq!(Some(b.element), select(&page, "box"));
        let plain = select(&page, "plain").unwrap();
        assert_eq!(closest_binding(&page, plain, &m), None);
    }

    #[test]
    fn t_apply_bind_config() {
        let mut page = parse_html(PAGE).unwrap();
        let m = Markers::default();
        let plain = select(&page, "plain").unwrap();
        let mut config = BindConfig::fetch("/p.json", "ptpl");
        config.save = Some("pkey".into());
        apply_bind_config(&mut page, plain, &config, &m);
        let b = binding_of(&page, plain, &m).unwrap();
        assert_eq!((b.method, b.url.as_str()), (Method::Get, "/p.json"));
        assert_eq!(b.template.as_deref(), Some("ptpl"));
        assert_eq!(b.save.as_deref(), Some("pkey"));

        // switching the method drops the other attribute
        config.method = Method::Post;
        apply_bind_config(&mut page, plain, &config, &m);
        let e = page.element(plain).unwrap();
        assert_eq!(e.get_attribute("jx-get"), None);
        assert_eq!(binding_of(&page, plain, &m).unwrap().method, Method::Post);

        let out = select(&page, "out").unwrap();
        apply_bind_config(&mut page, out, &BindConfig::data("t", Value::Null), &m);
        assert_eq!(binding_of(&page, out, &m), None);
    }
}
