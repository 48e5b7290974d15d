//! Named templates, registered once and only ever cloned from.

use std::collections::HashMap;

use jxdom::{Tree, NodeId, meta::TEMPLATE_TAG};
use kstring::KString;

use crate::{interpolate::render_tree, markers::Markers, value::Value};

/// A "cold" fragment: never bound into directly.
#[derive(Debug, Clone)]
pub struct Template {
    tree: Tree,
}

impl Template {
    /// The content of the `<template>` element `id` in `page`.
    pub fn from_element(page: &Tree, id: NodeId) -> Template {
        let mut tree = Tree::new();
        let root = tree.root();
        for child in page.children(id) {
            let copy = tree.import_subtree(page, *child);
            tree.append_child(root, copy);
        }
        Template { tree }
    }

    /// One render pass over a fresh copy of this template.
    pub fn render(&self, context: &Value, markers: &Markers) -> Tree {
        render_tree(&self.tree, context, markers)
    }
}

/// Owned by whoever renders; there is no global instance.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    markers: Markers,
    templates: HashMap<KString, Template>,
}

impl TemplateRegistry {
    pub fn new(markers: Markers) -> TemplateRegistry {
        TemplateRegistry { markers, templates: HashMap::new() }
    }

    /// Registers every `<template id="...">` in `page`. Template
    /// contents are not searched for further templates. With
    /// duplicate ids, the first one wins.
    pub fn from_page(page: &Tree, markers: Markers) -> TemplateRegistry {
        let mut registry = TemplateRegistry::new(markers);
        let mut stack: Vec<NodeId> = page.children(page.root()).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(e) = page.element(id) {
                if e.tag == TEMPLATE_TAG {
                    if let Some(name) = e.get_attribute("id") {
                        if !registry.templates.contains_key(name) {
                            let t = Template::from_element(page, id);
                            registry.templates.insert(name.clone(), t);
                        }
                    }
                    continue;
                }
            }
            stack.extend(page.children(id).iter().rev());
        }
        registry
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(|k| k.as_str()).collect();
        names.sort();
        names
    }

    /// Render template `name` against `context`; None if there is no
    /// such template.
    pub fn render(&self, name: &str, context: &Value) -> Option<Tree> {
        Some(self.get(name)?.render(context, &self.markers))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use jxdom::parse_html;
    use serde_json::json;

    const PAGE: &str = "<main>\
        <button jx-get=\"/users.json\" jx-template=\"users\">Load</button>\
        <template id=\"users\"><li jx-each=\".\">{{name}}</li></template>\
        <div><template id=\"greeting\"><p>Hi {{name}}<template id=\"inner\">x</template></p></template></div>\
        <template id=\"users\">duplicate</template>\
        <template>no id</template>\
        </main>";

    #[test]
    fn t_from_page() {
        let page = parse_html(PAGE).unwrap();
        let reg = TemplateRegistry::from_page(&page, Markers::default());
        assert_eq!(reg.names(), ["greeting", "users"]);
        assert!(!reg.contains("inner"));
        assert_eq!(reg.get("users").unwrap().tree.to_html_string(),
                   "<li jx-each=\".\">{{name}}</li>");
    }

    #[test]
    fn t_render_by_name() {
        let page = parse_html(PAGE).unwrap();
        let reg = TemplateRegistry::from_page(&page, Markers::default());
        let out = reg.render("users", &json!([{"name": "a"}, {"name": "b"}]).into()).unwrap();
        assert_eq!(out.to_html_string(), "<li>a</li><li>b</li>");
        let out = reg.render("greeting", &json!({"name": "Ada"}).into()).unwrap();
        assert_eq!(out.to_html_string(), "<p>Hi Ada<template id=\"inner\">x</template></p>");
        assert!(reg.render("nope", &Value::Null).is_none());
        // registered templates stay cold
        assert_eq!(reg.get("users").unwrap().tree.to_html_string(),
                   "<li jx-each=\".\">{{name}}</li>");
    }

    #[test]
    fn t_independent_registries() {
        let a = TemplateRegistry::from_page(
            &parse_html("<template id=\"t\"><b>{{.}}</b></template>").unwrap(),
            Markers::default());
        let b = TemplateRegistry::from_page(
            &parse_html("<template id=\"t\"><i>{{.}}</i></template>").unwrap(),
            Markers::default());
        assert!(TemplateRegistry::default().names().is_empty());
        assert_eq!(a.render("t", &json!(5).into()).unwrap().to_html_string(), "<b>5</b>");
        assert_eq!(b.render("t", &json!(5).into()).unwrap().to_html_string(), "<i>5</i>");
    }
}
