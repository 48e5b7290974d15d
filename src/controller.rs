//! The page side: triggers lead to a fetch, the fetched JSON is
//! rendered with the bound template, and the result replaces the
//! previous output in the page.
//!
//! Everything here is synchronous; a trigger runs to completion
//! before the next one is looked at, so of two triggers writing to
//! the same place the later one wins.
//!
//! The page is compacted from time to time, which renumbers its
//! nodes: `NodeId`s obtained before a trigger or render must be looked
//! up again (e.g. via `binding::select`) afterwards.

use std::collections::HashMap;

use anyhow::{Result, anyhow, bail};
use chj_util::trace;
use jxdom::{Tree, NodeId, NodeMap, att, meta::TEMPLATE_TAG};
use kstring::KString;

use crate::{binding::{Binding, BindConfig, closest_binding,
                      apply_bind_config, select},
            cache::Cache,
            fetch::{Fetcher, BindError},
            markers::Markers,
            registry::TemplateRegistry,
            value::Value};

pub const ERROR_CLASS: &str = "jx-error";

/// Detached nodes tolerated in the page on top of twice the live ones.
const COMPACT_SLACK: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The render pass output was swapped in as `nodes`.
    Rendered { template: KString, nodes: Vec<NodeId> },
    /// Fetching, decoding or caching failed; an error element was
    /// swapped in.
    Failed { template: KString, message: String },
    /// The element has no binding.
    NoBinding,
    /// The binding names no template, or one that isn't registered.
    NoTemplate,
}

/// Where the output of a template without explicit target currently
/// sits in the page.
#[derive(Debug, Clone)]
struct Region {
    parent: NodeId,
    /// The sibling following the region when it was last filled.
    before: Option<NodeId>,
    nodes: Vec<NodeId>,
}

pub struct Controller<F, C> {
    page: Tree,
    registry: TemplateRegistry,
    fetcher: F,
    cache: C,
    regions: HashMap<KString, Region>,
    static_bindings: HashMap<NodeId, (KString, Value)>,
}

impl<F: Fetcher, C: Cache> Controller<F, C> {
    /// Registers the page's templates; they stay in the page until
    /// their first render replaces them.
    pub fn new(page: Tree, markers: Markers, fetcher: F, cache: C) -> Self {
        let registry = TemplateRegistry::from_page(&page, markers);
        Controller {
            page,
            registry,
            fetcher,
            cache,
            regions: HashMap::new(),
            static_bindings: HashMap::new(),
        }
    }

    pub fn page(&self) -> &Tree {
        &self.page
    }

    pub fn markers(&self) -> &Markers {
        self.registry.markers()
    }

    /// Handle an event on `element`: the nearest binding on it or its
    /// ancestors is run. On the same element, a static-data binding
    /// set up via `bind` takes precedence over markup.
    pub fn trigger(&mut self, element: NodeId) -> Result<Outcome> {
        let markup = closest_binding(&self.page, element, self.markers());
        let ids: Vec<NodeId> = self.page.ancestors_or_self(element).collect();
        for id in ids {
            if let Some((template, data)) = self.static_bindings.get(&id).cloned() {
                return self.render_json(&template, &data)
            }
            if let Some(binding) = markup.as_ref().filter(|b| b.element == id) {
                return self.run(binding)
            }
        }
        Ok(Outcome::NoBinding)
    }

    /// Fetch, cache (if asked to), render, swap.
    pub fn run(&mut self, binding: &Binding) -> Result<Outcome> {
        let template = match &binding.template {
            Some(t) if self.registry.contains(t) => t.clone(),
            other => {
                trace!("binding {} {}: no template {other:?}, ignoring",
                       binding.method, binding.url);
                return Ok(Outcome::NoTemplate)
            }
        };
        trace!("jx:loading {} {}", binding.method, binding.url);
        let data = match self.fetch_and_save(binding) {
            Ok(data) => data,
            Err(e) => {
                let message = e.to_string();
                trace!("jx:error {} {}: {message}", binding.method, binding.url);
                self.swap_error(&template, binding.target.as_deref(), &message)?;
                return Ok(Outcome::Failed { template, message })
            }
        };
        let outcome = self.render_into(&template, binding.target.as_deref(), &data)?;
        trace!("jx:success {} {}", binding.method, binding.url);
        Ok(outcome)
    }

    fn fetch_json(&self, binding: &Binding) -> Result<Value, BindError> {
        let body = self.fetcher.fetch(binding.method, &binding.url)?;
        let data: serde_json::Value = serde_json::from_str(&body)?;
        Ok(data.into())
    }

    /// A failing cache write counts as a failed load, like a failed
    /// fetch.
    fn fetch_and_save(&mut self, binding: &Binding) -> Result<Value> {
        let data = self.fetch_json(binding)?;
        if let Some(key) = &binding.save {
            self.cache.set(key, &data.to_json_string())?;
        }
        Ok(data)
    }

    /// Render `template` with `data` directly, no fetching.
    pub fn render_json(&mut self, template: &str, data: &Value) -> Result<Outcome> {
        self.render_into(template, None, data)
    }

    /// Render `template` from the data cached under `key`. Returns
    /// false if nothing is cached under that key.
    pub fn load_cached(&mut self, key: &str, template: &str) -> Result<bool> {
        let s = match self.cache.get(key)? {
            Some(s) => s,
            None => return Ok(false),
        };
        let data = Value::from_json_str(&s)?;
        self.render_json(template, &data)?;
        Ok(true)
    }

    /// Set up a binding on the element found via `selector` from
    /// code. Returns false if there is no such element.
    pub fn bind(&mut self, selector: &str, config: BindConfig) -> Result<bool> {
        let id = match select(&self.page, selector) {
            Some(id) => id,
            None => return Ok(false),
        };
        match config.data {
            Some(data) => {
                self.static_bindings.insert(id, (config.template, data));
            }
            None => {
                if config.url.is_none() {
                    bail!("binding for {selector:?} has neither a url nor data")
                }
                let markers = self.registry.markers().clone();
                apply_bind_config(&mut self.page, id, &config, &markers);
            }
        }
        Ok(true)
    }

    /// `bind` followed by a trigger on the same element.
    pub fn load(&mut self, selector: &str, config: BindConfig) -> Result<Outcome> {
        if !self.bind(selector, config)? {
            bail!("no element {selector:?} in the page")
        }
        let id = select(&self.page, selector).ok_or_else(
            || anyhow!("element {selector:?} vanished"))?;
        self.trigger(id)
    }

    fn render_into(&mut self, template: &str, target: Option<&str>, data: &Value)
                   -> Result<Outcome>
    {
        let rendered = match self.registry.render(template, data) {
            Some(tree) => tree,
            None => return Ok(Outcome::NoTemplate),
        };
        let nodes = self.swap(template, target, &rendered)?;
        Ok(Outcome::Rendered { template: KString::from_ref(template), nodes })
    }

    fn swap_error(&mut self, template: &str, target: Option<&str>, message: &str)
                  -> Result<Vec<NodeId>>
    {
        let mut tree = Tree::new();
        let root = tree.root();
        let div = tree.new_element("div", vec![att("class", ERROR_CLASS)]);
        let text = tree.new_text(format!("Error: {message}"));
        tree.append_child(root, div);
        tree.append_child(div, text);
        self.swap(template, target, &tree)
    }

    /// Put the top-level nodes of `content` into the page: as the
    /// children of `target` if given, otherwise in place of the
    /// previous output of `template` (initially, the `<template>`
    /// element itself).
    fn swap(&mut self, template: &str, target: Option<&str>, content: &Tree)
            -> Result<Vec<NodeId>>
    {
        let nodes = self.place(template, target, content)?;
        match self.collect_garbage() {
            Some(map) => Ok(nodes.iter().filter_map(|id| map.get(*id)).collect()),
            None => Ok(nodes),
        }
    }

    fn place(&mut self, template: &str, target: Option<&str>, content: &Tree)
             -> Result<Vec<NodeId>>
    {
        if let Some(selector) = target {
            let id = select(&self.page, selector).ok_or_else(
                || anyhow!("target {selector:?} not found in the page"))?;
            return Ok(self.page.replace_children(id, content))
        }

        let region = match self.regions.get(template) {
            Some(region) => region.clone(),
            None => {
                let id = self.template_element(template).ok_or_else(
                    || anyhow!("template {template:?} has no place in the page"))?;
                let parent = self.page.parent(id).ok_or_else(
                    || anyhow!("template {template:?} is not attached to the page"))?;
                Region { parent, before: self.page.next_sibling(id), nodes: vec![id] }
            }
        };
        let following = region.nodes.last()
            .map_or(region.before, |last| self.page.next_sibling(*last));
        // Insert in front of the old output, which is then removed.
        let anchor = region.nodes.first().copied().or(following);
        let nodes = self.page.insert_tree_before(region.parent, content, anchor);
        self.page.detach_all(&region.nodes);
        let before = match nodes.last() {
            Some(last) => self.page.next_sibling(*last),
            None => following,
        };
        self.regions.insert(KString::from_ref(template),
                            Region { parent: region.parent, before, nodes: nodes.clone() });
        Ok(nodes)
    }

    /// Replaced output stays allocated in the page; once it outweighs
    /// the live nodes, the page is compacted and all ids held here are
    /// translated.
    fn collect_garbage(&mut self) -> Option<NodeMap> {
        let live = self.page.live_len();
        if self.page.allocated_len() <= 2 * live + COMPACT_SLACK {
            return None
        }
        let map = self.page.compact();
        self.regions.retain(|_, region| match map.get(region.parent) {
            Some(parent) => {
                region.parent = parent;
                region.before = region.before.and_then(|id| map.get(id));
                region.nodes = region.nodes.iter().filter_map(|id| map.get(*id)).collect();
                true
            }
            None => false,
        });
        self.static_bindings = std::mem::take(&mut self.static_bindings).into_iter()
            .filter_map(|(id, binding)| Some((map.get(id)?, binding)))
            .collect();
        Some(map)
    }

    fn template_element(&self, name: &str) -> Option<NodeId> {
        let id = self.page.find_element_by_id(name)?;
        let is_template = self.page.element(id).map_or(false, |e| e.tag == TEMPLATE_TAG);
        if is_template {
            Some(id)
        } else {
            None
        }
    }
}
