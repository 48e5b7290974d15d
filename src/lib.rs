//! Attribute-driven binding of JSON data into HTML templates.
//!
//! The core is `resolve` (dot paths into a `Value`) and `interpolate`
//! (loops, conditionals and `{{path}}` placeholders over a node tree
//! from the `jxdom` library). `controller` wires that up with markup
//! declared bindings, a `Fetcher` and a `Cache`.

pub mod boxed_error;
pub mod util;
pub mod config;

// core
pub mod value;
pub mod resolve;
pub mod placeholder;
pub mod markers;
pub mod interpolate;

pub mod registry;
pub mod binding;
pub mod fetch;
pub mod cache;
pub mod controller;

pub use interpolate::{interpolate, render_tree};
pub use markers::Markers;
pub use value::Value;
