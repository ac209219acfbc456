//! Declarative UI node model.
//!
//! A [`UiNode`] tree is pure data: it describes elements, attributes and text
//! leaves, plus an optional mount hook per element. It knows nothing about the
//! platform that will materialize it; the native node type is a type parameter
//! so the same tree shape works for the browser DOM and for in-memory test
//! surfaces.

mod error;
mod json;
mod node;
mod scope;

pub use error::{InvalidNodeError, validate_attribute_name, validate_tag_name};
pub use node::{AttrValue, ElementNode, MountHook, UiNode, element, text};
pub use scope::ScopeId;
