//! Decoding of the declarative JSON shape `{ "tag", "attrs", "children" } | "text"`.

use serde_json::Value;

use crate::{AttrValue, ElementNode, InvalidNodeError, UiNode};

impl<N> UiNode<N> {
    /// Decodes a JSON description into a node tree.
    ///
    /// `attrs` and `children` are optional. String attribute values stay
    /// strings, anything else becomes [`AttrValue::Json`].
    pub fn from_json(value: Value) -> Result<Self, InvalidNodeError> {
        match value {
            Value::String(content) => Ok(UiNode::Text(content)),
            Value::Object(mut object) => {
                let tag = match object.remove("tag") {
                    Some(Value::String(tag)) => tag,
                    Some(other) => {
                        return Err(InvalidNodeError::NotANode {
                            found: json_kind(&other),
                        });
                    }
                    None => return Err(InvalidNodeError::NotANode { found: "object without tag" }),
                };
                let mut element = ElementNode {
                    tag,
                    attributes: Default::default(),
                    children: Vec::new(),
                    on_mount: None,
                };
                match object.remove("attrs") {
                    Some(Value::Object(attrs)) => {
                        for (name, value) in attrs {
                            let value = match value {
                                Value::String(value) => AttrValue::String(value),
                                other => AttrValue::Json(other),
                            };
                            element.attributes.insert(name, value);
                        }
                    }
                    Some(Value::Null) | None => {}
                    Some(other) => {
                        return Err(InvalidNodeError::NotANode {
                            found: json_kind(&other),
                        });
                    }
                }
                match object.remove("children") {
                    Some(Value::Array(children)) => {
                        for child in children {
                            element.children.push(UiNode::from_json(child)?);
                        }
                    }
                    Some(Value::Null) | None => {}
                    Some(other) => {
                        return Err(InvalidNodeError::NotANode {
                            found: json_kind(&other),
                        });
                    }
                }
                Ok(UiNode::Element(element))
            }
            other => Err(InvalidNodeError::NotANode {
                found: json_kind(&other),
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
