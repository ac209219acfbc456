use thiserror::Error;

/// Error produced when a node tree cannot be materialized.
///
/// This always points at a programming error in the code that built the tree,
/// never at a runtime condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidNodeError {
    /// A decoded value is neither a text leaf nor an element.
    #[error("invalid node: expected a string or an element object, found {found}")]
    NotANode { found: &'static str },
    #[error("invalid node: element tag name is empty")]
    EmptyTag,
    #[error("invalid node: `{tag}` is not a valid tag name")]
    InvalidTagName { tag: String },
    #[error("invalid node: `{name}` is not a valid attribute name on <{tag}>")]
    InvalidAttributeName { tag: String, name: String },
}

/// Checks a tag name the way `document.createElement` does, minus the
/// unicode ranges we never emit.
pub fn validate_tag_name(tag: &str) -> Result<(), InvalidNodeError> {
    let mut chars = tag.chars();
    let Some(first) = chars.next() else {
        return Err(InvalidNodeError::EmptyTag);
    };
    if !first.is_ascii_alphabetic() || tag.chars().any(is_forbidden_in_name) {
        return Err(InvalidNodeError::InvalidTagName {
            tag: tag.to_string(),
        });
    }
    Ok(())
}

pub fn validate_attribute_name(tag: &str, name: &str) -> Result<(), InvalidNodeError> {
    if name.is_empty() || name.chars().any(is_forbidden_in_name) {
        return Err(InvalidNodeError::InvalidAttributeName {
            tag: tag.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}

fn is_forbidden_in_name(c: char) -> bool {
    c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '<' | '>' | '/' | '=')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_dashed_names() {
        assert!(validate_tag_name("div").is_ok());
        assert!(validate_tag_name("h1").is_ok());
        assert!(validate_tag_name("custom-element").is_ok());
        assert!(validate_attribute_name("div", "form-wrapper").is_ok());
        assert!(validate_attribute_name("div", "data-x").is_ok());
    }

    #[test]
    fn rejects_empty_and_malformed_tags() {
        assert_eq!(validate_tag_name(""), Err(InvalidNodeError::EmptyTag));
        assert!(matches!(
            validate_tag_name("1div"),
            Err(InvalidNodeError::InvalidTagName { .. })
        ));
        assert!(matches!(
            validate_tag_name("my tag"),
            Err(InvalidNodeError::InvalidTagName { .. })
        ));
        assert!(matches!(
            validate_tag_name("<p>"),
            Err(InvalidNodeError::InvalidTagName { .. })
        ));
    }

    #[test]
    fn rejects_malformed_attribute_names() {
        let error = validate_attribute_name("input", "type=text").unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid node: `type=text` is not a valid attribute name on <input>"
        );
        assert!(validate_attribute_name("input", "").is_err());
    }
}
