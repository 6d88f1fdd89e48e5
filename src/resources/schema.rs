//! Schema descriptors.
//!
//! A flat, dotted-path listing of every attribute a resource accepts.
//! Used for host schema registration and the `schema` subcommand.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    Int,
    Object,
    List,
    Set,
    Map,
}

/// `required`, `optional` and `computed` are not exclusive: an
/// optional-and-computed attribute may be omitted and is then filled in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttributeFlags {
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeSchema {
    pub path: String,
    pub flags: AttributeFlags,
    pub attribute_type: AttributeType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSchema {
    pub type_name: String,
    pub description: String,
    pub attributes: Vec<AttributeSchema>,
}

impl ResourceSchema {
    pub fn new(type_name: &str, description: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            description: description.to_string(),
            attributes: Vec::new(),
        }
    }

    fn push(mut self, path: &str, t: AttributeType, flags: AttributeFlags, description: &str) -> Self {
        self.attributes.push(AttributeSchema {
            path: path.to_string(),
            flags,
            attribute_type: t,
            description: description.to_string(),
            default: None,
        });
        self
    }

    pub fn required(self, path: &str, t: AttributeType, description: &str) -> Self {
        let flags = AttributeFlags {
            required: true,
            ..Default::default()
        };
        self.push(path, t, flags, description)
    }

    pub fn optional(self, path: &str, t: AttributeType, description: &str) -> Self {
        let flags = AttributeFlags {
            optional: true,
            ..Default::default()
        };
        self.push(path, t, flags, description)
    }

    pub fn optional_computed(self, path: &str, t: AttributeType, description: &str) -> Self {
        let flags = AttributeFlags {
            optional: true,
            computed: true,
            ..Default::default()
        };
        self.push(path, t, flags, description)
    }

    pub fn computed(self, path: &str, t: AttributeType, description: &str) -> Self {
        let flags = AttributeFlags {
            computed: true,
            ..Default::default()
        };
        self.push(path, t, flags, description)
    }

    /// Set the default rendering of the attribute added last.
    pub fn default_value(mut self, default: impl fmt::Display) -> Self {
        if let Some(last) = self.attributes.last_mut() {
            last.default = Some(default.to_string());
        }
        self
    }

    /// Mark the attribute added last as sensitive.
    pub fn sensitive(mut self) -> Self {
        if let Some(last) = self.attributes.last_mut() {
            last.flags.sensitive = true;
        }
        self
    }

    pub fn attribute(&self, path: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|a| a.path == path)
    }
}

impl fmt::Display for ResourceSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", self.type_name, self.description)?;
        for a in &self.attributes {
            let mut flags = Vec::new();
            if a.flags.required {
                flags.push("required");
            }
            if a.flags.optional {
                flags.push("optional");
            }
            if a.flags.computed {
                flags.push("computed");
            }
            if a.flags.sensitive {
                flags.push("sensitive");
            }
            write!(f, "  {} ({:?}, {})", a.path, a.attribute_type, flags.join(", "))?;
            if let Some(default) = &a.default {
                write!(f, " default={}", default)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_flags_and_default() {
        let schema = ResourceSchema::new("example", "desc")
            .required("name", AttributeType::String, "Name")
            .optional_computed("count", AttributeType::Int, "Count")
            .default_value(5)
            .optional("secret", AttributeType::String, "Secret")
            .sensitive();

        let count = schema.attribute("count").unwrap();
        assert!(count.flags.optional && count.flags.computed && !count.flags.required);
        assert_eq!(count.default.as_deref(), Some("5"));
        assert!(schema.attribute("secret").unwrap().flags.sensitive);
        assert!(schema.to_string().contains("count (Int, optional, computed) default=5"));
    }
}
