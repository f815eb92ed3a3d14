//! Tool descriptors and their JSON-Schema shaped input schemas.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// JSON-Schema primitive type of a single tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    /// `"string"`
    String,
    /// `"integer"`
    Integer,
    /// `"number"`
    Number,
    /// `"boolean"`
    Boolean,
    /// `"object"`
    Object,
    /// `"array"`
    Array,
}

/// Description of one parameter in an [`InputSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDescriptor {
    /// Parameter type.
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    /// Human-readable description shown to clients.
    pub description: String,
}

/// Ordered parameter mapping plus the set of required names.
///
/// A parameter is marked required at the moment it is added, so every
/// entry of `required` is always a key of the property mapping. Adding a
/// name twice replaces its descriptor in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSchema {
    properties: Vec<(String, PropertyDescriptor)>,
    required: Vec<String>,
}

impl InputSchema {
    /// Schema with no parameters.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a required parameter.
    #[must_use]
    pub fn required(self, name: &str, kind: PropertyKind, description: &str) -> Self {
        self.with_property(name, kind, description, true)
    }

    /// Add an optional parameter.
    #[must_use]
    pub fn optional(self, name: &str, kind: PropertyKind, description: &str) -> Self {
        self.with_property(name, kind, description, false)
    }

    fn with_property(
        mut self,
        name: &str,
        kind: PropertyKind,
        description: &str,
        required: bool,
    ) -> Self {
        let descriptor = PropertyDescriptor {
            kind,
            description: description.to_owned(),
        };

        match self.properties.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = descriptor,
            None => self.properties.push((name.to_owned(), descriptor)),
        }

        let already_required = self.required.iter().any(|key| key == name);
        if required && !already_required {
            self.required.push(name.to_owned());
        } else if !required && already_required {
            self.required.retain(|key| key != name);
        }

        self
    }

    /// Parameter descriptors in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyDescriptor)> {
        self.properties
            .iter()
            .map(|(name, descriptor)| (name.as_str(), descriptor))
    }

    /// Names of required parameters in declaration order.
    #[must_use]
    pub fn required_names(&self) -> &[String] {
        &self.required
    }

    /// Render as a JSON-Schema object value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({ "type": "object", "properties": {}, "required": [] })
        })
    }
}

/// Borrowed view that serializes the ordered property list as a JSON object.
struct OrderedProperties<'a>(&'a [(String, PropertyDescriptor)]);

impl Serialize for OrderedProperties<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, descriptor) in self.0 {
            map.serialize_entry(name, descriptor)?;
        }
        map.end()
    }
}

impl Serialize for InputSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("type", "object")?;
        map.serialize_entry("properties", &OrderedProperties(&self.properties))?;
        map.serialize_entry("required", &self.required)?;
        map.end()
    }
}

/// Name, description and input schema of a registered tool.
///
/// Identity is the name; a descriptor is never mutated after registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    /// Unique tool name.
    pub name: String,
    /// Human-readable summary.
    pub description: String,
    /// Accepted arguments.
    #[serde(rename = "inputSchema")]
    pub input_schema: InputSchema,
}

impl ToolDescriptor {
    /// Create a descriptor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: InputSchema,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}
