//! Raw resource declarations.
//!
//! A [`RawResource`] is one typed, named declaration as produced by the
//! upstream parser collaborator. The pipeline treats these records as
//! read-only input: nothing downstream mutates or re-derives them.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Marker that opens an unresolved interpolation inside a string value.
pub const INTERPOLATION_MARKER: &str = "${";

/// A single attribute value of a resource declaration.
///
/// Values mirror the loosely structured shapes that appear in declarative
/// infrastructure files: scalars, lists and nested blocks.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<AttributeValue>),
    Map(IndexMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Returns the string payload if this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the nested map if this value is a block.
    pub fn as_map(&self) -> Option<&IndexMap<String, AttributeValue>> {
        match self {
            AttributeValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

/// Where a resource was declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceLocation {
    #[serde(default)]
    file: String,
    #[serde(default)]
    line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Returns the file the resource was declared in.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Returns the 1-based line of the declaration, or 0 when unknown.
    pub fn line(&self) -> u32 {
        self.line
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One typed, named resource declaration.
///
/// # Examples
///
/// ```
/// use tfgraph_core::resource::RawResource;
///
/// let subnet = RawResource::new("aws_subnet", "private_a")
///     .with_attribute("availability_zone", "eu-west-1a");
///
/// assert_eq!(subnet.id(), "aws_subnet.private_a");
/// assert_eq!(subnet.string_attribute("availability_zone"), Some("eu-west-1a"));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawResource {
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    #[serde(default)]
    module: String,
    #[serde(default)]
    attributes: IndexMap<String, AttributeValue>,
    #[serde(default, flatten)]
    location: SourceLocation,
}

impl RawResource {
    /// Creates a resource with the given type tag and logical name.
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            module: String::new(),
            attributes: IndexMap::new(),
            location: SourceLocation::default(),
        }
    }

    /// Sets the module path the resource was declared in.
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    /// Adds or replaces an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Sets the source location.
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    /// Returns the resource type tag, e.g. `aws_subnet`.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Returns the logical name of the declaration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the module path, empty for the root module.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Returns the declaration's source location.
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Returns all attributes in declaration order.
    pub fn attributes(&self) -> &IndexMap<String, AttributeValue> {
        &self.attributes
    }

    /// Returns a single attribute.
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Returns an attribute only when it holds a string.
    pub fn string_attribute(&self, key: &str) -> Option<&str> {
        self.attribute(key).and_then(AttributeValue::as_str)
    }

    /// Returns a tag value from the `tags` block.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.attribute("tags")
            .and_then(AttributeValue::as_map)
            .and_then(|tags| tags.get(key))
            .and_then(AttributeValue::as_str)
    }

    /// Returns the human-authored name of the resource.
    ///
    /// The `Name` tag takes precedence over the `name` attribute.
    pub fn name_tag(&self) -> Option<&str> {
        self.tag("Name").or_else(|| self.string_attribute("name"))
    }

    /// Returns the unique address of the resource: `[module.]type.name`.
    pub fn id(&self) -> String {
        if self.module.is_empty() {
            format!("{}.{}", self.resource_type, self.name)
        } else {
            format!("{}.{}.{}", self.module, self.resource_type, self.name)
        }
    }
}

/// Returns `true` when `value` still contains an unresolved interpolation.
pub fn has_interpolation(value: &str) -> bool {
    value.contains(INTERPOLATION_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(name: &str) -> AttributeValue {
        let mut tags = IndexMap::new();
        tags.insert("Name".to_string(), AttributeValue::from(name));
        AttributeValue::Map(tags)
    }

    #[test]
    fn test_id_without_module() {
        let resource = RawResource::new("aws_vpc", "main");
        assert_eq!(resource.id(), "aws_vpc.main");
    }

    #[test]
    fn test_id_with_module() {
        let resource = RawResource::new("aws_vpc", "main").with_module("module.network");
        assert_eq!(resource.id(), "module.network.aws_vpc.main");
    }

    #[test]
    fn test_string_attribute_ignores_non_strings() {
        let resource = RawResource::new("aws_subnet", "a")
            .with_attribute("availability_zone", AttributeValue::Integer(3));

        assert!(resource.attribute("availability_zone").is_some());
        assert_eq!(resource.string_attribute("availability_zone"), None);
    }

    #[test]
    fn test_name_tag_prefers_tag_block() {
        let resource = RawResource::new("aws_subnet", "a")
            .with_attribute("name", "from-attribute")
            .with_attribute("tags", tagged("from-tag"));

        assert_eq!(resource.name_tag(), Some("from-tag"));
    }

    #[test]
    fn test_name_tag_falls_back_to_name_attribute() {
        let resource = RawResource::new("aws_subnet", "a").with_attribute("name", "app-subnet");
        assert_eq!(resource.name_tag(), Some("app-subnet"));

        let bare = RawResource::new("aws_subnet", "a");
        assert_eq!(bare.name_tag(), None);
    }

    #[test]
    fn test_has_interpolation() {
        assert!(has_interpolation("${var.region}a"));
        assert!(!has_interpolation("eu-west-1a"));
    }

    #[test]
    fn test_deserialize_from_toml() {
        let source = r#"
            type = "aws_subnet"
            name = "public_a"
            file = "network.tf"
            line = 12

            [attributes]
            cidr_block = "10.0.1.0/24"
            map_public_ip_on_launch = true
            tags = { Name = "public-a" }
        "#;

        let resource: RawResource = toml::from_str(source).expect("valid resource");

        assert_eq!(resource.id(), "aws_subnet.public_a");
        assert_eq!(resource.location().line(), 12);
        assert_eq!(resource.string_attribute("cidr_block"), Some("10.0.1.0/24"));
        assert_eq!(
            resource.attribute("map_public_ip_on_launch"),
            Some(&AttributeValue::Bool(true))
        );
        assert_eq!(resource.name_tag(), Some("public-a"));
    }
}
