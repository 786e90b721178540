//! Display names for diagram elements.
//!
//! Name resolution is delegated to a [`NameResolver`] supplied by the caller;
//! this module only provides the resolver seam, a map-backed resolver for
//! variable and local interpolations, and the shared truncation rule.

use std::{collections::HashMap, sync::LazyLock};

use regex::{Captures, Regex};

use tfgraph_core::resource::{RawResource, has_interpolation};

/// Marker appended to truncated names.
pub const ELLIPSIS: &str = "...";

static INTERPOLATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{(var|local)\.(\w+)\}").expect("interpolation pattern is valid")
});

/// Resolves raw names that may contain interpolation expressions.
///
/// Resolution is best effort: implementations return the input unchanged
/// when nothing can be substituted.
pub trait NameResolver {
    fn resolve(&self, raw: &str) -> String;
}

impl<F> NameResolver for F
where
    F: Fn(&str) -> String,
{
    fn resolve(&self, raw: &str) -> String {
        self(raw)
    }
}

/// A [`NameResolver`] that substitutes `${var.NAME}` and `${local.NAME}`
/// from in-memory tables.
///
/// # Examples
///
/// ```
/// use tfgraph::naming::{NameResolver, VariableResolver};
///
/// let resolver = VariableResolver::default()
///     .with_variable("env", "prod")
///     .with_local("app", "shop");
///
/// assert_eq!(resolver.resolve("${local.app}-${var.env}-vpc"), "shop-prod-vpc");
/// assert_eq!(resolver.resolve("${var.missing}"), "${var.missing}");
/// ```
#[derive(Debug, Clone, Default)]
pub struct VariableResolver {
    variables: HashMap<String, String>,
    locals: HashMap<String, String>,
}

impl VariableResolver {
    /// Creates a resolver from variable and local tables.
    pub fn new(variables: HashMap<String, String>, locals: HashMap<String, String>) -> Self {
        Self { variables, locals }
    }

    /// Adds a variable value.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Adds a local value.
    pub fn with_local(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.locals.insert(name.into(), value.into());
        self
    }
}

impl NameResolver for VariableResolver {
    fn resolve(&self, raw: &str) -> String {
        if !has_interpolation(raw) {
            return raw.to_string();
        }

        INTERPOLATION
            .replace_all(raw, |caps: &Captures| {
                let table = match &caps[1] {
                    "var" => &self.variables,
                    _ => &self.locals,
                };
                table
                    .get(&caps[2])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

/// Truncates `name` to `max_length` characters followed by [`ELLIPSIS`].
///
/// Names of at most `max_length` characters are returned unchanged, so the
/// result never exceeds `max_length + 3` characters. Lengths are counted in
/// characters, never bytes.
///
/// # Examples
///
/// ```
/// use tfgraph::naming::truncate;
///
/// assert_eq!(truncate("short", 25), "short");
/// assert_eq!(truncate(&"a".repeat(30), 25), format!("{}...", "a".repeat(25)));
/// assert_eq!(truncate("abcdef", 0), "...");
/// ```
pub fn truncate(name: &str, max_length: usize) -> String {
    if name.chars().count() <= max_length {
        return name.to_string();
    }
    let mut truncated: String = name.chars().take(max_length).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Turns an identifier-style name into a title: `api_server` becomes
/// `Api Server`.
pub fn humanize(name: &str) -> String {
    name.split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display name of a network element (container, subnet or access point).
///
/// With a resolver, the human-authored name is resolved when present,
/// falling back to the logical name. Without one, the logical name is used
/// unmodified.
pub(crate) fn element_name(
    resource: &RawResource,
    resolver: Option<&dyn NameResolver>,
    max_length: usize,
) -> String {
    let raw = match resolver {
        Some(resolver) => resolver.resolve(resource.name_tag().unwrap_or(resource.name())),
        None => resource.name().to_string(),
    };
    truncate(&raw, max_length)
}

/// Display name of a logical service taken from its first primary member.
///
/// A `name` attribute free of interpolation wins; otherwise the logical name
/// is resolved and humanized.
pub(crate) fn service_name(
    resource: &RawResource,
    resolver: Option<&dyn NameResolver>,
    max_length: usize,
) -> String {
    let raw = match resource.string_attribute("name") {
        Some(name) if !has_interpolation(name) => name.to_string(),
        _ => {
            let name = resolver
                .map(|resolver| resolver.resolve(resource.name()))
                .unwrap_or_else(|| resource.name().to_string());
            humanize(&name)
        }
    };
    truncate(&raw, max_length)
}
