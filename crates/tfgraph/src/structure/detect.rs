//! Heuristics that read zone, subnet category and access point details from
//! raw resource declarations.

use std::sync::LazyLock;

use regex::Regex;

use tfgraph_core::resource::{RawResource, has_interpolation};

use super::{AccessPointKind, SubnetCategory};

/// Zone assigned to subnets whose zone cannot be determined.
pub const UNKNOWN_ZONE: &str = "unknown";

const PUBLIC_KEYWORDS: &[&str] = &["public", "pub", "external", "ext", "dmz", "bastion"];
const PRIVATE_KEYWORDS: &[&str] = &[
    "private",
    "priv",
    "internal",
    "int",
    "app",
    "compute",
    "worker",
    "backend",
    "application",
];
const DATABASE_KEYWORDS: &[&str] = &["database", "db", "rds", "data", "storage", "persistence"];

/// Keyword groups in the order they are tried.
const CATEGORY_KEYWORDS: &[(SubnetCategory, &[&str])] = &[
    (SubnetCategory::Public, PUBLIC_KEYWORDS),
    (SubnetCategory::Private, PRIVATE_KEYWORDS),
    (SubnetCategory::Database, DATABASE_KEYWORDS),
];

/// Zone suffix patterns, tried in order against lowercased names.
static ZONE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"[-_]([a-f])$",
        r"[-_](\d[a-f])$",
        r"zone[-_]?([a-f])$",
        r"(?:zone|az)[-_]?(\d)$",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("zone pattern is valid"))
    .collect()
});

/// `<prefix>.<prefix>.<region>.<service...>`; the region may be an
/// unresolved interpolation.
static SERVICE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w-]+\.[\w-]+\.(?:\$\{[^}]*\}|[\w-]+)\.([\w.-]+)$")
        .expect("service name pattern is valid")
});

/// Determines the zone of a subnet.
///
/// An explicit, fully resolved `availability_zone` attribute wins. Otherwise
/// the logical name and then the name tag are matched against the zone
/// suffix patterns. Anything else falls into [`UNKNOWN_ZONE`].
pub fn detect_zone(resource: &RawResource) -> String {
    if let Some(zone) = resource
        .string_attribute("availability_zone")
        .filter(|zone| !zone.is_empty() && !has_interpolation(zone))
    {
        return zone.to_string();
    }

    let candidates = std::iter::once(resource.name()).chain(resource.name_tag());
    for candidate in candidates {
        let lowered = candidate.to_lowercase();
        for pattern in ZONE_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(&lowered) {
                return caps[1].to_string();
            }
        }
    }

    UNKNOWN_ZONE.to_string()
}

/// Determines the category of a subnet.
///
/// An exact `Type` tag keyword wins. Otherwise keyword groups are tried in
/// public, private, database order as substrings of the logical name and
/// name tag. Subnets without any hint are private.
pub fn detect_category(resource: &RawResource) -> SubnetCategory {
    if let Some(tag) = resource.tag("Type").or_else(|| resource.tag("type")) {
        let tag = tag.to_lowercase();
        if let Some((category, _)) = CATEGORY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.contains(&tag.as_str()))
        {
            return *category;
        }
    }

    let haystacks: Vec<String> = std::iter::once(resource.name())
        .chain(resource.name_tag())
        .map(str::to_lowercase)
        .collect();

    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| {
            keywords
                .iter()
                .any(|keyword| haystacks.iter().any(|haystack| haystack.contains(keyword)))
        })
        .map(|(category, _)| *category)
        .unwrap_or(SubnetCategory::Private)
}

/// Reads the access point kind; anything not explicitly a gateway is an
/// interface.
pub fn detect_access_point_kind(resource: &RawResource) -> AccessPointKind {
    match resource.string_attribute("vpc_endpoint_type") {
        Some(kind) if kind.eq_ignore_ascii_case("gateway") => AccessPointKind::Gateway,
        _ => AccessPointKind::Interface,
    }
}

/// Extracts the target service of an access point from its service name,
/// falling back to the logical name.
pub fn detect_target_service(resource: &RawResource) -> String {
    resource
        .string_attribute("service_name")
        .and_then(|name| SERVICE_NAME.captures(name))
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| resource.name().to_string())
}

/// Short label of a zone: its trailing token, e.g. `1a` for `us-east-1a`.
pub fn zone_label(zone: &str) -> &str {
    zone.rsplit(['-', '_']).next().unwrap_or(zone)
}
