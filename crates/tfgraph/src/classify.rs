//! Classification of raw resources into logical services.
//!
//! The [`Classifier`] walks an ordered rule table. Each rule names a service
//! key and the resource types it claims, either as primary members (the ones
//! that make a service appear on the diagram) or as secondary members
//! (supporting resources that are folded into an existing service). The
//! first rule that claims a resource type wins.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, trace, warn};
use regex::Regex;
use serde::Serialize;

use tfgraph_core::{
    identifier::Id,
    resource::{AttributeValue, RawResource},
};

use crate::{
    config::{ConfigError, NamingConfig, NetworkConfig, RuleConfig, ServiceCategory},
    naming::{self, NameResolver},
};

/// How deep nested attribute blocks are searched for subnet references.
const MAX_REFERENCE_DEPTH: usize = 5;

/// Role of a resource inside its logical service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Primary,
    Secondary,
}

/// A resource that belongs to a logical service.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceMember {
    id: Id,
    resource_type: String,
    role: MemberRole,
}

impl ServiceMember {
    /// Returns the member's resource address.
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Returns the member's resource type.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Returns whether the member is primary or secondary.
    pub fn role(&self) -> MemberRole {
        self.role
    }
}

/// One architectural unit on the diagram, e.g. "ECS" or "S3".
#[derive(Debug, Clone, Serialize)]
pub struct LogicalService {
    id: Id,
    display_name: String,
    category: ServiceCategory,
    in_container: bool,
    members: Vec<ServiceMember>,
    subnet_refs: Vec<Id>,
}

impl LogicalService {
    /// Returns the service identity, which equals its rule key.
    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn category(&self) -> ServiceCategory {
        self.category
    }

    /// Returns whether the service is drawn inside the network container.
    pub fn in_container(&self) -> bool {
        self.in_container
    }

    /// Returns all members in input order.
    pub fn members(&self) -> &[ServiceMember] {
        &self.members
    }

    /// Returns the primary members in input order.
    pub fn primary_members(&self) -> impl Iterator<Item = &ServiceMember> {
        self.members
            .iter()
            .filter(|member| member.role == MemberRole::Primary)
    }

    /// Returns the subnets referenced by the service's members, in first-seen
    /// order.
    pub fn subnet_refs(&self) -> &[Id] {
        &self.subnet_refs
    }

    /// Number of members of the service.
    pub fn count(&self) -> usize {
        self.members.len()
    }
}

/// A resource whose type was claimed by more than one rule.
///
/// The first rule always wins; this record lets callers surface the
/// overlap in their rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ambiguity {
    resource: Id,
    claimed_by: String,
    also_matched: Vec<String>,
}

impl Ambiguity {
    pub fn resource(&self) -> &Id {
        &self.resource
    }

    /// Key of the rule that won.
    pub fn claimed_by(&self) -> &str {
        &self.claimed_by
    }

    /// Keys of later rules that also matched.
    pub fn also_matched(&self) -> &[String] {
        &self.also_matched
    }
}

/// Result of a classification pass.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    services: Vec<LogicalService>,
    ambiguities: Vec<Ambiguity>,
    unmatched: usize,
}

impl Classification {
    /// Returns services ordered by category, then by first-seen input order.
    pub fn services(&self) -> &[LogicalService] {
        &self.services
    }

    pub fn ambiguities(&self) -> &[Ambiguity] {
        &self.ambiguities
    }

    /// Number of resources that matched no rule.
    pub fn unmatched(&self) -> usize {
        self.unmatched
    }

    /// Splits the result into its parts.
    pub fn into_parts(self) -> (Vec<LogicalService>, Vec<Ambiguity>) {
        (self.services, self.ambiguities)
    }
}

/// A validated classification rule.
#[derive(Debug)]
struct Rule {
    key: String,
    primary: HashSet<String>,
    secondary: HashSet<String>,
    category: ServiceCategory,
    in_container: bool,
}

impl Rule {
    fn matches(&self, resource_type: &str) -> Option<MemberRole> {
        if self.primary.contains(resource_type) {
            Some(MemberRole::Primary)
        } else if self.secondary.contains(resource_type) {
            Some(MemberRole::Secondary)
        } else {
            None
        }
    }
}

/// Services under construction, keyed by rule key in first-seen order.
#[derive(Debug)]
struct ServiceDraft<'a> {
    rule: &'a Rule,
    members: Vec<&'a RawResource>,
    roles: Vec<MemberRole>,
}

/// Groups raw resources into logical services.
///
/// The classifier is immutable after construction and can be shared between
/// threads.
#[derive(Debug)]
pub struct Classifier {
    rules: Vec<Rule>,
    subnet_reference: Regex,
    subnet_type: String,
    naming: NamingConfig,
}

impl Classifier {
    /// Validates the rule table and builds a classifier.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a rule is missing its key or category,
    /// has no primary types, repeats an earlier key, or claims a network
    /// structure type.
    pub fn new(
        rules: &[RuleConfig],
        network: &NetworkConfig,
        naming: NamingConfig,
    ) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        let mut validated = Vec::with_capacity(rules.len());

        for (index, rule) in rules.iter().enumerate() {
            let key = rule
                .key()
                .filter(|key| !key.is_empty())
                .ok_or(ConfigError::MissingField { index, field: "key" })?;
            let category = rule
                .category()
                .ok_or(ConfigError::MissingField { index, field: "category" })?;

            if rule.primary().is_empty() {
                return Err(ConfigError::EmptyPrimary { key: key.to_string() });
            }
            if !seen.insert(key) {
                return Err(ConfigError::DuplicateRule { key: key.to_string() });
            }
            if let Some(reserved) = rule
                .primary()
                .iter()
                .chain(rule.secondary())
                .find(|resource_type| network.is_reserved(resource_type))
            {
                return Err(ConfigError::ReservedType {
                    key: key.to_string(),
                    resource_type: reserved.clone(),
                });
            }

            validated.push(Rule {
                key: key.to_string(),
                primary: rule.primary().iter().cloned().collect(),
                secondary: rule.secondary().iter().cloned().collect(),
                category,
                in_container: rule.in_container(),
            });
        }

        let pattern = format!(r"(?:^|[^\w.]){}\.(\w+)", regex::escape(network.subnet_type()));
        let subnet_reference = Regex::new(&pattern)
            .map_err(|err| ConfigError::Parse(format!("invalid subnet type: {err}")))?;

        debug!(rules = validated.len(); "Classifier ready");

        Ok(Self {
            rules: validated,
            subnet_reference,
            subnet_type: network.subnet_type().to_string(),
            naming,
        })
    }

    /// Groups `resources` into logical services.
    ///
    /// Resources that match no rule are skipped. Services that end up with no
    /// primary member are not emitted. Output is deterministic for a given
    /// input order.
    pub fn classify(
        &self,
        resources: &[RawResource],
        resolver: Option<&dyn NameResolver>,
    ) -> Classification {
        let mut drafts: IndexMap<&str, ServiceDraft> = IndexMap::new();
        let mut ambiguities = Vec::new();
        let mut unmatched = 0;

        for resource in resources {
            let mut matches = self
                .rules
                .iter()
                .filter_map(|rule| rule.matches(resource.resource_type()).map(|role| (rule, role)));

            let Some((rule, role)) = matches.next() else {
                trace!(resource = resource.id(); "No rule matched");
                unmatched += 1;
                continue;
            };

            let also_matched: Vec<String> = matches.map(|(other, _)| other.key.clone()).collect();
            if !also_matched.is_empty() {
                warn!(
                    resource = resource.id(),
                    claimed_by = rule.key.as_str();
                    "Resource type claimed by several rules, first rule wins"
                );
                ambiguities.push(Ambiguity {
                    resource: Id::from(resource.id()),
                    claimed_by: rule.key.clone(),
                    also_matched,
                });
            }

            let draft = drafts.entry(rule.key.as_str()).or_insert_with(|| ServiceDraft {
                rule,
                members: Vec::new(),
                roles: Vec::new(),
            });
            draft.members.push(resource);
            draft.roles.push(role);
        }

        let mut services: Vec<LogicalService> = drafts
            .into_values()
            .filter_map(|draft| self.finish(draft, resolver))
            .collect();
        // Stable sort keeps first-seen order within a category.
        services.sort_by_key(LogicalService::category);

        debug!(
            services = services.len(),
            ambiguities = ambiguities.len(),
            unmatched = unmatched;
            "Classification complete"
        );

        Classification {
            services,
            ambiguities,
            unmatched,
        }
    }

    fn finish(&self, draft: ServiceDraft, resolver: Option<&dyn NameResolver>) -> Option<LogicalService> {
        let ServiceDraft { rule, members, roles } = draft;

        let Some(first_primary) = members
            .iter()
            .zip(&roles)
            .find_map(|(member, role)| (*role == MemberRole::Primary).then_some(*member))
        else {
            debug!(service = rule.key.as_str(); "Dropping service without primary members");
            return None;
        };

        let display_name = naming::service_name(first_primary, resolver, self.naming.max_length);

        let mut subnet_refs: Vec<Id> = Vec::new();
        for member in &members {
            for id in self.subnet_refs(member) {
                if !subnet_refs.contains(&id) {
                    subnet_refs.push(id);
                }
            }
        }

        let members = members
            .into_iter()
            .zip(roles)
            .map(|(resource, role)| ServiceMember {
                id: Id::from(resource.id()),
                resource_type: resource.resource_type().to_string(),
                role,
            })
            .collect();

        Some(LogicalService {
            id: Id::new(&rule.key),
            display_name,
            category: rule.category,
            in_container: rule.in_container,
            members,
            subnet_refs,
        })
    }

    /// Subnet addresses referenced anywhere in a resource's attributes.
    fn subnet_refs(&self, resource: &RawResource) -> Vec<Id> {
        let mut found = Vec::new();
        for value in resource.attributes().values() {
            self.collect_refs(value, 0, &mut found);
        }
        found
    }

    fn collect_refs(&self, value: &AttributeValue, depth: usize, found: &mut Vec<Id>) {
        if depth > MAX_REFERENCE_DEPTH {
            return;
        }
        match value {
            AttributeValue::String(text) => {
                for caps in self.subnet_reference.captures_iter(text) {
                    found.push(Id::from(format!("{}.{}", self.subnet_type, &caps[1])));
                }
            }
            AttributeValue::List(items) => {
                for item in items {
                    self.collect_refs(item, depth + 1, found);
                }
            }
            AttributeValue::Map(map) => {
                for item in map.values() {
                    self.collect_refs(item, depth + 1, found);
                }
            }
            AttributeValue::Bool(_) | AttributeValue::Integer(_) | AttributeValue::Float(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(key: &str, primary: &[&str], secondary: &[&str], category: ServiceCategory) -> RuleConfig {
        RuleConfig::new(key, primary, secondary, category, false)
    }

    fn classifier(rules: &[RuleConfig]) -> Classifier {
        Classifier::new(rules, &NetworkConfig::default(), NamingConfig::default())
            .expect("valid rules")
    }

    #[test]
    fn test_primary_and_secondary_merge_into_one_service() {
        let classifier = classifier(&[rule(
            "s3",
            &["aws_s3_bucket"],
            &["aws_s3_bucket_policy"],
            ServiceCategory::Data,
        )]);
        let resources = vec![
            RawResource::new("aws_s3_bucket_policy", "assets"),
            RawResource::new("aws_s3_bucket", "assets"),
        ];

        let result = classifier.classify(&resources, None);

        assert_eq!(result.services().len(), 1);
        let service = &result.services()[0];
        assert_eq!(service.id(), &Id::new("s3"));
        assert_eq!(service.count(), 2);
        assert_eq!(service.members()[0].role(), MemberRole::Secondary);
        assert_eq!(service.primary_members().count(), 1);
        assert_eq!(service.display_name(), "Assets");
    }

    #[test]
    fn test_secondary_only_service_is_dropped() {
        let classifier = classifier(&[rule(
            "s3",
            &["aws_s3_bucket"],
            &["aws_s3_bucket_policy"],
            ServiceCategory::Data,
        )]);
        let resources = vec![RawResource::new("aws_s3_bucket_policy", "orphan")];

        let result = classifier.classify(&resources, None);

        assert!(result.services().is_empty());
        assert_eq!(result.unmatched(), 0);
    }

    #[test]
    fn test_first_rule_wins_and_ambiguity_is_recorded() {
        let classifier = classifier(&[
            rule("a", &["aws_thing"], &[], ServiceCategory::Compute),
            rule("b", &["aws_other"], &["aws_thing"], ServiceCategory::Compute),
        ]);
        let resources = vec![
            RawResource::new("aws_thing", "x"),
            RawResource::new("aws_other", "y"),
        ];

        let result = classifier.classify(&resources, None);

        let keys: Vec<_> = result.services().iter().map(|s| s.id().as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(result.services()[1].count(), 1);

        assert_eq!(result.ambiguities().len(), 1);
        let ambiguity = &result.ambiguities()[0];
        assert_eq!(ambiguity.resource(), &Id::new("aws_thing.x"));
        assert_eq!(ambiguity.claimed_by(), "a");
        assert_eq!(ambiguity.also_matched(), ["b".to_string()]);
    }

    #[test]
    fn test_services_sorted_by_category_then_first_seen() {
        let classifier = classifier(&[
            rule("queue", &["aws_sqs_queue"], &[], ServiceCategory::Messaging),
            rule("bucket", &["aws_s3_bucket"], &[], ServiceCategory::Data),
            rule("table", &["aws_dynamodb_table"], &[], ServiceCategory::Data),
            rule("cdn", &["aws_cloudfront_distribution"], &[], ServiceCategory::Edge),
        ]);
        let resources = vec![
            RawResource::new("aws_sqs_queue", "q"),
            RawResource::new("aws_dynamodb_table", "t"),
            RawResource::new("aws_s3_bucket", "b"),
            RawResource::new("aws_cloudfront_distribution", "c"),
        ];

        let result = classifier.classify(&resources, None);

        let keys: Vec<_> = result.services().iter().map(|s| s.id().as_str()).collect();
        assert_eq!(keys, vec!["cdn", "table", "bucket", "queue"]);
    }

    #[test]
    fn test_unmatched_resources_are_counted() {
        let classifier = classifier(&[rule("s3", &["aws_s3_bucket"], &[], ServiceCategory::Data)]);
        let resources = vec![
            RawResource::new("random_password", "db"),
            RawResource::new("aws_vpc", "main"),
        ];

        let result = classifier.classify(&resources, None);

        assert!(result.services().is_empty());
        assert_eq!(result.unmatched(), 2);
    }

    #[test]
    fn test_subnet_references_are_collected() {
        let classifier = classifier(&[rule("ecs", &["aws_ecs_service"], &[], ServiceCategory::Compute)]);
        let mut network = IndexMap::new();
        network.insert(
            "subnets".to_string(),
            AttributeValue::List(vec![
                AttributeValue::from("${aws_subnet.private_a.id}"),
                AttributeValue::from("${aws_subnet.private_b.id}"),
                AttributeValue::from("${aws_subnet.private_a.id}"),
            ]),
        );
        let service = RawResource::new("aws_ecs_service", "api")
            .with_attribute("network_configuration", AttributeValue::Map(network));

        let result = classifier.classify(&[service], None);

        assert_eq!(
            result.services()[0].subnet_refs(),
            [Id::new("aws_subnet.private_a"), Id::new("aws_subnet.private_b")]
        );
    }

    #[test]
    fn test_subnet_group_is_not_a_subnet_reference() {
        let classifier = classifier(&[rule("rds", &["aws_db_instance"], &[], ServiceCategory::Data)]);
        let db = RawResource::new("aws_db_instance", "main")
            .with_attribute("db_subnet_group_name", "${aws_db_subnet_group.main.name}");

        let result = classifier.classify(&[db], None);

        assert!(result.services()[0].subnet_refs().is_empty());
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let rules = vec![RuleConfig::default()];
        let err = Classifier::new(&rules, &NetworkConfig::default(), NamingConfig::default())
            .expect_err("missing key");
        assert_eq!(err, ConfigError::MissingField { index: 0, field: "key" });
    }

    #[test]
    fn test_empty_primary_is_rejected() {
        let rules = vec![rule("x", &[], &["aws_thing"], ServiceCategory::Other)];
        let err = Classifier::new(&rules, &NetworkConfig::default(), NamingConfig::default())
            .expect_err("empty primary");
        assert_eq!(err, ConfigError::EmptyPrimary { key: "x".to_string() });
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let rules = vec![
            rule("x", &["aws_a"], &[], ServiceCategory::Other),
            rule("x", &["aws_b"], &[], ServiceCategory::Other),
        ];
        let err = Classifier::new(&rules, &NetworkConfig::default(), NamingConfig::default())
            .expect_err("duplicate key");
        assert_eq!(err, ConfigError::DuplicateRule { key: "x".to_string() });
    }

    #[test]
    fn test_network_types_are_reserved() {
        let rules = vec![rule("net", &["aws_vpc"], &[], ServiceCategory::Other)];
        let err = Classifier::new(&rules, &NetworkConfig::default(), NamingConfig::default())
            .expect_err("reserved type");
        assert_eq!(
            err,
            ConfigError::ReservedType {
                key: "net".to_string(),
                resource_type: "aws_vpc".to_string(),
            }
        );
    }
}
