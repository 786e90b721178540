//! Connection inference between logical services.
//!
//! Connections come from a static relationship table. An entry becomes a
//! [`LogicalConnection`] only when both of its endpoints were emitted by the
//! classifier.

use std::collections::HashSet;

use log::debug;
use serde::Serialize;

use tfgraph_core::identifier::Id;

use crate::{
    classify::LogicalService,
    config::{ConfigError, ConnectionKind, RelationshipConfig},
};

/// A directed, labelled edge between two logical services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogicalConnection {
    source: Id,
    target: Id,
    label: String,
    kind: ConnectionKind,
}

impl LogicalConnection {
    pub fn new(source: Id, target: Id, label: impl Into<String>, kind: ConnectionKind) -> Self {
        Self {
            source,
            target,
            label: label.into(),
            kind,
        }
    }

    pub fn source(&self) -> &Id {
        &self.source
    }

    pub fn target(&self) -> &Id {
        &self.target
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> ConnectionKind {
        self.kind
    }
}

/// Derives connections from the relationship table.
#[derive(Debug)]
pub struct ConnectionInferencer {
    relationships: Vec<RelationshipConfig>,
}

impl ConnectionInferencer {
    /// Validates the relationship table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRelationship`] if an entry has an empty
    /// source or target.
    pub fn new(relationships: &[RelationshipConfig]) -> Result<Self, ConfigError> {
        for (index, relationship) in relationships.iter().enumerate() {
            if relationship.source().is_empty() {
                return Err(ConfigError::InvalidRelationship { index, field: "source" });
            }
            if relationship.target().is_empty() {
                return Err(ConfigError::InvalidRelationship { index, field: "target" });
            }
        }

        Ok(Self {
            relationships: relationships.to_vec(),
        })
    }

    /// Returns the connections whose endpoints are both present in
    /// `services`, in table order and without duplicates.
    pub fn infer(&self, services: &[LogicalService]) -> Vec<LogicalConnection> {
        let present: HashSet<&str> = services.iter().map(|service| service.id().as_str()).collect();
        let mut seen = HashSet::new();

        let connections: Vec<LogicalConnection> = self
            .relationships
            .iter()
            .filter(|rel| present.contains(rel.source()) && present.contains(rel.target()))
            .filter(|rel| seen.insert((rel.source(), rel.target(), rel.label())))
            .map(|rel| {
                LogicalConnection::new(
                    Id::new(rel.source()),
                    Id::new(rel.target()),
                    rel.label(),
                    rel.kind(),
                )
            })
            .collect();

        debug!(
            candidates = self.relationships.len(),
            connections = connections.len();
            "Connections inferred"
        );

        connections
    }
}

#[cfg(test)]
mod tests {
    use tfgraph_core::resource::RawResource;

    use super::*;
    use crate::{
        classify::Classifier,
        config::{NamingConfig, NetworkConfig, RuleConfig, ServiceCategory},
    };

    fn services(types: &[(&str, &str)]) -> Vec<LogicalService> {
        let rules: Vec<_> = types
            .iter()
            .map(|(key, resource_type)| {
                RuleConfig::new(*key, &[*resource_type], &[], ServiceCategory::Other, false)
            })
            .collect();
        let resources: Vec<_> = types
            .iter()
            .map(|(key, resource_type)| RawResource::new(*resource_type, *key))
            .collect();
        Classifier::new(&rules, &NetworkConfig::default(), NamingConfig::default())
            .expect("valid rules")
            .classify(&resources, None)
            .into_parts()
            .0
    }

    #[test]
    fn test_only_present_endpoints_survive() {
        let inferencer = ConnectionInferencer::new(&[
            RelationshipConfig::new("alb", "ecs", "Routes", ConnectionKind::DataFlow),
            RelationshipConfig::new("ecs", "rds", "Queries", ConnectionKind::DataFlow),
        ])
        .expect("valid table");
        let services = services(&[("alb", "aws_lb"), ("ecs", "aws_ecs_service")]);

        let connections = inferencer.infer(&services);

        assert_eq!(
            connections,
            vec![LogicalConnection::new(
                Id::new("alb"),
                Id::new("ecs"),
                "Routes",
                ConnectionKind::DataFlow
            )]
        );
    }

    #[test]
    fn test_duplicates_are_removed_in_table_order() {
        let inferencer = ConnectionInferencer::new(&[
            RelationshipConfig::new("a", "b", "x", ConnectionKind::Default),
            RelationshipConfig::new("b", "a", "y", ConnectionKind::Trigger),
            RelationshipConfig::new("a", "b", "x", ConnectionKind::Encrypt),
            RelationshipConfig::new("a", "b", "z", ConnectionKind::Default),
        ])
        .expect("valid table");
        let services = services(&[("a", "aws_a"), ("b", "aws_b")]);

        let connections = inferencer.infer(&services);

        let labels: Vec<_> = connections.iter().map(LogicalConnection::label).collect();
        assert_eq!(labels, vec!["x", "y", "z"]);
        assert_eq!(connections[0].kind(), ConnectionKind::Default);
    }

    #[test]
    fn test_no_services_no_connections() {
        let inferencer = ConnectionInferencer::new(&[RelationshipConfig::new(
            "a",
            "b",
            "x",
            ConnectionKind::Default,
        )])
        .expect("valid table");

        assert!(inferencer.infer(&[]).is_empty());
    }

    #[test]
    fn test_empty_endpoint_is_rejected() {
        let err = ConnectionInferencer::new(&[RelationshipConfig::new("a", "", "x", ConnectionKind::Default)])
            .expect_err("empty target");
        assert_eq!(err, ConfigError::InvalidRelationship { index: 0, field: "target" });
    }
}
