//! Configuration types for the tfgraph pipeline.
//!
//! This module provides the configuration structures that drive
//! classification, connection inference, network detection and layout. All
//! types implement [`serde::Deserialize`] for loading from TOML; every
//! section falls back to built-in defaults when omitted.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration root.
//! - [`RuleConfig`] - One entry of the ordered classification rule table.
//! - [`RelationshipConfig`] - One entry of the relationship table.
//! - [`NetworkConfig`] - Resource types that make up the network structure.
//! - [`LayoutConfig`] - Dimensions used by the layout engine.
//! - [`NamingConfig`] - Display name settings.
//!
//! # Example
//!
//! ```
//! # use tfgraph::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(!config.rules().is_empty());
//! assert_eq!(config.network().container_type(), "aws_vpc");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors. These are the only fatal errors of the pipeline and
/// are raised before any resource is processed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rule #{index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("rule `{key}` lists no primary resource types")]
    EmptyPrimary { key: String },

    #[error("rule `{key}` is defined more than once")]
    DuplicateRule { key: String },

    #[error("rule `{key}` claims `{resource_type}`, which belongs to the network structure")]
    ReservedType { key: String, resource_type: String },

    #[error("relationship #{index} is missing required field `{field}`")]
    InvalidRelationship { index: usize, field: &'static str },

    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

/// Architectural category of a logical service.
///
/// The declaration order is the output order of classified services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
    Edge,
    Compute,
    Data,
    Messaging,
    Security,
    Monitoring,
    Other,
}

/// Kind of a relationship between two logical services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionKind {
    #[serde(alias = "data_flow")]
    DataFlow,
    Trigger,
    Encrypt,
    #[default]
    Default,
}

/// One entry of the ordered classification rule table.
///
/// Required fields are optional at the serde level so that a malformed rule
/// is reported with its position instead of a generic parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleConfig {
    key: Option<String>,
    #[serde(default)]
    primary: Vec<String>,
    #[serde(default)]
    secondary: Vec<String>,
    category: Option<ServiceCategory>,
    #[serde(default)]
    in_container: bool,
}

impl RuleConfig {
    /// Creates a complete rule.
    pub fn new(
        key: impl Into<String>,
        primary: &[&str],
        secondary: &[&str],
        category: ServiceCategory,
        in_container: bool,
    ) -> Self {
        Self {
            key: Some(key.into()),
            primary: primary.iter().map(|t| t.to_string()).collect(),
            secondary: secondary.iter().map(|t| t.to_string()).collect(),
            category: Some(category),
            in_container,
        }
    }

    /// Returns the service key, if set.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns the primary resource types.
    pub fn primary(&self) -> &[String] {
        &self.primary
    }

    /// Returns the secondary resource types.
    pub fn secondary(&self) -> &[String] {
        &self.secondary
    }

    /// Returns the service category, if set.
    pub fn category(&self) -> Option<ServiceCategory> {
        self.category
    }

    /// Returns whether the service lives inside the network container.
    pub fn in_container(&self) -> bool {
        self.in_container
    }
}

/// One entry of the relationship table.
#[derive(Debug, Clone, Deserialize)]
pub struct RelationshipConfig {
    #[serde(default)]
    source: String,
    #[serde(default)]
    target: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    kind: ConnectionKind,
}

impl RelationshipConfig {
    pub fn new(source: &str, target: &str, label: &str, kind: ConnectionKind) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            label: label.to_string(),
            kind,
        }
    }

    /// Returns the source service key.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the target service key.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the relationship label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the relationship kind.
    pub fn kind(&self) -> ConnectionKind {
        self.kind
    }
}

/// Resource types that form the network structure.
///
/// These types are handled exclusively by the structure builder and may not
/// appear in the classification rule table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    container_type: String,
    subnet_type: String,
    access_point_type: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            container_type: "aws_vpc".to_string(),
            subnet_type: "aws_subnet".to_string(),
            access_point_type: "aws_vpc_endpoint".to_string(),
        }
    }
}

impl NetworkConfig {
    pub fn new(container_type: &str, subnet_type: &str, access_point_type: &str) -> Self {
        Self {
            container_type: container_type.to_string(),
            subnet_type: subnet_type.to_string(),
            access_point_type: access_point_type.to_string(),
        }
    }

    /// Returns the network container resource type.
    pub fn container_type(&self) -> &str {
        &self.container_type
    }

    /// Returns the subnet resource type.
    pub fn subnet_type(&self) -> &str {
        &self.subnet_type
    }

    /// Returns the access point resource type.
    pub fn access_point_type(&self) -> &str {
        &self.access_point_type
    }

    /// Returns `true` if `resource_type` belongs to the network structure.
    pub fn is_reserved(&self, resource_type: &str) -> bool {
        resource_type == self.container_type
            || resource_type == self.subnet_type
            || resource_type == self.access_point_type
    }
}

/// Dimensions used by the layout engine, in canvas units.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Minimum canvas width; the canvas grows when content needs more room.
    pub canvas_width: f32,
    /// Minimum canvas height; the canvas grows to fit content.
    pub canvas_height: f32,
    /// Outer padding of the canvas.
    pub canvas_padding: f32,
    /// Vertical gap between tiers (rows and the network container).
    pub tier_gap: f32,
    /// Height of a service row.
    pub service_row_height: f32,
    /// Widest column a service may occupy.
    pub service_width: f32,
    /// Narrowest column a service may occupy.
    pub min_service_width: f32,
    /// Gap between services and around the inside of a row.
    pub service_gap: f32,
    /// Height reserved for the container title.
    pub container_header: f32,
    /// Gap between zones and around the container interior.
    pub container_padding: f32,
    /// Smallest container height, used when there are no zones.
    pub container_min_height: f32,
    /// Height reserved for a zone title.
    pub zone_header: f32,
    /// Narrowest zone column.
    pub min_zone_width: f32,
    /// Height of one subnet row.
    pub subnet_row_height: f32,
    /// Vertical gap between subnet rows.
    pub subnet_gap: f32,
    /// Horizontal padding between a zone border and its subnets.
    pub subnet_padding: f32,
    /// Width reserved on the container's right edge for access points.
    pub access_point_margin: f32,
    /// Height of one access point.
    pub access_point_height: f32,
    /// Smallest width or height any element may have.
    pub min_dimension: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1400.0,
            canvas_height: 900.0,
            canvas_padding: 30.0,
            tier_gap: 40.0,
            service_row_height: 100.0,
            service_width: 130.0,
            min_service_width: 60.0,
            service_gap: 20.0,
            container_header: 40.0,
            container_padding: 15.0,
            container_min_height: 180.0,
            zone_header: 30.0,
            min_zone_width: 160.0,
            subnet_row_height: 70.0,
            subnet_gap: 10.0,
            subnet_padding: 10.0,
            access_point_margin: 110.0,
            access_point_height: 56.0,
            min_dimension: 1.0,
        }
    }
}

/// Display name settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Visible characters kept before the ellipsis marker is appended.
    pub max_length: usize,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self { max_length: 25 }
    }
}

/// Top-level configuration root.
///
/// Omitted tables fall back to the built-in AWS rule and relationship tables
/// and to default network, layout and naming settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "builtin_rules")]
    rules: Vec<RuleConfig>,

    #[serde(default = "builtin_relationships")]
    relationships: Vec<RelationshipConfig>,

    #[serde(default)]
    network: NetworkConfig,

    #[serde(default)]
    layout: LayoutConfig,

    #[serde(default)]
    naming: NamingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rules: builtin_rules(),
            relationships: builtin_relationships(),
            network: NetworkConfig::default(),
            layout: LayoutConfig::default(),
            naming: NamingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Creates a configuration from explicit tables.
    pub fn new(rules: Vec<RuleConfig>, relationships: Vec<RelationshipConfig>) -> Self {
        Self {
            rules,
            relationships,
            ..Self::default()
        }
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not valid TOML or does
    /// not match the configuration schema.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Replaces the network settings.
    pub fn with_network(mut self, network: NetworkConfig) -> Self {
        self.network = network;
        self
    }

    /// Replaces the layout settings.
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// Replaces the naming settings.
    pub fn with_naming(mut self, naming: NamingConfig) -> Self {
        self.naming = naming;
        self
    }

    /// Returns the ordered classification rule table.
    pub fn rules(&self) -> &[RuleConfig] {
        &self.rules
    }

    /// Returns the relationship table.
    pub fn relationships(&self) -> &[RelationshipConfig] {
        &self.relationships
    }

    /// Returns the network settings.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Returns the layout settings.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the naming settings.
    pub fn naming(&self) -> &NamingConfig {
        &self.naming
    }
}

type RuleRow = (
    &'static str,
    &'static [&'static str],
    &'static [&'static str],
    ServiceCategory,
    bool,
);

const BUILTIN_RULES: &[RuleRow] = {
    use ServiceCategory::*;
    &[
        ("cloudfront", &["aws_cloudfront_distribution"], &["aws_cloudfront_origin_access_identity", "aws_cloudfront_origin_access_control", "aws_cloudfront_function"], Edge, false),
        ("waf", &["aws_wafv2_web_acl"], &["aws_wafv2_web_acl_association", "aws_wafv2_ip_set", "aws_wafv2_rule_group"], Edge, false),
        ("route53", &["aws_route53_zone"], &["aws_route53_record", "aws_route53_health_check"], Edge, false),
        ("acm", &["aws_acm_certificate"], &["aws_acm_certificate_validation"], Edge, false),
        ("cognito", &["aws_cognito_user_pool"], &["aws_cognito_user_pool_client", "aws_cognito_user_pool_domain", "aws_cognito_identity_pool"], Edge, false),
        ("api_gateway", &["aws_api_gateway_rest_api", "aws_apigatewayv2_api"], &["aws_api_gateway_stage", "aws_api_gateway_deployment", "aws_apigatewayv2_stage", "aws_apigatewayv2_route", "aws_apigatewayv2_integration"], Edge, false),
        ("alb", &["aws_lb", "aws_alb"], &["aws_lb_listener", "aws_lb_target_group", "aws_lb_listener_rule", "aws_lb_target_group_attachment"], Compute, true),
        ("ecs", &["aws_ecs_cluster", "aws_ecs_service"], &["aws_ecs_task_definition", "aws_ecs_capacity_provider"], Compute, true),
        ("ec2", &["aws_instance"], &["aws_launch_template", "aws_autoscaling_group", "aws_eip", "aws_key_pair"], Compute, true),
        ("eks", &["aws_eks_cluster"], &["aws_eks_node_group", "aws_eks_addon"], Compute, true),
        ("nat_gateway", &["aws_nat_gateway"], &[], Compute, true),
        ("internet_gateway", &["aws_internet_gateway"], &["aws_route_table", "aws_route", "aws_route_table_association"], Compute, true),
        ("security_groups", &["aws_security_group"], &["aws_security_group_rule", "aws_vpc_security_group_ingress_rule", "aws_vpc_security_group_egress_rule"], Security, true),
        ("lambda", &["aws_lambda_function"], &["aws_lambda_permission", "aws_lambda_event_source_mapping", "aws_lambda_layer_version", "aws_lambda_alias"], Compute, false),
        ("ecr", &["aws_ecr_repository"], &["aws_ecr_lifecycle_policy", "aws_ecr_repository_policy"], Compute, false),
        ("rds", &["aws_db_instance", "aws_rds_cluster"], &["aws_db_subnet_group", "aws_db_parameter_group", "aws_rds_cluster_instance"], Data, true),
        ("elasticache", &["aws_elasticache_cluster", "aws_elasticache_replication_group"], &["aws_elasticache_subnet_group", "aws_elasticache_parameter_group"], Data, true),
        ("s3", &["aws_s3_bucket"], &["aws_s3_bucket_policy", "aws_s3_bucket_versioning", "aws_s3_bucket_notification", "aws_s3_bucket_public_access_block", "aws_s3_bucket_server_side_encryption_configuration", "aws_s3_bucket_lifecycle_configuration"], Data, false),
        ("dynamodb", &["aws_dynamodb_table"], &["aws_dynamodb_table_item"], Data, false),
        ("sqs", &["aws_sqs_queue"], &["aws_sqs_queue_policy", "aws_sqs_queue_redrive_policy"], Messaging, false),
        ("sns", &["aws_sns_topic"], &["aws_sns_topic_subscription", "aws_sns_topic_policy"], Messaging, false),
        ("eventbridge", &["aws_cloudwatch_event_rule", "aws_cloudwatch_event_bus"], &["aws_cloudwatch_event_target"], Messaging, false),
        ("kms", &["aws_kms_key"], &["aws_kms_alias"], Security, false),
        ("secrets_manager", &["aws_secretsmanager_secret"], &["aws_secretsmanager_secret_version", "aws_secretsmanager_secret_rotation"], Security, false),
        ("iam", &["aws_iam_role"], &["aws_iam_policy", "aws_iam_role_policy", "aws_iam_role_policy_attachment", "aws_iam_instance_profile"], Security, false),
        ("cloudwatch", &["aws_cloudwatch_log_group", "aws_cloudwatch_dashboard"], &["aws_cloudwatch_metric_alarm", "aws_cloudwatch_log_stream"], Monitoring, false),
    ]
};

const BUILTIN_RELATIONSHIPS: &[(&str, &str, &str, ConnectionKind)] = {
    use ConnectionKind::*;
    &[
        ("route53", "cloudfront", "DNS", Default),
        ("route53", "alb", "DNS", Default),
        ("waf", "cloudfront", "Protects", Default),
        ("waf", "alb", "Protects", Default),
        ("acm", "cloudfront", "TLS", Encrypt),
        ("acm", "alb", "TLS", Encrypt),
        ("cloudfront", "s3", "Origin", DataFlow),
        ("cloudfront", "alb", "Origin", DataFlow),
        ("cognito", "api_gateway", "Authorizes", Default),
        ("api_gateway", "lambda", "Invokes", Trigger),
        ("alb", "ecs", "Routes", DataFlow),
        ("alb", "ec2", "Routes", DataFlow),
        ("alb", "eks", "Routes", DataFlow),
        ("ecr", "ecs", "Images", Default),
        ("ecr", "eks", "Images", Default),
        ("ecs", "rds", "Queries", DataFlow),
        ("ecs", "elasticache", "Caches", DataFlow),
        ("ecs", "s3", "Reads/Writes", DataFlow),
        ("ecs", "dynamodb", "Reads/Writes", DataFlow),
        ("ecs", "sqs", "Publishes", DataFlow),
        ("ec2", "rds", "Queries", DataFlow),
        ("lambda", "dynamodb", "Reads/Writes", DataFlow),
        ("lambda", "s3", "Reads/Writes", DataFlow),
        ("lambda", "sqs", "Publishes", DataFlow),
        ("sqs", "lambda", "Triggers", Trigger),
        ("sns", "sqs", "Fan-out", Trigger),
        ("sns", "lambda", "Triggers", Trigger),
        ("eventbridge", "lambda", "Triggers", Trigger),
        ("s3", "lambda", "Notifies", Trigger),
        ("kms", "s3", "Encrypts", Encrypt),
        ("kms", "rds", "Encrypts", Encrypt),
        ("kms", "dynamodb", "Encrypts", Encrypt),
        ("kms", "sqs", "Encrypts", Encrypt),
        ("kms", "secrets_manager", "Encrypts", Encrypt),
        ("secrets_manager", "ecs", "Injects", Default),
        ("secrets_manager", "lambda", "Injects", Default),
        ("iam", "ecs", "Assumes", Default),
        ("iam", "lambda", "Assumes", Default),
        ("ecs", "cloudwatch", "Logs", Default),
        ("lambda", "cloudwatch", "Logs", Default),
    ]
};

/// Returns the built-in AWS classification rule table.
pub fn builtin_rules() -> Vec<RuleConfig> {
    BUILTIN_RULES
        .iter()
        .map(|(key, primary, secondary, category, in_container)| {
            RuleConfig::new(*key, primary, secondary, *category, *in_container)
        })
        .collect()
}

/// Returns the built-in AWS relationship table.
pub fn builtin_relationships() -> Vec<RelationshipConfig> {
    BUILTIN_RELATIONSHIPS
        .iter()
        .map(|(source, target, label, kind)| RelationshipConfig::new(source, target, label, *kind))
        .collect()
}
