//! Integration tests for the DiagramBuilder API
//!
//! These tests run the full pipeline through the public API.

use proptest::prelude::*;

use tfgraph::{
    DiagramBuilder, TfGraphError,
    config::{AppConfig, ConnectionKind, LayoutConfig, RelationshipConfig, RuleConfig, ServiceCategory},
    identifier::Id,
    layout::{Geometry, NodeKind},
    naming::VariableResolver,
    resource::{AttributeValue, RawResource},
    structure::{AccessPointKind, SubnetCategory},
};

fn builder() -> DiagramBuilder {
    DiagramBuilder::new(AppConfig::default()).expect("default config is valid")
}

fn web_stack() -> Vec<RawResource> {
    vec![
        RawResource::new("aws_vpc", "main").with_attribute("cidr_block", "10.0.0.0/16"),
        RawResource::new("aws_subnet", "public_a").with_attribute("availability_zone", "us-east-1a"),
        RawResource::new("aws_subnet", "public_b").with_attribute("availability_zone", "us-east-1b"),
        RawResource::new("aws_subnet", "public_c").with_attribute("availability_zone", "us-east-1c"),
        RawResource::new("aws_subnet", "private_a").with_attribute("availability_zone", "us-east-1a"),
        RawResource::new("aws_vpc_endpoint", "s3")
            .with_attribute("vpc_endpoint_type", "Gateway")
            .with_attribute("service_name", "com.amazonaws.us-east-1.s3"),
        RawResource::new("aws_cloudfront_distribution", "cdn"),
        RawResource::new("aws_lb", "web"),
        RawResource::new("aws_lb_listener", "https"),
        RawResource::new("aws_ecs_cluster", "app"),
        RawResource::new("aws_ecs_service", "api")
            .with_attribute("subnets", AttributeValue::List(vec!["${aws_subnet.private_a.id}".into()])),
        RawResource::new("aws_s3_bucket", "assets"),
        RawResource::new("aws_sqs_queue", "jobs"),
        RawResource::new("random_password", "db"),
    ]
}

fn assert_well_formed(geometry: &Geometry, config: &LayoutConfig) {
    for node in geometry.nodes() {
        let inner = node.bounds().shrink(node.kind().padding(config));
        let children: Vec<_> = geometry.children(node.id()).collect();
        for (index, child) in children.iter().enumerate() {
            assert!(
                inner.contains(&child.bounds()),
                "{} escapes the padded area of {}",
                child.id(),
                node.id()
            );
            for sibling in &children[index + 1..] {
                assert!(
                    !child.bounds().intersects(&sibling.bounds()),
                    "{} overlaps {}",
                    child.id(),
                    sibling.id()
                );
            }
        }
    }
}

#[test]
fn test_web_stack_end_to_end() {
    let diagram = builder().build(&web_stack(), None);

    let keys: Vec<_> = diagram.services().iter().map(|s| s.id().as_str()).collect();
    assert_eq!(keys, vec!["cloudfront", "alb", "ecs", "s3", "sqs"]);

    let alb = &diagram.services()[1];
    assert_eq!(alb.count(), 2);
    assert!(alb.in_container());

    let pairs: Vec<_> = diagram
        .connections()
        .iter()
        .map(|c| (c.source().as_str(), c.target().as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![("cloudfront", "s3"), ("cloudfront", "alb"), ("alb", "ecs"), ("ecs", "s3"), ("ecs", "sqs")]
    );

    let network = diagram.network().expect("network present");
    let zone_ids: Vec<_> = network.zones().iter().map(|z| z.id()).collect();
    assert_eq!(zone_ids, vec!["us-east-1a", "us-east-1b", "us-east-1c"]);
    assert_eq!(network.zones()[0].label(), "1a");
    assert_eq!(network.zones()[0].subnets()[0].category(), SubnetCategory::Public);
    assert_eq!(network.zones()[0].subnets()[1].category(), SubnetCategory::Private);
    assert_eq!(network.access_points()[0].kind(), AccessPointKind::Gateway);
    assert_eq!(network.access_points()[0].target(), "s3");

    let geometry = diagram.geometry();
    assert_well_formed(geometry, &LayoutConfig::default());
    assert_eq!(geometry.nodes_of(NodeKind::Zone).count(), 3);

    let ecs = geometry.node_for(&Id::new("ecs")).expect("ecs placed");
    let subnet = geometry.node_for(&Id::new("aws_subnet.private_a")).expect("subnet placed");
    assert_eq!(ecs.parent(), Some(subnet.id()));
}

#[test]
fn test_each_service_appears_once_in_geometry() {
    let diagram = builder().build(&web_stack(), None);
    let geometry = diagram.geometry();

    for service in diagram.services() {
        let placed = geometry
            .nodes()
            .filter(|node| node.element() == Some(service.id()))
            .count();
        assert_eq!(placed, 1, "{}", service.id());
    }
}

#[test]
fn test_build_is_idempotent() {
    let builder = builder();
    let resources = web_stack();

    let first = toml::to_string(&builder.build(&resources, None)).expect("serializable");
    let second = toml::to_string(&builder.build(&resources, None)).expect("serializable");

    assert_eq!(first, second);
}

#[test]
fn test_empty_input() {
    let diagram = builder().build(&[], None);

    assert!(diagram.services().is_empty());
    assert!(diagram.connections().is_empty());
    assert!(diagram.network().is_none());
    assert_eq!(diagram.geometry().len(), 1);
}

#[test]
fn test_custom_tables() {
    let config = AppConfig::new(
        vec![
            RuleConfig::new("queue", &["aws_sqs_queue"], &["aws_sqs_queue_policy"], ServiceCategory::Messaging, false),
            RuleConfig::new("worker", &["aws_lambda_function"], &[], ServiceCategory::Compute, false),
            RuleConfig::new("unknown", &["aws_sqs_queue"], &[], ServiceCategory::Other, false),
        ],
        vec![
            RelationshipConfig::new("queue", "worker", "Triggers", ConnectionKind::Trigger),
            RelationshipConfig::new("worker", "missing", "Writes", ConnectionKind::DataFlow),
        ],
    );
    let builder = DiagramBuilder::new(config).expect("valid config");
    let resources = vec![
        RawResource::new("aws_lambda_function", "handler"),
        RawResource::new("aws_sqs_queue", "jobs"),
    ];

    let diagram = builder.build(&resources, None);

    let keys: Vec<_> = diagram.services().iter().map(|s| s.id().as_str()).collect();
    assert_eq!(keys, vec!["worker", "queue"]);
    assert_eq!(diagram.connections().len(), 1);
    assert_eq!(diagram.connections()[0].kind(), ConnectionKind::Trigger);
    assert_eq!(diagram.ambiguities().len(), 1);
    assert_eq!(diagram.ambiguities()[0].claimed_by(), "queue");
}

#[test]
fn test_invalid_config_is_reported_at_construction() {
    let config = AppConfig::new(
        vec![RuleConfig::new("net", &["aws_subnet"], &[], ServiceCategory::Other, false)],
        Vec::new(),
    );

    let err = DiagramBuilder::new(config).expect_err("subnet type is reserved");
    assert!(matches!(err, TfGraphError::Config(_)));
}

#[test]
fn test_resolver_is_used_for_names() {
    let resources = vec![
        RawResource::new("aws_vpc", "main").with_attribute("name", "${var.project}-vpc"),
        RawResource::new("aws_s3_bucket", "logs").with_attribute("bucket", "${var.project}-logs"),
    ];
    let resolver = VariableResolver::default().with_variable("project", "shop");

    let diagram = builder().build(&resources, Some(&resolver));

    assert_eq!(diagram.network().expect("network").display_name(), "shop-vpc");
    assert_eq!(diagram.services()[0].display_name(), "Logs");
}

#[test]
fn test_long_names_are_truncated() {
    let resources = vec![RawResource::new("aws_s3_bucket", "b").with_attribute("name", "a".repeat(40))];

    let diagram = builder().build(&resources, None);

    assert_eq!(diagram.services()[0].display_name(), format!("{}...", "a".repeat(25)));
}

fn check_random_networks_are_well_formed(
    zones: Vec<(usize, usize, usize)>,
    endpoints: usize,
    services: usize,
    access_point_margin: f32,
) {
    let mut resources = vec![RawResource::new("aws_vpc", "main")];
    for (index, (public, private, database)) in zones.iter().enumerate() {
        let zone = ["a", "b", "c", "d", "e", "f"][index];
        for (prefix, count) in [("public", public), ("app", private), ("db", database)] {
            for n in 0..*count {
                resources.push(RawResource::new("aws_subnet", format!("{prefix}{n}_{zone}")));
            }
        }
    }
    for n in 0..endpoints {
        resources.push(RawResource::new("aws_vpc_endpoint", format!("endpoint{n}")));
    }
    let in_subnet = ["aws_instance", "aws_ecs_service", "aws_db_instance"];
    for (n, resource_type) in in_subnet.iter().take(services).enumerate() {
        resources.push(
            RawResource::new(*resource_type, format!("svc{n}"))
                .with_attribute("subnet_id", "${aws_subnet.app0_a.id}"),
        );
    }

    let layout = LayoutConfig {
        access_point_margin,
        ..LayoutConfig::default()
    };
    let builder = DiagramBuilder::new(AppConfig::default().with_layout(layout.clone()))
        .expect("default tables are valid");
    let diagram = builder.build(&resources, None);
    assert_well_formed(diagram.geometry(), &layout);
}

proptest! {
    #[test]
    fn random_networks_are_well_formed(
        zones in prop::collection::vec((0usize..3, 0usize..3, 0usize..3), 1..6),
        endpoints in 0usize..5,
        services in 0usize..=3,
        access_point_margin in 0.0f32..150.0,
    ) {
        check_random_networks_are_well_formed(zones, endpoints, services, access_point_margin);
    }
}
