//! Example: Building a diagram model from resource declarations
//!
//! This example assembles a small web stack by hand, runs the pipeline and
//! prints where each element ended up.

use tfgraph::{
    DiagramBuilder,
    config::AppConfig,
    naming::VariableResolver,
    resource::{AttributeValue, RawResource},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let resources = vec![
        RawResource::new("aws_vpc", "main").with_attribute("name", "${var.project}-network"),
        RawResource::new("aws_subnet", "public_a").with_attribute("availability_zone", "eu-west-1a"),
        RawResource::new("aws_subnet", "public_b").with_attribute("availability_zone", "eu-west-1b"),
        RawResource::new("aws_subnet", "app_a").with_attribute("availability_zone", "eu-west-1a"),
        RawResource::new("aws_vpc_endpoint", "s3")
            .with_attribute("vpc_endpoint_type", "Gateway")
            .with_attribute("service_name", "com.amazonaws.eu-west-1.s3"),
        RawResource::new("aws_cloudfront_distribution", "cdn"),
        RawResource::new("aws_lb", "web"),
        RawResource::new("aws_ecs_service", "api")
            .with_attribute("subnets", AttributeValue::List(vec!["${aws_subnet.app_a.id}".into()])),
        RawResource::new("aws_s3_bucket", "assets"),
    ];

    let resolver = VariableResolver::default().with_variable("project", "shop");
    let builder = DiagramBuilder::new(AppConfig::default())?;
    let diagram = builder.build(&resources, Some(&resolver));

    println!("Services:");
    for service in diagram.services() {
        println!("  {} ({:?}, {} members)", service.display_name(), service.category(), service.count());
    }

    println!("\nConnections:");
    for connection in diagram.connections() {
        println!("  {} -> {}: {}", connection.source(), connection.target(), connection.label());
    }

    println!("\nGeometry:");
    for node in diagram.geometry().nodes() {
        let bounds = node.bounds();
        println!(
            "  {:<60} {:>7.1} {:>7.1} {:>7.1} x {:<7.1}",
            node.id(),
            bounds.min_x(),
            bounds.min_y(),
            bounds.width(),
            bounds.height()
        );
    }

    Ok(())
}
