//! Service rows and the shared row packing routine.

use std::collections::HashMap;

use tfgraph_core::{
    geometry::{Bounds, Point, Size, clamp_dimension},
    identifier::Id,
};

use super::tree::{Geometry, NodeKind};
use crate::{
    classify::LogicalService, config::LayoutConfig, config::ServiceCategory,
    connect::LogicalConnection,
};

/// Horizontal rows for services drawn outside the network container, in
/// vertical order. The network container sits between the edge row and the
/// data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Tier {
    Edge,
    Data,
    Messaging,
    Misc,
}

impl Tier {
    pub(super) fn of(category: ServiceCategory) -> Self {
        match category {
            ServiceCategory::Edge => Tier::Edge,
            ServiceCategory::Data => Tier::Data,
            ServiceCategory::Messaging => Tier::Messaging,
            ServiceCategory::Compute
            | ServiceCategory::Security
            | ServiceCategory::Monitoring
            | ServiceCategory::Other => Tier::Misc,
        }
    }

    /// Id segment of the row node.
    pub(super) fn segment(self) -> &'static str {
        match self {
            Tier::Edge => "edge",
            Tier::Data => "data",
            Tier::Messaging => "messaging",
            Tier::Misc => "misc",
        }
    }
}

/// Orders services by connection degree, most connected first. Ties keep
/// their input order.
pub(super) fn order_by_degree<'a>(
    services: &'a [LogicalService],
    connections: &[LogicalConnection],
) -> Vec<&'a LogicalService> {
    let mut degree: HashMap<&Id, usize> = HashMap::new();
    for connection in connections {
        *degree.entry(connection.source()).or_default() += 1;
        *degree.entry(connection.target()).or_default() += 1;
    }

    let mut ordered: Vec<&LogicalService> = services.iter().collect();
    ordered.sort_by_key(|service| std::cmp::Reverse(degree.get(service.id()).copied().unwrap_or(0)));
    ordered
}

/// Smallest width that fits `count` columns of `min_width` separated and
/// surrounded by `gap`.
pub(super) fn required_width(count: usize, min_width: f32, gap: f32) -> f32 {
    if count == 0 {
        return 0.0;
    }
    let count = count as f32;
    count * min_width + (count + 1.0) * gap
}

/// Splits `area` into `count` equal columns separated by `gap`.
///
/// Columns are at most `max_width` wide and the group is centred
/// horizontally. Every column spans the full height of `area`.
pub(super) fn pack(area: Bounds, count: usize, max_width: f32, gap: f32, min_dimension: f32) -> Vec<Bounds> {
    if count == 0 {
        return Vec::new();
    }

    let n = count as f32;
    let width = clamp_dimension(((area.width() - gap * (n - 1.0)) / n).min(max_width), min_dimension);
    let height = clamp_dimension(area.height(), min_dimension);
    let total = width * n + gap * (n - 1.0);
    let start_x = area.min_x() + (area.width() - total).max(0.0) / 2.0;

    (0..count)
        .map(|index| {
            let x = start_x + index as f32 * (width + gap);
            Bounds::new_from_top_left(Point::new(x, area.min_y()), Size::new(width, height))
        })
        .collect()
}

/// Places service leaves inside `area` under `parent`.
pub(super) fn place_services(
    geometry: &mut Geometry,
    config: &LayoutConfig,
    parent: &Id,
    services: &[&LogicalService],
    area: Bounds,
    gap: f32,
) {
    let slots = pack(area, services.len(), config.service_width, gap, config.min_dimension);
    for (service, bounds) in services.iter().zip(slots) {
        geometry.insert(
            parent,
            service.id().as_str(),
            NodeKind::Service,
            bounds,
            Some(service.id()),
        );
    }
}

/// Places one row of services spanning `bounds`.
pub(super) fn place_row(
    geometry: &mut Geometry,
    config: &LayoutConfig,
    parent: &Id,
    tier: Tier,
    services: &[&LogicalService],
    bounds: Bounds,
) {
    let row = geometry.insert(parent, tier.segment(), NodeKind::ServiceRow, bounds, None);
    let area = bounds.shrink(NodeKind::ServiceRow.padding(config));
    place_services(geometry, config, &row, services, area, config.service_gap);
}
