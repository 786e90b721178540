//! Layout of the network container: zone columns, subnet bands, services
//! placed inside the container and the access point column.

use std::collections::HashMap;

use log::trace;

use tfgraph_core::{
    geometry::{Bounds, Insets, Point, Size, clamp_dimension},
    identifier::Id,
};

use super::{
    rows::{self, required_width},
    tree::{Geometry, NodeKind},
};
use crate::{
    classify::LogicalService,
    config::LayoutConfig,
    structure::{AccessPoint, AccessPointKind, NetworkStructure, SubnetCategory, Zone},
};

/// Sizing plan for the network container, computed before placement so the
/// canvas can grow to fit it.
pub(super) struct ContainerPlan<'a> {
    config: &'a LayoutConfig,
    network: Option<&'a NetworkStructure>,
    access_points: Vec<&'a AccessPoint>,
    flat: Vec<&'a LogicalService>,
    by_subnet: HashMap<&'a Id, Vec<&'a LogicalService>>,
    slots: Vec<(SubnetCategory, usize)>,
}

impl<'a> ContainerPlan<'a> {
    /// Builds a plan, or `None` when there is neither a network structure nor
    /// a service that belongs inside the container.
    pub(super) fn new(
        config: &'a LayoutConfig,
        network: Option<&'a NetworkStructure>,
        services: Vec<&'a LogicalService>,
    ) -> Option<Self> {
        if network.is_none() && services.is_empty() {
            return None;
        }

        let mut flat = Vec::new();
        let mut by_subnet: HashMap<&Id, Vec<&LogicalService>> = HashMap::new();
        for service in services {
            let subnet = network.and_then(|network| {
                service
                    .subnet_refs()
                    .iter()
                    .find_map(|reference| network.subnet(reference))
            });
            match subnet {
                Some(subnet) => by_subnet.entry(subnet.resource_id()).or_default().push(service),
                None => flat.push(service),
            }
        }

        let mut access_points: Vec<&AccessPoint> = network
            .map(|network| network.access_points().iter().collect())
            .unwrap_or_default();
        // Gateways first; the sort is stable so input order holds within a kind.
        access_points.sort_by_key(|access_point| access_point.kind() != AccessPointKind::Gateway);

        let zones = network.map(NetworkStructure::zones).unwrap_or_default();
        let slots = SubnetCategory::ALL
            .into_iter()
            .map(|category| {
                let count = zones
                    .iter()
                    .map(|zone| zone.subnets_in(category).count())
                    .max()
                    .unwrap_or(0);
                (category, count)
            })
            .collect();

        Some(Self {
            config,
            network,
            access_points,
            flat,
            by_subnet,
            slots,
        })
    }

    fn zones(&self) -> &'a [Zone] {
        self.network.map(NetworkStructure::zones).unwrap_or_default()
    }

    /// Width reserved on the right edge for access points. Never narrower
    /// than the container padding plus the smallest drawable column.
    fn access_point_reserve(&self) -> f32 {
        if self.access_points.is_empty() {
            0.0
        } else {
            let config = self.config;
            config
                .access_point_margin
                .max(config.container_padding + config.min_dimension)
        }
    }

    fn slot_rows(&self) -> usize {
        self.slots.iter().map(|(_, count)| count).sum()
    }

    /// Height of the band of services placed directly in the container,
    /// above the zones.
    fn flat_band_height(&self) -> f32 {
        if self.flat.is_empty() || self.zones().is_empty() {
            0.0
        } else {
            self.config.service_row_height
        }
    }

    fn zone_height(&self) -> f32 {
        let config = self.config;
        config.zone_header + self.slot_rows() as f32 * (config.subnet_row_height + config.subnet_gap)
    }

    fn subnet_width(&self, services: usize) -> f32 {
        required_width(services, self.config.min_service_width, self.config.subnet_gap)
    }

    /// Narrowest zone column that fits every subnet's services.
    fn min_zone_width(&self) -> f32 {
        let widest_subnet = self
            .by_subnet
            .values()
            .map(|services| self.subnet_width(services.len()))
            .fold(0.0, f32::max);
        self.config
            .min_zone_width
            .max(widest_subnet + 2.0 * self.config.subnet_padding)
    }

    /// Smallest container width that satisfies every inner constraint.
    pub(super) fn required_width(&self) -> f32 {
        let gap = self.config.container_padding;
        let zone_count = self.zones().len();
        let zones = if zone_count == 0 {
            0.0
        } else {
            let n = zone_count as f32;
            n * self.min_zone_width() + (n + 1.0) * gap
        };
        let flat = required_width(self.flat.len(), self.config.min_service_width, gap);
        zones.max(flat).max(2.0 * gap) + self.access_point_reserve()
    }

    /// Container height: header, flat band, and the taller of the zone body
    /// and the access point column.
    pub(super) fn height(&self) -> f32 {
        let config = self.config;
        let gap = config.container_padding;

        let body = if !self.zones().is_empty() {
            self.zone_height()
        } else if !self.flat.is_empty() {
            config.service_row_height
        } else {
            0.0
        };
        let access_points = self.access_points.len() as f32 * (config.access_point_height + gap);

        let height = config.container_header + self.flat_band_height() + body.max(access_points) + gap;
        clamp_dimension(height.max(config.container_min_height), config.min_dimension)
    }

    /// Places the container and everything inside it.
    pub(super) fn place(&self, geometry: &mut Geometry, parent: &Id, bounds: Bounds) {
        let config = self.config;
        let gap = config.container_padding;

        let container = geometry.insert(
            parent,
            "network",
            NodeKind::Network,
            bounds,
            self.network.map(NetworkStructure::container_id),
        );

        let top = bounds.shrink(NodeKind::Network.padding(config)).min_y();
        let zone_area_width = bounds.width() - self.access_point_reserve();
        let zones_top = top + self.flat_band_height();
        let zones = self.zones();

        if !self.flat.is_empty() {
            let band = if zones.is_empty() {
                let interior_height = bounds.max_y() - gap - top;
                let band_height = config.service_row_height.min(interior_height);
                Bounds::new_from_top_left(
                    Point::new(bounds.min_x() + gap, top + (interior_height - band_height) / 2.0),
                    Size::new(zone_area_width - 2.0 * gap, band_height),
                )
            } else {
                Bounds::new_from_top_left(
                    Point::new(bounds.min_x() + gap, top),
                    Size::new(zone_area_width - 2.0 * gap, config.service_row_height),
                )
            };
            let area = band.shrink(Insets::new(config.subnet_gap, 0.0, config.subnet_gap, 0.0));
            rows::place_services(geometry, config, &container, &self.flat, area, gap);
        }

        if !zones.is_empty() {
            let n = zones.len() as f32;
            let zone_width = clamp_dimension(
                (zone_area_width - (n + 1.0) * gap) / n,
                config.min_dimension,
            );
            let zone_height = clamp_dimension(bounds.max_y() - gap - zones_top, config.min_dimension);
            trace!(zones = zones.len(), zone_width = zone_width; "Placing zones");

            for (index, zone) in zones.iter().enumerate() {
                let x = bounds.min_x() + gap + index as f32 * (zone_width + gap);
                let zone_bounds =
                    Bounds::new_from_top_left(Point::new(x, zones_top), Size::new(zone_width, zone_height));
                self.place_zone(geometry, &container, zone, zone_bounds);
            }
        }

        let column_x = bounds.max_x() - self.access_point_reserve();
        let column_width = clamp_dimension(self.access_point_reserve() - gap, config.min_dimension);
        for (index, access_point) in self.access_points.iter().enumerate() {
            let y = zones_top + index as f32 * (config.access_point_height + gap);
            let access_point_bounds = Bounds::new_from_top_left(
                Point::new(column_x, y),
                Size::new(column_width, config.access_point_height),
            );
            geometry.insert(
                &container,
                &format!("endpoint:{}", access_point.resource_id()),
                NodeKind::AccessPoint,
                access_point_bounds,
                Some(access_point.resource_id()),
            );
        }
    }

    /// Places one zone column with its subnets stacked in category bands.
    /// Every zone reserves the same band heights so bands line up across
    /// columns.
    fn place_zone(&self, geometry: &mut Geometry, parent: &Id, zone: &Zone, bounds: Bounds) {
        let config = self.config;
        let zone_id = geometry.insert(
            parent,
            &format!("zone:{}", zone.id()),
            NodeKind::Zone,
            bounds,
            None,
        );

        let inner = bounds.shrink(NodeKind::Zone.padding(config));
        let row_pitch = config.subnet_row_height + config.subnet_gap;
        let subnet_width = clamp_dimension(inner.width(), config.min_dimension);

        let mut band_offset = 0;
        for (category, slots) in &self.slots {
            for (row, subnet) in zone.subnets_in(*category).enumerate() {
                let y = inner.min_y() + (band_offset + row) as f32 * row_pitch;
                let subnet_bounds = Bounds::new_from_top_left(
                    Point::new(inner.min_x(), y),
                    Size::new(subnet_width, config.subnet_row_height),
                );
                let subnet_id = geometry.insert(
                    &zone_id,
                    subnet.resource_id().as_str(),
                    NodeKind::Subnet,
                    subnet_bounds,
                    Some(subnet.resource_id()),
                );

                if let Some(services) = self.by_subnet.get(subnet.resource_id()) {
                    let area = subnet_bounds.shrink(NodeKind::Subnet.padding(config));
                    rows::place_services(geometry, config, &subnet_id, services, area, config.subnet_gap);
                }
            }
            band_offset += slots;
        }
    }
}
