//! Layout engine for positioning diagram elements.
//!
//! This module turns classified services and the network structure into a
//! [`Geometry`]: a tree of non-overlapping rectangles rooted at the canvas.
//!
//! # Pipeline Position
//!
//! ```text
//! Raw resources
//!     ↓ classify / connect / structure
//! Services, connections, network structure
//!     ↓ layout (this module)
//! Geometry
//! ```
//!
//! # Arrangement
//!
//! Tiers are stacked top to bottom: the edge row, the network container, the
//! data row, the messaging row and a row for everything else. Empty tiers are
//! skipped. Inside the container, zones are equal-width columns, each holding
//! its subnets in public, private and database bands; access points are
//! stacked in a column on the container's right edge.
//!
//! # Submodules
//!
//! - [`tree`] - The geometry tree produced by the engine

mod network;
mod rows;
pub mod tree;

pub use tree::{Geometry, GeometryNode, NodeKind, NodeRole};

use log::debug;

use tfgraph_core::{
    geometry::{Bounds, Point, Size, clamp_dimension},
    identifier::Id,
};

use crate::{
    classify::LogicalService, config::LayoutConfig, connect::LogicalConnection,
    structure::NetworkStructure,
};
use network::ContainerPlan;
use rows::Tier;

/// Id of the canvas root node.
pub const CANVAS_ID: &str = "canvas";

/// A horizontal band of the canvas.
enum Band<'a> {
    Row(Tier, Vec<&'a LogicalService>),
    Container(ContainerPlan<'a>),
}

/// Computes diagram geometry.
///
/// The engine is stateless apart from its configuration; the same input
/// always yields the same geometry.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lays out services and the optional network structure.
    ///
    /// The canvas starts at the configured size and grows in either
    /// direction when the content needs more room. Within a row, services
    /// with more connections are placed first.
    pub fn layout(
        &self,
        services: &[LogicalService],
        connections: &[LogicalConnection],
        network: Option<&NetworkStructure>,
    ) -> Geometry {
        let config = &self.config;

        let mut edge = Vec::new();
        let mut data = Vec::new();
        let mut messaging = Vec::new();
        let mut misc = Vec::new();
        let mut contained = Vec::new();
        for service in rows::order_by_degree(services, connections) {
            if service.in_container() {
                contained.push(service);
                continue;
            }
            match Tier::of(service.category()) {
                Tier::Edge => edge.push(service),
                Tier::Data => data.push(service),
                Tier::Messaging => messaging.push(service),
                Tier::Misc => misc.push(service),
            }
        }

        let bands: Vec<Band> = [
            Some(Band::Row(Tier::Edge, edge)),
            ContainerPlan::new(config, network, contained).map(Band::Container),
            Some(Band::Row(Tier::Data, data)),
            Some(Band::Row(Tier::Messaging, messaging)),
            Some(Band::Row(Tier::Misc, misc)),
        ]
        .into_iter()
        .flatten()
        .filter(|band| !matches!(band, Band::Row(_, members) if members.is_empty()))
        .collect();

        let padding = config.canvas_padding;
        let required_width = bands
            .iter()
            .map(|band| self.band_width(band))
            .fold(0.0, f32::max);
        let width = clamp_dimension(
            config.canvas_width.max(required_width + 2.0 * padding),
            config.min_dimension,
        );
        let inner_width = clamp_dimension(width - 2.0 * padding, config.min_dimension);

        let content_height: f32 = bands.iter().map(|band| self.band_height(band)).sum::<f32>()
            + config.tier_gap * bands.len().saturating_sub(1) as f32;
        let height = clamp_dimension(
            config.canvas_height.max(content_height + 2.0 * padding),
            config.min_dimension,
        );

        let mut geometry = Geometry::new(
            Id::new(CANVAS_ID),
            Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(width, height)),
        );
        let root = geometry.root().id().clone();

        let mut y = padding;
        for band in &bands {
            let band_height = self.band_height(band);
            let bounds = Bounds::new_from_top_left(Point::new(padding, y), Size::new(inner_width, band_height));
            match band {
                Band::Row(tier, members) => {
                    rows::place_row(&mut geometry, config, &root, *tier, members, bounds);
                }
                Band::Container(plan) => plan.place(&mut geometry, &root, bounds),
            }
            y += band_height + config.tier_gap;
        }

        debug!(
            width = width,
            height = height,
            nodes = geometry.len();
            "Layout complete"
        );

        geometry
    }

    fn band_width(&self, band: &Band) -> f32 {
        match band {
            Band::Row(_, members) => rows::required_width(
                members.len(),
                self.config.min_service_width,
                self.config.service_gap,
            ),
            Band::Container(plan) => plan.required_width(),
        }
    }

    fn band_height(&self, band: &Band) -> f32 {
        match band {
            Band::Row(..) => clamp_dimension(self.config.service_row_height, self.config.min_dimension),
            Band::Container(plan) => plan.height(),
        }
    }
}
