//! The assembled diagram model.

use serde::Serialize;

use crate::{
    classify::{Ambiguity, LogicalService},
    connect::LogicalConnection,
    layout::Geometry,
    structure::NetworkStructure,
};

/// Everything a renderer needs: services, connections, the network
/// structure and the geometry that places them.
///
/// The model is a snapshot; it holds no references into the input.
#[derive(Debug, Clone, Serialize)]
pub struct Diagram {
    services: Vec<LogicalService>,
    connections: Vec<LogicalConnection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    network: Option<NetworkStructure>,
    ambiguities: Vec<Ambiguity>,
    geometry: Geometry,
}

impl Diagram {
    pub(crate) fn new(
        services: Vec<LogicalService>,
        connections: Vec<LogicalConnection>,
        network: Option<NetworkStructure>,
        ambiguities: Vec<Ambiguity>,
        geometry: Geometry,
    ) -> Self {
        Self {
            services,
            connections,
            network,
            ambiguities,
            geometry,
        }
    }

    /// Returns services ordered by category, then by first-seen input order.
    pub fn services(&self) -> &[LogicalService] {
        &self.services
    }

    pub fn connections(&self) -> &[LogicalConnection] {
        &self.connections
    }

    /// Returns the network structure, if the input declared a container.
    pub fn network(&self) -> Option<&NetworkStructure> {
        self.network.as_ref()
    }

    /// Returns resources that more than one rule claimed.
    pub fn ambiguities(&self) -> &[Ambiguity] {
        &self.ambiguities
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }
}
