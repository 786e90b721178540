//! Network structure extraction.
//!
//! The [`StructureBuilder`] turns the network resources of an input (the
//! container, its subnets and its private access points) into a
//! [`NetworkStructure`]: zones holding categorized subnets, plus the access
//! points attached to the container.
//!
//! # Submodules
//!
//! - [`detect`] - Zone, subnet category and access point heuristics

pub mod detect;

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::Serialize;

use tfgraph_core::{identifier::Id, resource::RawResource};

use crate::{
    config::{NamingConfig, NetworkConfig},
    naming::{self, NameResolver},
};

/// Network category of a subnet. The declaration order is the vertical
/// order of subnet bands inside a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubnetCategory {
    Public,
    Private,
    Database,
}

impl SubnetCategory {
    /// All categories in band order.
    pub const ALL: [SubnetCategory; 3] = [Self::Public, Self::Private, Self::Database];
}

/// Kind of a private access point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessPointKind {
    Gateway,
    Interface,
}

/// A subnet inside a zone.
#[derive(Debug, Clone, Serialize)]
pub struct Subnet {
    resource_id: Id,
    display_name: String,
    category: SubnetCategory,
    zone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    address_block: Option<String>,
}

impl Subnet {
    /// Returns the address of the subnet resource.
    pub fn resource_id(&self) -> &Id {
        &self.resource_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn category(&self) -> SubnetCategory {
        self.category
    }

    /// Returns the id of the zone this subnet was placed in.
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// Returns the address block, when declared literally.
    pub fn address_block(&self) -> Option<&str> {
        self.address_block.as_deref()
    }
}

/// An availability zone and its subnets.
#[derive(Debug, Clone, Serialize)]
pub struct Zone {
    id: String,
    label: String,
    subnets: Vec<Subnet>,
}

impl Zone {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the short label shown on the diagram.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns subnets ordered by category, then by display name.
    pub fn subnets(&self) -> &[Subnet] {
        &self.subnets
    }

    /// Returns the subnets of one category, in display order.
    pub fn subnets_in(&self, category: SubnetCategory) -> impl Iterator<Item = &Subnet> {
        self.subnets
            .iter()
            .filter(move |subnet| subnet.category == category)
    }
}

/// A private access point attached to the network container.
#[derive(Debug, Clone, Serialize)]
pub struct AccessPoint {
    resource_id: Id,
    display_name: String,
    kind: AccessPointKind,
    target: String,
}

impl AccessPoint {
    pub fn resource_id(&self) -> &Id {
        &self.resource_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn kind(&self) -> AccessPointKind {
        self.kind
    }

    /// Returns the service this access point reaches, e.g. `s3` or `ecr.api`.
    pub fn target(&self) -> &str {
        &self.target
    }
}

/// The network container with its zones and access points.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkStructure {
    container_id: Id,
    display_name: String,
    zones: Vec<Zone>,
    access_points: Vec<AccessPoint>,
}

impl NetworkStructure {
    /// Returns the address of the container resource.
    pub fn container_id(&self) -> &Id {
        &self.container_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns zones sorted by zone id.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Returns access points in input order.
    pub fn access_points(&self) -> &[AccessPoint] {
        &self.access_points
    }

    /// Returns all subnets across zones.
    pub fn subnets(&self) -> impl Iterator<Item = &Subnet> {
        self.zones.iter().flat_map(Zone::subnets)
    }

    /// Looks up a subnet by resource address.
    pub fn subnet(&self, resource_id: &Id) -> Option<&Subnet> {
        self.subnets().find(|subnet| &subnet.resource_id == resource_id)
    }
}

/// Builds the [`NetworkStructure`] of an input.
#[derive(Debug, Clone)]
pub struct StructureBuilder {
    network: NetworkConfig,
    naming: NamingConfig,
}

impl StructureBuilder {
    pub fn new(network: NetworkConfig, naming: NamingConfig) -> Self {
        Self { network, naming }
    }

    /// Builds the network structure, or returns `None` when the input has no
    /// network container.
    ///
    /// Only the first container is used. Subnets and access points are
    /// attached to it without checking which container they reference.
    pub fn build(
        &self,
        resources: &[RawResource],
        resolver: Option<&dyn NameResolver>,
    ) -> Option<NetworkStructure> {
        let mut containers = resources
            .iter()
            .filter(|resource| resource.resource_type() == self.network.container_type());

        let container = containers.next()?;
        let ignored = containers.count();
        if ignored > 0 {
            warn!(
                container = container.id(),
                ignored = ignored;
                "Multiple network containers found, using the first"
            );
        }

        let max_length = self.naming.max_length;

        let mut zones: BTreeMap<String, Vec<Subnet>> = BTreeMap::new();
        for resource in resources
            .iter()
            .filter(|resource| resource.resource_type() == self.network.subnet_type())
        {
            let zone = detect::detect_zone(resource);
            let subnet = Subnet {
                resource_id: Id::from(resource.id()),
                display_name: naming::element_name(resource, resolver, max_length),
                category: detect::detect_category(resource),
                zone: zone.clone(),
                address_block: resource.string_attribute("cidr_block").map(str::to_string),
            };
            zones.entry(zone).or_default().push(subnet);
        }

        let zones: Vec<Zone> = zones
            .into_iter()
            .map(|(id, mut subnets)| {
                subnets.sort_by(|a, b| {
                    a.category
                        .cmp(&b.category)
                        .then_with(|| a.display_name.cmp(&b.display_name))
                });
                Zone {
                    label: detect::zone_label(&id).to_string(),
                    id,
                    subnets,
                }
            })
            .collect();

        let access_points: Vec<AccessPoint> = resources
            .iter()
            .filter(|resource| resource.resource_type() == self.network.access_point_type())
            .map(|resource| AccessPoint {
                resource_id: Id::from(resource.id()),
                display_name: naming::element_name(resource, resolver, max_length),
                kind: detect::detect_access_point_kind(resource),
                target: detect::detect_target_service(resource),
            })
            .collect();

        debug!(
            container = container.id(),
            zones = zones.len(),
            access_points = access_points.len();
            "Network structure built"
        );

        Some(NetworkStructure {
            container_id: Id::from(container.id()),
            display_name: naming::element_name(container, resolver, max_length),
            zones,
            access_points,
        })
    }
}
