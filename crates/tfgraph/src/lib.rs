//! tfgraph - Turns declarative infrastructure into an architecture diagram
//! model.
//!
//! Raw resource declarations flow through four stages: classification into
//! logical services, connection inference, network structure extraction and
//! layout. The result is a [`Diagram`] ready to be rendered.
//!
//! ```text
//! RawResource[]
//!     ↓ classify      LogicalService[]
//!     ↓ connect       LogicalConnection[]
//!     ↓ structure     NetworkStructure
//!     ↓ layout        Geometry
//! Diagram
//! ```

pub mod classify;
pub mod config;
pub mod connect;
pub mod layout;
pub mod manifest;
pub mod naming;
pub mod structure;

mod diagram;
mod error;

pub use tfgraph_core::{geometry, identifier, resource};

pub use diagram::Diagram;
pub use error::TfGraphError;

use log::{debug, info};

use classify::Classifier;
use config::AppConfig;
use connect::ConnectionInferencer;
use layout::LayoutEngine;
use naming::NameResolver;
use resource::RawResource;
use structure::StructureBuilder;

/// Builder that runs the full diagram pipeline.
///
/// Construction validates the configuration; building never fails. A
/// builder is immutable and can be shared between threads.
///
/// # Examples
///
/// ```
/// use tfgraph::{DiagramBuilder, config::AppConfig, resource::RawResource};
///
/// let builder = DiagramBuilder::new(AppConfig::default()).expect("default config is valid");
///
/// let resources = vec![
///     RawResource::new("aws_cloudfront_distribution", "cdn"),
///     RawResource::new("aws_s3_bucket", "assets"),
/// ];
/// let diagram = builder.build(&resources, None);
///
/// assert_eq!(diagram.services().len(), 2);
/// assert_eq!(diagram.connections().len(), 1);
/// ```
#[derive(Debug)]
pub struct DiagramBuilder {
    classifier: Classifier,
    inferencer: ConnectionInferencer,
    structure: StructureBuilder,
    layout: LayoutEngine,
}

impl DiagramBuilder {
    /// Creates a builder from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TfGraphError::Config`] when the rule or relationship table
    /// is invalid.
    pub fn new(config: AppConfig) -> Result<Self, TfGraphError> {
        let classifier = Classifier::new(config.rules(), config.network(), config.naming().clone())?;
        let inferencer = ConnectionInferencer::new(config.relationships())?;
        let structure = StructureBuilder::new(config.network().clone(), config.naming().clone());
        let layout = LayoutEngine::new(config.layout().clone());

        debug!(
            rules = config.rules().len(),
            relationships = config.relationships().len();
            "Diagram builder configured"
        );

        Ok(Self {
            classifier,
            inferencer,
            structure,
            layout,
        })
    }

    /// Runs the pipeline over `resources`.
    ///
    /// `resolver` resolves interpolated names for display; without one,
    /// logical names are used as they are.
    pub fn build(&self, resources: &[RawResource], resolver: Option<&dyn NameResolver>) -> Diagram {
        info!(resources = resources.len(); "Building diagram");

        let (services, ambiguities) = self.classifier.classify(resources, resolver).into_parts();
        let connections = self.inferencer.infer(&services);
        let network = self.structure.build(resources, resolver);
        let geometry = self.layout.layout(&services, &connections, network.as_ref());

        info!(
            services = services.len(),
            connections = connections.len(),
            zones = network.as_ref().map_or(0, |network| network.zones().len());
            "Diagram built"
        );

        Diagram::new(services, connections, network, ambiguities, geometry)
    }
}
