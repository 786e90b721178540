//! Resource manifests.
//!
//! A manifest is the TOML hand-off format between an upstream parser and the
//! pipeline: a list of `[[resource]]` tables plus the `[variables]` and
//! `[locals]` values used to resolve interpolated names.
//!
//! ```toml
//! [variables]
//! project = "shop"
//!
//! [[resource]]
//! type = "aws_vpc"
//! name = "main"
//! file = "network.tf"
//! line = 1
//!
//! [resource.attributes]
//! name = "${var.project}-vpc"
//! ```

use std::collections::HashMap;

use log::debug;
use serde::Deserialize;

use crate::{TfGraphError, naming::VariableResolver, resource::RawResource};

/// Parsed resource manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default, rename = "resource")]
    resources: Vec<RawResource>,
    #[serde(default)]
    variables: HashMap<String, String>,
    #[serde(default)]
    locals: HashMap<String, String>,
}

impl Manifest {
    /// Parses a manifest from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`TfGraphError::Input`] if the text is not valid TOML, does not
    /// match the manifest schema, or declares a resource without a type or
    /// name.
    pub fn from_toml(source: &str) -> Result<Self, TfGraphError> {
        let manifest: Manifest = toml::from_str(source).map_err(|err| {
            TfGraphError::new_input_error(err.message(), err.span(), source)
        })?;

        if let Some((index, _)) = manifest
            .resources
            .iter()
            .enumerate()
            .find(|(_, resource)| resource.resource_type().is_empty() || resource.name().is_empty())
        {
            return Err(TfGraphError::new_input_error(
                format!("resource #{index} needs a non-empty type and name"),
                None,
                source,
            ));
        }

        debug!(
            resources = manifest.resources.len(),
            variables = manifest.variables.len(),
            locals = manifest.locals.len();
            "Manifest loaded"
        );

        Ok(manifest)
    }

    /// Returns resources in declaration order.
    pub fn resources(&self) -> &[RawResource] {
        &self.resources
    }

    /// Returns a resolver over the manifest's variables and locals.
    pub fn resolver(&self) -> VariableResolver {
        VariableResolver::new(self.variables.clone(), self.locals.clone())
    }
}
