//! Node configuration
//!
//! A node is one container in the cluster. Node validation is a pure
//! per-node check: it never looks at other nodes.

use serde::{Deserialize, Serialize};

use crate::types::{NodeRole, PortProtocol};
use crate::validate::{validate_port, validate_role};
use crate::{Error, ErrorList, Result};

/// A single cluster node
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Role of the node; unset defaults to worker
    #[serde(
        default,
        deserialize_with = "crate::types::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<NodeRole>,

    /// Node image reference; empty defaults to the canonical node image
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,

    /// Extra ports forwarded from the host into the node container
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_port_mappings: Vec<PortMapping>,
}

/// Host to container port forward
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    /// Port inside the node container
    pub container_port: i32,

    /// Port on the host
    pub host_port: i32,

    /// Host address to bind (all addresses when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen_address: Option<String>,

    /// Transport protocol
    #[serde(default, skip_serializing_if = "PortProtocol::is_default")]
    pub protocol: PortProtocol,
}

impl PortMapping {
    /// TCP mapping on all host addresses
    pub fn new(container_port: i32, host_port: i32) -> Self {
        Self {
            container_port,
            host_port,
            ..Default::default()
        }
    }
}

impl Node {
    /// Node with an explicit role and everything else unset
    pub fn new(role: NodeRole) -> Self {
        Self {
            role: Some(role),
            ..Default::default()
        }
    }

    /// Set the image and return self for chaining
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Add a port mapping and return self for chaining
    pub fn with_port_mapping(mut self, mapping: PortMapping) -> Self {
        self.extra_port_mappings.push(mapping);
        self
    }

    /// True if the node is a control-plane node
    pub fn is_control_plane(&self) -> bool {
        self.role == Some(NodeRole::ControlPlane)
    }

    /// Fill unset fields from the canonical defaults
    pub fn set_defaults(&mut self) {
        crate::defaults::set_defaults_node(self);
    }

    /// Validate the node, reporting every failure
    ///
    /// Field paths are relative to the node (`role`, `image`,
    /// `extraPortMappings[0].hostPort`).
    pub fn validate(&self) -> Result<()> {
        let mut errors = ErrorList::new();

        match &self.role {
            Some(role) => {
                errors.absorb(validate_role("role", role));
            }
            None => errors.push(Error::unknown_role("role", "")),
        }

        if self.image.is_empty() {
            errors.push(Error::empty_image("image"));
        }

        for (i, mapping) in self.extra_port_mappings.iter().enumerate() {
            errors.absorb(validate_port(
                &format!("extraPortMappings[{}].containerPort", i),
                mapping.container_port,
            ));
            errors.absorb(validate_port(
                &format!("extraPortMappings[{}].hostPort", i),
                mapping.host_port,
            ));
        }

        errors.finish()
    }
}
