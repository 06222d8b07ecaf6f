//! Cluster configuration
//!
//! The cluster owns its nodes and the networking block. Cluster validation
//! runs every rule in a fixed order and reports all failures together:
//!
//! 1. subnet syntax, entry by entry
//! 2. IP family and API server port
//! 3. subnet count per list for the declared family
//! 4. address families within each list
//! 5. pairwise family agreement between pod and service lists
//! 6. per-node failures, in node order
//! 7. control-plane presence

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::node::Node;
use crate::types::{AddressFamily, IpFamily};
use crate::validate::{validate_cidr, validate_ip_family, validate_port};
use crate::{Error, ErrorList, Result};

const IP_FAMILY_FIELD: &str = "networking.ipFamily";
const API_SERVER_PORT_FIELD: &str = "networking.apiServerPort";
const POD_SUBNET_FIELD: &str = "networking.podSubnet";
const SERVICE_SUBNET_FIELD: &str = "networking.serviceSubnet";

/// Root of the configuration document
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Pod and service networking
    #[serde(default)]
    pub networking: Networking,

    /// Nodes in provisioning order
    ///
    /// `None` means unset and is defaulted to a single control-plane node.
    /// `Some(vec![])` is an explicit empty list and fails validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<Node>>,
}

/// Cluster networking
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Networking {
    /// Single-stack or dual-stack mode
    #[serde(
        default,
        deserialize_with = "crate::types::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub ip_family: Option<IpFamily>,

    /// Pod ranges; accepts a comma-joined string or a list
    #[serde(default, with = "subnet_list", skip_serializing_if = "Vec::is_empty")]
    pub pod_subnet: Vec<String>,

    /// Service ranges; accepts a comma-joined string or a list
    #[serde(default, with = "subnet_list", skip_serializing_if = "Vec::is_empty")]
    pub service_subnet: Vec<String>,

    /// API server port on the host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_server_port: Option<i32>,
}

/// Split a comma-joined subnet string into entries
///
/// Entries are trimmed. An empty string yields an empty list.
pub fn split_subnets(joined: &str) -> Vec<String> {
    if joined.trim().is_empty() {
        return Vec::new();
    }
    joined.split(',').map(|s| s.trim().to_string()).collect()
}

impl Cluster {
    /// Nodes in provisioning order (empty when unset)
    pub fn nodes(&self) -> &[Node] {
        self.nodes.as_deref().unwrap_or_default()
    }

    /// Mutable node list, created empty if unset
    pub fn nodes_mut(&mut self) -> &mut Vec<Node> {
        self.nodes.get_or_insert_with(Vec::new)
    }

    /// Fill unset fields from the canonical defaults
    pub fn set_defaults(&mut self) {
        crate::defaults::set_defaults_cluster(self);
    }

    /// Validate the whole cluster, reporting every failure
    ///
    /// Never mutates the cluster.
    pub fn validate(&self) -> Result<()> {
        let mut errors = ErrorList::new();

        self.networking.collect_errors(&mut errors);

        for (i, node) in self.nodes().iter().enumerate() {
            if let Err(err) = node.validate() {
                errors.push(err.with_field_prefix(&format!("nodes[{}]", i)));
            }
        }

        if !self.nodes().iter().any(Node::is_control_plane) {
            errors.push(Error::MissingControlPlane);
        }

        if errors.is_empty() {
            debug!(nodes = self.nodes().len(), "cluster configuration is valid");
        } else {
            debug!(errors = errors.len(), "cluster configuration is invalid");
        }
        errors.finish()
    }
}

impl Networking {
    fn collect_errors(&self, errors: &mut ErrorList) {
        let pods = parse_subnets(POD_SUBNET_FIELD, &self.pod_subnet, errors);
        let services = parse_subnets(SERVICE_SUBNET_FIELD, &self.service_subnet, errors);

        let unset = IpFamily::Unrecognized(String::new());
        let family = self.ip_family.as_ref().unwrap_or(&unset);
        errors.absorb(validate_ip_family(IP_FAMILY_FIELD, family));
        errors.absorb(validate_port(
            API_SERVER_PORT_FIELD,
            self.api_server_port.unwrap_or(0),
        ));

        // Without a known family there is no expected shape to check against.
        let Some(expected) = family.subnet_count() else {
            return;
        };

        let pods_fit = check_count(POD_SUBNET_FIELD, &self.pod_subnet, family, expected, errors);
        let services_fit = check_count(
            SERVICE_SUBNET_FIELD,
            &self.service_subnet,
            family,
            expected,
            errors,
        );

        if let (true, Some(pods)) = (pods_fit, &pods) {
            check_list_families(POD_SUBNET_FIELD, pods, family, errors);
        }
        if let (true, Some(services)) = (services_fit, &services) {
            check_list_families(SERVICE_SUBNET_FIELD, services, family, errors);
        }

        if let (true, true, Some(pods), Some(services)) =
            (pods_fit, services_fit, &pods, &services)
        {
            for (i, (pod, service)) in pods.iter().zip(services.iter()).enumerate() {
                if pod != service {
                    errors.push(Error::subnet_family_mismatch(
                        format!("{}[{}]", SERVICE_SUBNET_FIELD, i),
                        format!(
                            "{} service subnet does not match {} pod subnet at the same index",
                            service, pod
                        ),
                    ));
                }
            }
        }
    }
}

/// Parse every entry, recording each failure
///
/// Returns the families only when every entry parsed.
fn parse_subnets(
    field: &str,
    subnets: &[String],
    errors: &mut ErrorList,
) -> Option<Vec<AddressFamily>> {
    let mut families = Vec::with_capacity(subnets.len());
    let mut all_parsed = true;
    for (i, subnet) in subnets.iter().enumerate() {
        match errors.absorb(validate_cidr(&format!("{}[{}]", field, i), subnet)) {
            Some((_, family)) => families.push(family),
            None => all_parsed = false,
        }
    }
    all_parsed.then_some(families)
}

fn check_count(
    field: &str,
    subnets: &[String],
    family: &IpFamily,
    expected: usize,
    errors: &mut ErrorList,
) -> bool {
    if subnets.len() == expected {
        return true;
    }
    errors.push(Error::subnet_count_mismatch(
        field,
        family.as_str(),
        expected,
        subnets.len(),
    ));
    false
}

/// Single-stack entries must match the family; dual-stack needs one of each
fn check_list_families(
    field: &str,
    families: &[AddressFamily],
    family: &IpFamily,
    errors: &mut ErrorList,
) {
    match family.single_stack() {
        Some(want) => {
            if let Some((i, got)) = families.iter().enumerate().find(|(_, f)| **f != want) {
                errors.push(Error::subnet_family_mismatch(
                    format!("{}[{}]", field, i),
                    format!("{} subnet in {} cluster", got, family),
                ));
            }
        }
        None => {
            let has_v4 = families.contains(&AddressFamily::V4);
            let has_v6 = families.contains(&AddressFamily::V6);
            if !(has_v4 && has_v6) {
                errors.push(Error::subnet_family_mismatch(
                    field,
                    "dual-stack networking requires one IPv4 and one IPv6 subnet",
                ));
            }
        }
    }
}

/// Serde adapter for subnet lists written as "a,b" or as a sequence
mod subnet_list {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Joined(String),
        List(Vec<String>),
    }

    pub fn serialize<S: Serializer>(subnets: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        subnets.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<String>, D::Error> {
        Ok(match Option::<Repr>::deserialize(deserializer)? {
            Some(Repr::Joined(joined)) => super::split_subnets(&joined),
            Some(Repr::List(list)) => list.iter().map(|s| s.trim().to_string()).collect(),
            None => Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeRole;
    use crate::ErrorKind;

    fn defaulted() -> Cluster {
        let mut cluster = Cluster::default();
        cluster.set_defaults();
        cluster
    }

    fn defaulted_node(role: NodeRole) -> Node {
        let mut node = Node::new(role).with_image("myImage:latest");
        node.set_defaults();
        node
    }

    fn dual_stack(pods: &str, services: &str) -> Cluster {
        let mut cluster = defaulted();
        cluster.networking.pod_subnet = split_subnets(pods);
        cluster.networking.service_subnet = split_subnets(services);
        cluster.networking.ip_family = Some(IpFamily::DualStack);
        cluster
    }

    fn kinds(cluster: &Cluster) -> Vec<ErrorKind> {
        cluster.validate().err().map(|e| e.kinds()).unwrap_or_default()
    }

    // =========================================================================
    // Defaulted Cluster Stories
    // =========================================================================

    #[test]
    fn story_defaulted_zero_value_cluster_is_valid() {
        assert!(defaulted().validate().is_ok());
    }

    #[test]
    fn story_multiple_valid_nodes_are_valid() {
        let mut cluster = defaulted();
        cluster.nodes_mut().extend([
            defaulted_node(NodeRole::Worker),
            defaulted_node(NodeRole::Worker),
        ]);
        assert!(cluster.validate().is_ok());
    }

    #[test]
    fn story_defaulted_ipv6_cluster_is_valid() {
        let mut cluster = Cluster::default();
        cluster.networking.ip_family = Some(IpFamily::Ipv6);
        cluster.set_defaults();
        assert!(cluster.validate().is_ok());
    }

    #[test]
    fn story_defaulted_dual_stack_cluster_is_valid() {
        let mut cluster = Cluster::default();
        cluster.networking.ip_family = Some(IpFamily::DualStack);
        cluster.set_defaults();
        assert!(cluster.validate().is_ok());
    }

    // =========================================================================
    // Single Field Failure Stories
    // =========================================================================

    #[test]
    fn story_bogus_pod_subnet_is_one_error() {
        let mut cluster = defaulted();
        cluster.networking.pod_subnet = split_subnets("aa");

        let err = cluster.validate().unwrap_err();
        assert_eq!(err.kinds(), vec![ErrorKind::InvalidSubnet]);
        assert_eq!(err.errors()[0].field(), Some("networking.podSubnet[0]"));
    }

    #[test]
    fn story_bogus_service_subnet_is_one_error() {
        let mut cluster = defaulted();
        cluster.networking.service_subnet = split_subnets("aa");
        assert_eq!(kinds(&cluster), vec![ErrorKind::InvalidSubnet]);
    }

    #[test]
    fn story_bogus_api_server_port_is_one_error() {
        let mut cluster = defaulted();
        cluster.networking.api_server_port = Some(9_999_999);

        let err = cluster.validate().unwrap_err();
        assert_eq!(
            err.errors(),
            &[Error::port_out_of_range(API_SERVER_PORT_FIELD, 9_999_999)]
        );
    }

    #[test]
    fn story_unknown_ip_family_is_one_error() {
        let mut cluster = defaulted();
        cluster.networking.ip_family = Some(IpFamily::from("IPv5"));
        assert_eq!(kinds(&cluster), vec![ErrorKind::UnknownIpFamily]);
    }

    // =========================================================================
    // Subnet Shape Stories
    // =========================================================================

    #[test]
    fn story_two_pod_subnets_in_single_stack_is_one_error() {
        let mut cluster = defaulted();
        cluster.networking.pod_subnet = split_subnets("192.168.0.2/24,2.2.2.0/24");

        let err = cluster.validate().unwrap_err();
        assert_eq!(
            err.errors(),
            &[Error::subnet_count_mismatch(POD_SUBNET_FIELD, "ipv4", 1, 2)]
        );
    }

    #[test]
    fn story_valid_dual_stack_is_valid() {
        let cluster = dual_stack("192.168.0.2/24,fd00:1::/25", "192.168.0.2/24,fd00:1::/25");
        assert!(cluster.validate().is_ok());
    }

    #[test]
    fn story_dual_stack_with_short_service_list_is_one_error() {
        let cluster = dual_stack("192.168.0.2/24,fd00:1::/25", "192.168.0.2/24");

        let err = cluster.validate().unwrap_err();
        assert_eq!(
            err.errors(),
            &[Error::subnet_count_mismatch(SERVICE_SUBNET_FIELD, "dual", 2, 1)]
        );
    }

    #[test]
    fn story_dual_stack_with_short_pod_list_is_one_error() {
        let cluster = dual_stack("fd00:1::/25", "fd00:1::/25,192.168.0.2/24");
        assert_eq!(kinds(&cluster), vec![ErrorKind::SubnetCountMismatch]);
    }

    #[test]
    fn story_dual_stack_with_ipv4_only_lists_is_two_errors() {
        let cluster = dual_stack("192.168.0.2/24,2.2.2.0/25", "192.168.0.2/24,2.2.2.0/25");
        assert_eq!(
            kinds(&cluster),
            vec![
                ErrorKind::SubnetFamilyMismatch,
                ErrorKind::SubnetFamilyMismatch
            ]
        );
    }

    #[test]
    fn story_dual_stack_lists_in_opposite_order_disagree_at_each_index() {
        let cluster = dual_stack(
            "10.244.0.0/16,fd00:10:244::/56",
            "fd00:10:96::/112,10.96.0.0/16",
        );

        let err = cluster.validate().unwrap_err();
        let fields: Vec<_> = err.errors().iter().filter_map(Error::field).collect();
        assert_eq!(
            fields,
            vec!["networking.serviceSubnet[0]", "networking.serviceSubnet[1]"]
        );
    }

    #[test]
    fn story_single_stack_subnet_of_wrong_family_is_reported() {
        let mut cluster = defaulted();
        cluster.networking.pod_subnet = split_subnets("fd00:10:244::/56");
        cluster.networking.service_subnet = split_subnets("fd00:10:96::/112");

        // One per list for the wrong family; the lists agree with each other.
        assert_eq!(
            kinds(&cluster),
            vec![
                ErrorKind::SubnetFamilyMismatch,
                ErrorKind::SubnetFamilyMismatch
            ]
        );
    }

    #[test]
    fn story_single_stack_pod_of_wrong_family_is_reported_per_list_and_per_pair() {
        let mut cluster = defaulted();
        cluster.networking.pod_subnet = split_subnets("fd00:10:244::/56");

        // The IPv6 pod list breaks the IPv4 family and disagrees with the
        // IPv4 service list at index 0.
        let err = cluster.validate().unwrap_err();
        let fields: Vec<_> = err.errors().iter().filter_map(Error::field).collect();
        assert_eq!(
            err.kinds(),
            vec![
                ErrorKind::SubnetFamilyMismatch,
                ErrorKind::SubnetFamilyMismatch
            ]
        );
        assert_eq!(
            fields,
            vec!["networking.podSubnet[0]", "networking.serviceSubnet[0]"]
        );
    }

    #[test]
    fn story_count_mismatch_skips_pairwise_check() {
        let mut cluster = defaulted();
        cluster.networking.pod_subnet = split_subnets("10.244.0.0/16,10.245.0.0/16");
        cluster.networking.service_subnet = split_subnets("fd00:10:96::/112");

        // Pod list fails on count; service list fails on family; no pair check.
        assert_eq!(
            kinds(&cluster),
            vec![
                ErrorKind::SubnetCountMismatch,
                ErrorKind::SubnetFamilyMismatch
            ]
        );
    }

    #[test]
    fn story_every_bad_entry_is_reported() {
        let cluster = dual_stack("aa,bb", "cc,10.96.0.0/16");

        // Three syntax failures; no family checks on partially parsed lists.
        assert_eq!(
            kinds(&cluster),
            vec![
                ErrorKind::InvalidSubnet,
                ErrorKind::InvalidSubnet,
                ErrorKind::InvalidSubnet
            ]
        );
    }

    // =========================================================================
    // Node Topology Stories
    // =========================================================================

    #[test]
    fn story_empty_node_list_is_missing_control_plane() {
        let mut cluster = defaulted();
        cluster.nodes = Some(Vec::new());

        let err = cluster.validate().unwrap_err();
        assert_eq!(err.errors(), &[Error::MissingControlPlane]);
    }

    #[test]
    fn story_bogus_node_role_is_one_error() {
        let mut cluster = Cluster::default();
        cluster.nodes = Some(vec![Node::new(NodeRole::from("bogus")), Node::default()]);
        cluster.set_defaults();

        let err = cluster.validate().unwrap_err();
        assert_eq!(err.errors(), &[Error::unknown_role("nodes[0].role", "bogus")]);
    }

    #[test]
    fn story_workers_only_is_missing_control_plane() {
        let mut cluster = defaulted();
        cluster.nodes = Some(vec![defaulted_node(NodeRole::Worker)]);
        assert_eq!(kinds(&cluster), vec![ErrorKind::MissingControlPlane]);
    }

    #[test]
    fn story_node_failures_fold_in_node_order_before_control_plane_check() {
        let mut cluster = defaulted();
        let mut broken = defaulted_node(NodeRole::Worker);
        broken.image = String::new();
        cluster.nodes = Some(vec![defaulted_node(NodeRole::Worker), broken]);
        cluster.networking.api_server_port = Some(0);

        let err = cluster.validate().unwrap_err();
        assert_eq!(
            err.kinds(),
            vec![
                ErrorKind::PortOutOfRange,
                ErrorKind::EmptyImage,
                ErrorKind::MissingControlPlane
            ]
        );
        assert_eq!(err.errors()[1].field(), Some("nodes[1].image"));
    }

    #[test]
    fn story_undefaulted_cluster_reports_every_unset_field() {
        let err = Cluster::default().validate().unwrap_err();
        assert_eq!(
            err.kinds(),
            vec![
                ErrorKind::UnknownIpFamily,
                ErrorKind::PortOutOfRange,
                ErrorKind::MissingControlPlane
            ]
        );
    }

    #[test]
    fn story_validation_does_not_mutate() {
        let mut cluster = defaulted();
        cluster.networking.pod_subnet = split_subnets("aa");
        let before = cluster.clone();
        let _ = cluster.validate();
        assert_eq!(cluster, before);
    }

    // =========================================================================
    // Document Shape Stories
    // =========================================================================

    #[test]
    fn split_subnets_trims_and_handles_empty() {
        assert!(split_subnets("").is_empty());
        assert_eq!(
            split_subnets("10.0.0.0/8, fd00::/64"),
            vec!["10.0.0.0/8", "fd00::/64"]
        );
    }

    #[test]
    fn subnets_parse_from_joined_string_or_list() {
        let yaml = r#"
networking:
  ipFamily: DualStack
  podSubnet: "10.244.0.0/16,fd00:10:244::/56"
  serviceSubnet:
    - 10.96.0.0/16
    - fd00:10:96::/112
"#;
        let cluster: Cluster = serde_yaml::from_str(yaml).expect("cluster YAML should parse");
        assert_eq!(cluster.networking.ip_family, Some(IpFamily::DualStack));
        assert_eq!(cluster.networking.pod_subnet.len(), 2);
        assert_eq!(cluster.networking.service_subnet.len(), 2);
        assert!(cluster.nodes.is_none());
    }

    #[test]
    fn story_empty_ip_family_in_document_is_defaulted() {
        let mut cluster: Cluster =
            serde_yaml::from_str("networking:\n  ipFamily: \"\"\n").expect("should parse");
        assert_eq!(cluster.networking.ip_family, None);

        cluster.set_defaults();
        assert_eq!(cluster.networking.ip_family, Some(IpFamily::Ipv4));
        assert!(cluster.validate().is_ok());
    }

    #[test]
    fn story_empty_role_in_document_is_defaulted() {
        let mut cluster: Cluster =
            serde_yaml::from_str("nodes:\n  - role: \"\"\n").expect("should parse");
        assert_eq!(cluster.nodes()[0].role, None);

        // The only node has no role, so it becomes the control plane.
        cluster.set_defaults();
        assert_eq!(cluster.nodes()[0].role, Some(NodeRole::ControlPlane));
        assert!(cluster.validate().is_ok());
    }

    #[test]
    fn story_empty_values_in_document_render_as_unset() {
        let cluster: Cluster = serde_yaml::from_str(
            "networking:\n  ipFamily: \"\"\nnodes:\n  - role: \"\"\n    image: \"\"\n",
        )
        .expect("should parse");
        assert_eq!(cluster.networking.ip_family, None);
        assert_eq!(cluster.nodes(), &[Node::default()]);
    }

    #[test]
    fn explicit_empty_node_list_survives_parsing() {
        let cluster: Cluster = serde_yaml::from_str("nodes: []").expect("should parse");
        assert_eq!(cluster.nodes, Some(Vec::new()));
    }
}
