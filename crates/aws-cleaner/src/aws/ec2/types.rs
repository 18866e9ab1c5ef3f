//! EC2 and VPC resource descriptors
//!
//! Plain snapshots of what a describe call returned. States are kept as the
//! provider's lowercase strings so the skip rules read like the API docs.

use aws_sdk_ec2::types as sdk;

fn name_tag(tags: &[sdk::Tag]) -> Option<String> {
    tags.iter()
        .find(|t| t.key() == Some("Name"))
        .and_then(|t| t.value())
        .map(str::to_string)
}

// ─── Compute ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub id: String,
    pub name: Option<String>,
    pub state: String,
}

impl Instance {
    /// Already gone or on its way out
    pub fn is_terminating(&self) -> bool {
        matches!(self.state.as_str(), "terminated" | "shutting-down")
    }
}

impl From<&sdk::Instance> for Instance {
    fn from(i: &sdk::Instance) -> Self {
        Self {
            id: i.instance_id().unwrap_or_default().to_string(),
            name: name_tag(i.tags()),
            state: i
                .state()
                .and_then(|s| s.name())
                .map(|n| n.as_str().to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroup {
    pub id: String,
    pub name: String,
    pub vpc_id: Option<String>,
}

impl SecurityGroup {
    /// Every VPC has one and it cannot be deleted
    pub fn is_default(&self) -> bool {
        self.name == "default"
    }
}

impl From<&sdk::SecurityGroup> for SecurityGroup {
    fn from(g: &sdk::SecurityGroup) -> Self {
        Self {
            id: g.group_id().unwrap_or_default().to_string(),
            name: g.group_name().unwrap_or_default().to_string(),
            vpc_id: g.vpc_id().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElasticIp {
    /// Missing for EC2-Classic addresses, which cannot be released by id
    pub allocation_id: Option<String>,
    pub public_ip: Option<String>,
}

impl From<&sdk::Address> for ElasticIp {
    fn from(a: &sdk::Address) -> Self {
        Self {
            allocation_id: a.allocation_id().map(str::to_string),
            public_ip: a.public_ip().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    pub id: String,
    pub name: Option<String>,
    pub state: String,
}

impl Volume {
    pub fn is_attached(&self) -> bool {
        self.state == "in-use"
    }

    pub fn is_deleting(&self) -> bool {
        matches!(self.state.as_str(), "deleting" | "deleted")
    }
}

impl From<&sdk::Volume> for Volume {
    fn from(v: &sdk::Volume) -> Self {
        Self {
            id: v.volume_id().unwrap_or_default().to_string(),
            name: name_tag(v.tags()),
            state: v.state().map(|s| s.as_str().to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub id: String,
    pub description: Option<String>,
}

impl From<&sdk::Snapshot> for Snapshot {
    fn from(s: &sdk::Snapshot) -> Self {
        Self {
            id: s.snapshot_id().unwrap_or_default().to_string(),
            description: s.description().filter(|d| !d.is_empty()).map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub id: String,
    pub name: Option<String>,
    /// EBS snapshots backing the image, deleted after deregistration
    pub snapshot_ids: Vec<String>,
}

impl From<&sdk::Image> for Image {
    fn from(i: &sdk::Image) -> Self {
        Self {
            id: i.image_id().unwrap_or_default().to_string(),
            name: i.name().map(str::to_string),
            snapshot_ids: i
                .block_device_mappings()
                .iter()
                .filter_map(|m| m.ebs())
                .filter_map(|ebs| ebs.snapshot_id())
                .map(str::to_string)
                .collect(),
        }
    }
}

// ─── Network ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vpc {
    pub id: String,
    pub is_default: bool,
}

impl From<&sdk::Vpc> for Vpc {
    fn from(v: &sdk::Vpc) -> Self {
        Self {
            id: v.vpc_id().unwrap_or_default().to_string(),
            is_default: v.is_default().unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NatGateway {
    pub id: String,
    pub vpc_id: Option<String>,
    pub state: String,
}

impl NatGateway {
    pub fn is_deleting(&self) -> bool {
        matches!(self.state.as_str(), "deleting" | "deleted")
    }
}

impl From<&sdk::NatGateway> for NatGateway {
    fn from(n: &sdk::NatGateway) -> Self {
        Self {
            id: n.nat_gateway_id().unwrap_or_default().to_string(),
            vpc_id: n.vpc_id().map(str::to_string),
            state: n.state().map(|s| s.as_str().to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    pub id: String,
    pub status: String,
    pub description: Option<String>,
}

impl NetworkInterface {
    /// Attached or mid-transition; the owner has to let go first
    pub fn is_busy(&self) -> bool {
        matches!(self.status.as_str(), "in-use" | "detaching" | "deleting")
    }
}

impl From<&sdk::NetworkInterface> for NetworkInterface {
    fn from(n: &sdk::NetworkInterface) -> Self {
        Self {
            id: n.network_interface_id().unwrap_or_default().to_string(),
            status: n.status().map(|s| s.as_str().to_string()).unwrap_or_default(),
            description: n.description().filter(|d| !d.is_empty()).map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternetGateway {
    pub id: String,
    pub attached_vpc_ids: Vec<String>,
}

impl From<&sdk::InternetGateway> for InternetGateway {
    fn from(g: &sdk::InternetGateway) -> Self {
        Self {
            id: g.internet_gateway_id().unwrap_or_default().to_string(),
            attached_vpc_ids: g
                .attachments()
                .iter()
                .filter_map(|a| a.vpc_id())
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpnConnection {
    pub id: String,
    pub state: String,
}

impl VpnConnection {
    pub fn is_deleting(&self) -> bool {
        matches!(self.state.as_str(), "deleting" | "deleted")
    }
}

impl From<&sdk::VpnConnection> for VpnConnection {
    fn from(c: &sdk::VpnConnection) -> Self {
        Self {
            id: c.vpn_connection_id().unwrap_or_default().to_string(),
            state: c.state().map(|s| s.as_str().to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpnAttachment {
    pub vpc_id: String,
    pub state: String,
}

impl VpnAttachment {
    pub fn is_detached(&self) -> bool {
        matches!(self.state.as_str(), "detached" | "detaching")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpnGateway {
    pub id: String,
    pub state: String,
    pub attachments: Vec<VpnAttachment>,
}

impl VpnGateway {
    pub fn is_deleting(&self) -> bool {
        matches!(self.state.as_str(), "deleting" | "deleted")
    }
}

impl From<&sdk::VpnGateway> for VpnGateway {
    fn from(g: &sdk::VpnGateway) -> Self {
        Self {
            id: g.vpn_gateway_id().unwrap_or_default().to_string(),
            state: g.state().map(|s| s.as_str().to_string()).unwrap_or_default(),
            attachments: g
                .vpc_attachments()
                .iter()
                .filter_map(|a| {
                    Some(VpnAttachment {
                        vpc_id: a.vpc_id()?.to_string(),
                        state: a.state().map(|s| s.as_str().to_string()).unwrap_or_default(),
                    })
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitGatewayAttachment {
    pub id: String,
    pub state: String,
    /// `vpc`, `vpn`, `peering`, ...; only VPC attachments are deleted here
    pub resource_type: String,
}

impl TransitGatewayAttachment {
    pub fn is_deleting(&self) -> bool {
        matches!(self.state.as_str(), "deleting" | "deleted")
    }
}

impl From<&sdk::TransitGatewayAttachment> for TransitGatewayAttachment {
    fn from(a: &sdk::TransitGatewayAttachment) -> Self {
        Self {
            id: a.transit_gateway_attachment_id().unwrap_or_default().to_string(),
            state: a.state().map(|s| s.as_str().to_string()).unwrap_or_default(),
            resource_type: a
                .resource_type()
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitGateway {
    pub id: String,
    pub state: String,
}

impl TransitGateway {
    pub fn is_deleting(&self) -> bool {
        matches!(self.state.as_str(), "deleting" | "deleted")
    }
}

impl From<&sdk::TransitGateway> for TransitGateway {
    fn from(g: &sdk::TransitGateway) -> Self {
        Self {
            id: g.transit_gateway_id().unwrap_or_default().to_string(),
            state: g.state().map(|s| s.as_str().to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    pub id: String,
    pub is_main: bool,
    /// Association ids for explicit subnet associations
    pub subnet_association_ids: Vec<String>,
}

impl From<&sdk::RouteTable> for RouteTable {
    fn from(t: &sdk::RouteTable) -> Self {
        let associations = t.associations();
        Self {
            id: t.route_table_id().unwrap_or_default().to_string(),
            is_main: associations.iter().any(|a| a.main().unwrap_or(false)),
            subnet_association_ids: associations
                .iter()
                .filter(|a| a.subnet_id().is_some())
                .filter_map(|a| a.route_table_association_id())
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnet {
    pub id: String,
    pub cidr_block: Option<String>,
}

impl From<&sdk::Subnet> for Subnet {
    fn from(s: &sdk::Subnet) -> Self {
        Self {
            id: s.subnet_id().unwrap_or_default().to_string(),
            cidr_block: s.cidr_block().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkAcl {
    pub id: String,
    pub is_default: bool,
}

impl From<&sdk::NetworkAcl> for NetworkAcl {
    fn from(a: &sdk::NetworkAcl) -> Self {
        Self {
            id: a.network_acl_id().unwrap_or_default().to_string(),
            is_default: a.is_default().unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpcEndpoint {
    pub id: String,
    pub service_name: Option<String>,
    pub state: String,
}

impl VpcEndpoint {
    pub fn is_deleting(&self) -> bool {
        matches!(self.state.as_str(), "deleting" | "deleted")
    }
}

impl From<&sdk::VpcEndpoint> for VpcEndpoint {
    fn from(e: &sdk::VpcEndpoint) -> Self {
        Self {
            id: e.vpc_endpoint_id().unwrap_or_default().to_string(),
            service_name: e.service_name().map(str::to_string),
            state: e
                .state()
                .map(|s| s.as_str().to_ascii_lowercase())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeeringConnection {
    pub id: String,
    pub status: String,
}

impl PeeringConnection {
    pub fn is_closed(&self) -> bool {
        matches!(
            self.status.as_str(),
            "deleted" | "rejected" | "failed" | "expired" | "deleting"
        )
    }
}

impl From<&sdk::VpcPeeringConnection> for PeeringConnection {
    fn from(p: &sdk::VpcPeeringConnection) -> Self {
        Self {
            id: p.vpc_peering_connection_id().unwrap_or_default().to_string(),
            status: p
                .status()
                .and_then(|s| s.code())
                .map(|c| c.as_str().to_string())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_from_sdk_reads_name_tag_and_state() {
        let sdk_instance = sdk::Instance::builder()
            .instance_id("i-0abc")
            .state(
                sdk::InstanceState::builder()
                    .name(sdk::InstanceStateName::ShuttingDown)
                    .build(),
            )
            .tags(sdk::Tag::builder().key("Name").value("web").build())
            .build();

        let instance = Instance::from(&sdk_instance);
        assert_eq!(instance.id, "i-0abc");
        assert_eq!(instance.name.as_deref(), Some("web"));
        assert_eq!(instance.state, "shutting-down");
        assert!(instance.is_terminating());
    }

    #[test]
    fn route_table_main_and_subnet_associations() {
        let table = sdk::RouteTable::builder()
            .route_table_id("rtb-1")
            .associations(
                sdk::RouteTableAssociation::builder()
                    .main(true)
                    .route_table_association_id("rtbassoc-main")
                    .build(),
            )
            .associations(
                sdk::RouteTableAssociation::builder()
                    .subnet_id("subnet-1")
                    .route_table_association_id("rtbassoc-1")
                    .build(),
            )
            .build();

        let table = RouteTable::from(&table);
        assert!(table.is_main);
        assert_eq!(table.subnet_association_ids, vec!["rtbassoc-1"]);
    }

    #[test]
    fn image_collects_backing_snapshots() {
        let image = sdk::Image::builder()
            .image_id("ami-1")
            .block_device_mappings(
                sdk::BlockDeviceMapping::builder()
                    .ebs(sdk::EbsBlockDevice::builder().snapshot_id("snap-1").build())
                    .build(),
            )
            .block_device_mappings(
                sdk::BlockDeviceMapping::builder()
                    .virtual_name("ephemeral0")
                    .build(),
            )
            .build();

        assert_eq!(Image::from(&image).snapshot_ids, vec!["snap-1"]);
    }

    #[test]
    fn peering_closed_states() {
        for status in ["deleted", "rejected", "failed", "expired"] {
            let p = PeeringConnection {
                id: "pcx-1".into(),
                status: status.into(),
            };
            assert!(p.is_closed(), "{status} should be closed");
        }
        let active = PeeringConnection {
            id: "pcx-1".into(),
            status: "active".into(),
        };
        assert!(!active.is_closed());
    }
}
