//! VPC networking cleanup
//!
//! Networking resources only delete once nothing references them, so the
//! sweep walks [`VPC_CLEANUP_ORDER`] one step at a time. Per-VPC steps loop
//! over every VPC in the region inside the step, which keeps the call order
//! identical to the step order however many VPCs there are.

use super::{
    Action, CleanupOptions, CleanupReport, CleanupResult, attempt, completed, listed,
    listed_if_available, settle, skip,
};
use crate::aws::VpcApi;
use crate::aws::ec2::types::{RouteTable, Vpc};
use aws_cleaner_common::ResourceKind;
use std::collections::HashMap;
use tracing::{error, info, warn};

/// One step of the VPC sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VpcStep {
    NatGateways,
    NetworkInterfaces,
    InternetGateways,
    VpnConnections,
    VpnGateways,
    TransitGatewayAttachments,
    TransitGateways,
    RouteTableAssociations,
    RouteTables,
    Subnets,
    SecurityGroups,
    NetworkAcls,
    VpcEndpoints,
    PeeringConnections,
    Vpcs,
}

/// Dependency order of the sweep; every resource is gone before the thing it
/// points at.
pub const VPC_CLEANUP_ORDER: [VpcStep; 15] = [
    VpcStep::NatGateways,
    VpcStep::NetworkInterfaces,
    VpcStep::InternetGateways,
    VpcStep::VpnConnections,
    VpcStep::VpnGateways,
    VpcStep::TransitGatewayAttachments,
    VpcStep::TransitGateways,
    VpcStep::RouteTableAssociations,
    VpcStep::RouteTables,
    VpcStep::Subnets,
    VpcStep::SecurityGroups,
    VpcStep::NetworkAcls,
    VpcStep::VpcEndpoints,
    VpcStep::PeeringConnections,
    VpcStep::Vpcs,
];

impl VpcStep {
    pub fn label(self) -> &'static str {
        match self {
            VpcStep::NatGateways => "NAT Gateways",
            VpcStep::NetworkInterfaces => "network interfaces",
            VpcStep::InternetGateways => "Internet Gateways",
            VpcStep::VpnConnections => "VPN connections",
            VpcStep::VpnGateways => "VPN gateways",
            VpcStep::TransitGatewayAttachments => "Transit Gateway VPC attachments",
            VpcStep::TransitGateways => "Transit Gateways",
            VpcStep::RouteTableAssociations => "route table associations",
            VpcStep::RouteTables => "route tables",
            VpcStep::Subnets => "subnets",
            VpcStep::SecurityGroups => "security groups",
            VpcStep::NetworkAcls => "network ACLs",
            VpcStep::VpcEndpoints => "VPC endpoints",
            VpcStep::PeeringConnections => "VPC peering connections",
            VpcStep::Vpcs => "VPCs",
        }
    }

    /// Steps that list their resources one VPC at a time
    pub fn is_per_vpc(self) -> bool {
        matches!(
            self,
            VpcStep::RouteTableAssociations
                | VpcStep::RouteTables
                | VpcStep::Subnets
                | VpcStep::SecurityGroups
                | VpcStep::NetworkAcls
                | VpcStep::VpcEndpoints
        )
    }

    fn needs_vpcs(self) -> bool {
        self.is_per_vpc() || self == VpcStep::Vpcs
    }
}

pub async fn clean<A: VpcApi>(api: &A, region: &str, opts: &CleanupOptions) -> CleanupReport {
    let mut sweep = Sweep {
        api,
        region,
        opts,
        report: CleanupReport::default(),
        route_tables: HashMap::new(),
    };

    // Listed once; per-VPC steps and the final delete share it
    let vpcs = match api.list_vpcs().await {
        Ok(vpcs) => {
            if vpcs.is_empty() {
                info!("No VPCs found in {}", region);
            }
            sweep.report.found += vpcs.len();
            Some(vpcs)
        }
        Err(e) => {
            error!("Error listing VPCs in {}: {}", region, e);
            sweep.report.failed += 1;
            None
        }
    };

    for step in VPC_CLEANUP_ORDER {
        match (&vpcs, step.needs_vpcs()) {
            (None, true) => {
                warn!(
                    "Skipping {} in {} as the VPC listing failed",
                    step.label(),
                    region
                );
            }
            (vpcs, _) => {
                info!("Checking for {} in {}...", step.label(), region);
                sweep.run(step, vpcs.as_deref().unwrap_or_default()).await;
            }
        }
    }

    completed(ResourceKind::Vpc, Some(region));
    sweep.report
}

struct Sweep<'a, A> {
    api: &'a A,
    region: &'a str,
    opts: &'a CleanupOptions,
    report: CleanupReport,
    /// Non-main tables per VPC, listed in the association step and reused
    route_tables: HashMap<String, Vec<RouteTable>>,
}

impl<A: VpcApi> Sweep<'_, A> {
    async fn run(&mut self, step: VpcStep, vpcs: &[Vpc]) {
        match step {
            VpcStep::NatGateways => self.nat_gateways().await,
            VpcStep::NetworkInterfaces => self.network_interfaces().await,
            VpcStep::InternetGateways => self.internet_gateways().await,
            VpcStep::VpnConnections => self.vpn_connections().await,
            VpcStep::VpnGateways => self.vpn_gateways().await,
            VpcStep::TransitGatewayAttachments => self.transit_gateway_attachments().await,
            VpcStep::TransitGateways => self.transit_gateways().await,
            VpcStep::RouteTableAssociations => {
                for vpc in vpcs {
                    self.route_table_associations(&vpc.id).await;
                }
            }
            VpcStep::RouteTables => {
                for vpc in vpcs {
                    self.route_tables(&vpc.id).await;
                }
            }
            VpcStep::Subnets => {
                for vpc in vpcs {
                    self.subnets(&vpc.id).await;
                }
            }
            VpcStep::SecurityGroups => {
                for vpc in vpcs {
                    self.security_groups(&vpc.id).await;
                }
            }
            VpcStep::NetworkAcls => {
                for vpc in vpcs {
                    self.network_acls(&vpc.id).await;
                }
            }
            VpcStep::VpcEndpoints => {
                for vpc in vpcs {
                    self.vpc_endpoints(&vpc.id).await;
                }
            }
            VpcStep::PeeringConnections => self.peering_connections().await,
            VpcStep::Vpcs => self.vpcs(vpcs).await,
        }
    }

    async fn nat_gateways(&mut self) {
        let api = self.api;
        let gateways = listed(
            &mut self.report,
            "NAT Gateways",
            self.region,
            api.list_nat_gateways().await,
        );
        for nat in gateways {
            let target = format!("NAT Gateway {}", nat.id);
            if nat.is_deleting() {
                skip(&mut self.report, &target, &format!("in state {}", nat.state));
                continue;
            }
            attempt(&mut self.report, self.opts, Action::InitiateDelete, &target, || {
                api.delete_nat_gateway(&nat.id)
            })
            .await;
        }
    }

    async fn network_interfaces(&mut self) {
        let api = self.api;
        let interfaces = listed(
            &mut self.report,
            "network interfaces",
            self.region,
            api.list_network_interfaces().await,
        );
        for eni in interfaces {
            let target = format!("network interface {}", eni.id);
            if eni.is_busy() {
                skip(&mut self.report, &target, &format!("in state {}", eni.status));
                continue;
            }
            attempt(&mut self.report, self.opts, Action::Delete, &target, || {
                api.delete_network_interface(&eni.id)
            })
            .await;
        }
    }

    async fn internet_gateways(&mut self) {
        let api = self.api;
        let gateways = listed(
            &mut self.report,
            "Internet Gateways",
            self.region,
            api.list_internet_gateways().await,
        );
        for igw in gateways {
            for vpc_id in &igw.attached_vpc_ids {
                attempt(
                    &mut self.report,
                    self.opts,
                    Action::Detach,
                    &format!("Internet Gateway {} from VPC {}", igw.id, vpc_id),
                    || api.detach_internet_gateway(&igw.id, vpc_id),
                )
                .await;
            }
            attempt(
                &mut self.report,
                self.opts,
                Action::Delete,
                &format!("Internet Gateway {}", igw.id),
                || api.delete_internet_gateway(&igw.id),
            )
            .await;
        }
    }

    async fn vpn_connections(&mut self) {
        let api = self.api;
        let connections = listed(
            &mut self.report,
            "VPN connections",
            self.region,
            api.list_vpn_connections().await,
        );
        for vpn in connections {
            let target = format!("VPN connection {}", vpn.id);
            if vpn.is_deleting() {
                skip(&mut self.report, &target, &format!("in state {}", vpn.state));
                continue;
            }
            attempt(&mut self.report, self.opts, Action::Delete, &target, || {
                api.delete_vpn_connection(&vpn.id)
            })
            .await;
        }
    }

    async fn vpn_gateways(&mut self) {
        let api = self.api;
        let gateways = listed(
            &mut self.report,
            "VPN gateways",
            self.region,
            api.list_vpn_gateways().await,
        );
        for vgw in gateways {
            let target = format!("VPN gateway {}", vgw.id);
            if vgw.is_deleting() {
                skip(&mut self.report, &target, &format!("in state {}", vgw.state));
                continue;
            }

            let mut detached_any = false;
            for attachment in vgw.attachments.iter().filter(|a| !a.is_detached()) {
                let result = attempt(
                    &mut self.report,
                    self.opts,
                    Action::Detach,
                    &format!("VPN gateway {} from VPC {}", vgw.id, attachment.vpc_id),
                    || api.detach_vpn_gateway(&vgw.id, &attachment.vpc_id),
                )
                .await;
                detached_any |= result == CleanupResult::Deleted;
            }
            if detached_any {
                settle(self.opts.settle.vpn_detach, "VPN gateway detach").await;
            }

            attempt(&mut self.report, self.opts, Action::Delete, &target, || {
                api.delete_vpn_gateway(&vgw.id)
            })
            .await;
        }
    }

    async fn transit_gateway_attachments(&mut self) {
        let api = self.api;
        let vpc_attachments = api.list_transit_gateway_attachments().await.map(|all| {
            all.into_iter()
                .filter(|a| a.resource_type == "vpc")
                .collect::<Vec<_>>()
        });
        let attachments = listed_if_available(
            &mut self.report,
            "Transit Gateway VPC attachments",
            self.region,
            vpc_attachments,
        );
        for attachment in attachments {
            let target = format!("Transit Gateway VPC attachment {}", attachment.id);
            if attachment.is_deleting() {
                skip(
                    &mut self.report,
                    &target,
                    &format!("in state {}", attachment.state),
                );
                continue;
            }
            attempt(&mut self.report, self.opts, Action::Delete, &target, || {
                api.delete_transit_gateway_vpc_attachment(&attachment.id)
            })
            .await;
        }
    }

    async fn transit_gateways(&mut self) {
        let api = self.api;
        let gateways = listed_if_available(
            &mut self.report,
            "Transit Gateways",
            self.region,
            api.list_transit_gateways().await,
        );
        for tgw in gateways {
            let target = format!("Transit Gateway {}", tgw.id);
            if tgw.is_deleting() {
                skip(&mut self.report, &target, &format!("in state {}", tgw.state));
                continue;
            }
            attempt(&mut self.report, self.opts, Action::Delete, &target, || {
                api.delete_transit_gateway(&tgw.id)
            })
            .await;
        }
    }

    async fn route_table_associations(&mut self, vpc_id: &str) {
        let api = self.api;
        let non_main = api
            .list_route_tables(vpc_id)
            .await
            .map(|tables| tables.into_iter().filter(|t| !t.is_main).collect());
        let tables = listed(
            &mut self.report,
            "non-main route tables",
            &format!("VPC {}", vpc_id),
            non_main,
        );
        for table in &tables {
            for association_id in &table.subnet_association_ids {
                attempt(
                    &mut self.report,
                    self.opts,
                    Action::Disassociate,
                    &format!("route table {} association {}", table.id, association_id),
                    || api.disassociate_route_table(association_id),
                )
                .await;
            }
        }
        self.route_tables.insert(vpc_id.to_string(), tables);
    }

    async fn route_tables(&mut self, vpc_id: &str) {
        let api = self.api;
        let tables = self.route_tables.remove(vpc_id).unwrap_or_default();
        for table in tables {
            attempt(
                &mut self.report,
                self.opts,
                Action::Delete,
                &format!("route table {}", table.id),
                || api.delete_route_table(&table.id),
            )
            .await;
        }
    }

    async fn subnets(&mut self, vpc_id: &str) {
        let api = self.api;
        let subnets = listed(
            &mut self.report,
            "subnets",
            &format!("VPC {}", vpc_id),
            api.list_subnets(vpc_id).await,
        );
        for subnet in subnets {
            let target = match &subnet.cidr_block {
                Some(cidr) => format!("subnet {} ({})", subnet.id, cidr),
                None => format!("subnet {}", subnet.id),
            };
            attempt(&mut self.report, self.opts, Action::Delete, &target, || {
                api.delete_subnet(&subnet.id)
            })
            .await;
        }
    }

    async fn security_groups(&mut self, vpc_id: &str) {
        let api = self.api;
        let custom = api
            .list_vpc_security_groups(vpc_id)
            .await
            .map(|groups| groups.into_iter().filter(|g| !g.is_default()).collect());
        let groups = listed(
            &mut self.report,
            "non-default security groups",
            &format!("VPC {}", vpc_id),
            custom,
        );
        for group in groups {
            attempt(
                &mut self.report,
                self.opts,
                Action::Delete,
                &format!("security group {} ({})", group.id, group.name),
                || api.delete_security_group(&group.id),
            )
            .await;
        }
    }

    async fn network_acls(&mut self, vpc_id: &str) {
        let api = self.api;
        let custom = api
            .list_network_acls(vpc_id)
            .await
            .map(|acls| acls.into_iter().filter(|a| !a.is_default).collect());
        let acls = listed(
            &mut self.report,
            "non-default network ACLs",
            &format!("VPC {}", vpc_id),
            custom,
        );
        for acl in acls {
            attempt(
                &mut self.report,
                self.opts,
                Action::Delete,
                &format!("network ACL {}", acl.id),
                || api.delete_network_acl(&acl.id),
            )
            .await;
        }
    }

    async fn vpc_endpoints(&mut self, vpc_id: &str) {
        let api = self.api;
        let endpoints = listed(
            &mut self.report,
            "VPC endpoints",
            &format!("VPC {}", vpc_id),
            api.list_vpc_endpoints(vpc_id).await,
        );
        for endpoint in endpoints {
            let target = format!(
                "VPC endpoint {} ({})",
                endpoint.id,
                endpoint.service_name.as_deref().unwrap_or("N/A")
            );
            if endpoint.is_deleting() {
                skip(
                    &mut self.report,
                    &target,
                    &format!("in state {}", endpoint.state),
                );
                continue;
            }
            attempt(&mut self.report, self.opts, Action::Delete, &target, || {
                api.delete_vpc_endpoint(&endpoint.id)
            })
            .await;
        }
    }

    async fn peering_connections(&mut self) {
        let api = self.api;
        let connections = listed(
            &mut self.report,
            "VPC peering connections",
            self.region,
            api.list_peering_connections().await,
        );
        for peering in connections {
            let target = format!("VPC peering connection {}", peering.id);
            if peering.is_closed() {
                skip(
                    &mut self.report,
                    &target,
                    &format!("in state {}", peering.status),
                );
                continue;
            }
            attempt(&mut self.report, self.opts, Action::Delete, &target, || {
                api.delete_peering_connection(&peering.id)
            })
            .await;
        }
    }

    async fn vpcs(&mut self, vpcs: &[Vpc]) {
        let api = self.api;
        for vpc in vpcs {
            if vpc.is_default {
                warn!(vpc_id = %vpc.id, "Skipping default VPC {}", vpc.id);
                self.report.skipped += 1;
                continue;
            }
            attempt(
                &mut self.report,
                self.opts,
                Action::Delete,
                &format!("VPC {}", vpc.id),
                || api.delete_vpc(&vpc.id),
            )
            .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::ec2::types::*;
    use crate::aws::{AwsError, classify_aws_error};
    use crate::cleaner::SettleDelays;
    use std::sync::Mutex;

    /// In-memory region that records every mutating call in order
    #[derive(Default)]
    struct RecordingVpc {
        vpcs: Vec<Vpc>,
        nat_gateways: Vec<NatGateway>,
        interfaces: Vec<NetworkInterface>,
        internet_gateways: Vec<InternetGateway>,
        vpn_connections: Vec<VpnConnection>,
        vpn_gateways: Vec<VpnGateway>,
        tgw_attachments: Vec<TransitGatewayAttachment>,
        transit_gateways: Vec<TransitGateway>,
        route_tables: HashMap<String, Vec<RouteTable>>,
        subnets: HashMap<String, Vec<Subnet>>,
        security_groups: HashMap<String, Vec<SecurityGroup>>,
        network_acls: HashMap<String, Vec<NetworkAcl>>,
        endpoints: HashMap<String, Vec<VpcEndpoint>>,
        peerings: Vec<PeeringConnection>,
        vpc_listing_fails: bool,
        tgw_unavailable: bool,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingVpc {
        fn record(&self, call: String) -> Result<(), AwsError> {
            self.calls.lock().unwrap().push(call);
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn per_vpc<T: Clone>(map: &HashMap<String, Vec<T>>, vpc_id: &str) -> Vec<T> {
            map.get(vpc_id).cloned().unwrap_or_default()
        }

        fn unavailable() -> AwsError {
            classify_aws_error(Some("InvalidAction"), Some("not offered here"))
        }
    }

    impl VpcApi for RecordingVpc {
        async fn list_vpcs(&self) -> Result<Vec<Vpc>, AwsError> {
            if self.vpc_listing_fails {
                return Err(classify_aws_error(Some("AccessDenied"), Some("no")));
            }
            Ok(self.vpcs.clone())
        }
        async fn delete_vpc(&self, vpc_id: &str) -> Result<(), AwsError> {
            self.record(format!("delete_vpc {vpc_id}"))
        }
        async fn list_nat_gateways(&self) -> Result<Vec<NatGateway>, AwsError> {
            Ok(self.nat_gateways.clone())
        }
        async fn delete_nat_gateway(&self, id: &str) -> Result<(), AwsError> {
            self.record(format!("delete_nat_gateway {id}"))
        }
        async fn list_network_interfaces(&self) -> Result<Vec<NetworkInterface>, AwsError> {
            Ok(self.interfaces.clone())
        }
        async fn delete_network_interface(&self, id: &str) -> Result<(), AwsError> {
            self.record(format!("delete_network_interface {id}"))
        }
        async fn list_internet_gateways(&self) -> Result<Vec<InternetGateway>, AwsError> {
            Ok(self.internet_gateways.clone())
        }
        async fn detach_internet_gateway(&self, igw: &str, vpc: &str) -> Result<(), AwsError> {
            self.record(format!("detach_internet_gateway {igw} {vpc}"))
        }
        async fn delete_internet_gateway(&self, id: &str) -> Result<(), AwsError> {
            self.record(format!("delete_internet_gateway {id}"))
        }
        async fn list_vpn_connections(&self) -> Result<Vec<VpnConnection>, AwsError> {
            Ok(self.vpn_connections.clone())
        }
        async fn delete_vpn_connection(&self, id: &str) -> Result<(), AwsError> {
            self.record(format!("delete_vpn_connection {id}"))
        }
        async fn list_vpn_gateways(&self) -> Result<Vec<VpnGateway>, AwsError> {
            Ok(self.vpn_gateways.clone())
        }
        async fn detach_vpn_gateway(&self, vgw: &str, vpc: &str) -> Result<(), AwsError> {
            self.record(format!("detach_vpn_gateway {vgw} {vpc}"))
        }
        async fn delete_vpn_gateway(&self, id: &str) -> Result<(), AwsError> {
            self.record(format!("delete_vpn_gateway {id}"))
        }
        async fn list_transit_gateway_attachments(
            &self,
        ) -> Result<Vec<TransitGatewayAttachment>, AwsError> {
            if self.tgw_unavailable {
                return Err(Self::unavailable());
            }
            Ok(self.tgw_attachments.clone())
        }
        async fn delete_transit_gateway_vpc_attachment(&self, id: &str) -> Result<(), AwsError> {
            self.record(format!("delete_transit_gateway_vpc_attachment {id}"))
        }
        async fn list_transit_gateways(&self) -> Result<Vec<TransitGateway>, AwsError> {
            if self.tgw_unavailable {
                return Err(Self::unavailable());
            }
            Ok(self.transit_gateways.clone())
        }
        async fn delete_transit_gateway(&self, id: &str) -> Result<(), AwsError> {
            self.record(format!("delete_transit_gateway {id}"))
        }
        async fn list_route_tables(&self, vpc_id: &str) -> Result<Vec<RouteTable>, AwsError> {
            Ok(Self::per_vpc(&self.route_tables, vpc_id))
        }
        async fn disassociate_route_table(&self, id: &str) -> Result<(), AwsError> {
            self.record(format!("disassociate_route_table {id}"))
        }
        async fn delete_route_table(&self, id: &str) -> Result<(), AwsError> {
            self.record(format!("delete_route_table {id}"))
        }
        async fn list_subnets(&self, vpc_id: &str) -> Result<Vec<Subnet>, AwsError> {
            Ok(Self::per_vpc(&self.subnets, vpc_id))
        }
        async fn delete_subnet(&self, id: &str) -> Result<(), AwsError> {
            self.record(format!("delete_subnet {id}"))
        }
        async fn list_vpc_security_groups(
            &self,
            vpc_id: &str,
        ) -> Result<Vec<SecurityGroup>, AwsError> {
            Ok(Self::per_vpc(&self.security_groups, vpc_id))
        }
        async fn delete_security_group(&self, id: &str) -> Result<(), AwsError> {
            self.record(format!("delete_security_group {id}"))
        }
        async fn list_network_acls(&self, vpc_id: &str) -> Result<Vec<NetworkAcl>, AwsError> {
            Ok(Self::per_vpc(&self.network_acls, vpc_id))
        }
        async fn delete_network_acl(&self, id: &str) -> Result<(), AwsError> {
            self.record(format!("delete_network_acl {id}"))
        }
        async fn list_vpc_endpoints(&self, vpc_id: &str) -> Result<Vec<VpcEndpoint>, AwsError> {
            Ok(Self::per_vpc(&self.endpoints, vpc_id))
        }
        async fn delete_vpc_endpoint(&self, id: &str) -> Result<(), AwsError> {
            self.record(format!("delete_vpc_endpoint {id}"))
        }
        async fn list_peering_connections(&self) -> Result<Vec<PeeringConnection>, AwsError> {
            Ok(self.peerings.clone())
        }
        async fn delete_peering_connection(&self, id: &str) -> Result<(), AwsError> {
            self.record(format!("delete_peering_connection {id}"))
        }
    }

    fn live() -> CleanupOptions {
        CleanupOptions {
            dry_run: false,
            settle: SettleDelays::none(),
        }
    }

    fn vpc(id: &str, is_default: bool) -> Vpc {
        Vpc {
            id: id.into(),
            is_default,
        }
    }

    /// One custom VPC holding one of everything, plus some already-gone noise
    fn populated_region() -> RecordingVpc {
        let v = "vpc-1".to_string();
        RecordingVpc {
            vpcs: vec![vpc("vpc-1", false)],
            nat_gateways: vec![
                NatGateway {
                    id: "nat-1".into(),
                    vpc_id: Some(v.clone()),
                    state: "available".into(),
                },
                NatGateway {
                    id: "nat-old".into(),
                    vpc_id: Some(v.clone()),
                    state: "deleted".into(),
                },
            ],
            interfaces: vec![
                NetworkInterface {
                    id: "eni-1".into(),
                    status: "available".into(),
                    description: None,
                },
                NetworkInterface {
                    id: "eni-busy".into(),
                    status: "in-use".into(),
                    description: Some("ELB app/web".into()),
                },
            ],
            internet_gateways: vec![InternetGateway {
                id: "igw-1".into(),
                attached_vpc_ids: vec![v.clone()],
            }],
            vpn_connections: vec![VpnConnection {
                id: "vpn-1".into(),
                state: "available".into(),
            }],
            vpn_gateways: vec![VpnGateway {
                id: "vgw-1".into(),
                state: "available".into(),
                attachments: vec![
                    VpnAttachment {
                        vpc_id: v.clone(),
                        state: "attached".into(),
                    },
                    VpnAttachment {
                        vpc_id: "vpc-gone".into(),
                        state: "detached".into(),
                    },
                ],
            }],
            tgw_attachments: vec![
                TransitGatewayAttachment {
                    id: "tgw-attach-1".into(),
                    state: "available".into(),
                    resource_type: "vpc".into(),
                },
                TransitGatewayAttachment {
                    id: "tgw-attach-vpn".into(),
                    state: "available".into(),
                    resource_type: "vpn".into(),
                },
            ],
            transit_gateways: vec![TransitGateway {
                id: "tgw-1".into(),
                state: "available".into(),
            }],
            route_tables: HashMap::from([(
                v.clone(),
                vec![
                    RouteTable {
                        id: "rtb-main".into(),
                        is_main: true,
                        subnet_association_ids: vec![],
                    },
                    RouteTable {
                        id: "rtb-1".into(),
                        is_main: false,
                        subnet_association_ids: vec!["rtbassoc-1".into()],
                    },
                ],
            )]),
            subnets: HashMap::from([(
                v.clone(),
                vec![Subnet {
                    id: "subnet-1".into(),
                    cidr_block: Some("10.0.1.0/24".into()),
                }],
            )]),
            security_groups: HashMap::from([(
                v.clone(),
                vec![
                    SecurityGroup {
                        id: "sg-default".into(),
                        name: "default".into(),
                        vpc_id: Some(v.clone()),
                    },
                    SecurityGroup {
                        id: "sg-1".into(),
                        name: "web".into(),
                        vpc_id: Some(v.clone()),
                    },
                ],
            )]),
            network_acls: HashMap::from([(
                v.clone(),
                vec![
                    NetworkAcl {
                        id: "acl-default".into(),
                        is_default: true,
                    },
                    NetworkAcl {
                        id: "acl-1".into(),
                        is_default: false,
                    },
                ],
            )]),
            endpoints: HashMap::from([(
                v,
                vec![VpcEndpoint {
                    id: "vpce-1".into(),
                    service_name: Some("com.amazonaws.us-east-1.s3".into()),
                    state: "available".into(),
                }],
            )]),
            peerings: vec![
                PeeringConnection {
                    id: "pcx-1".into(),
                    status: "active".into(),
                },
                PeeringConnection {
                    id: "pcx-old".into(),
                    status: "rejected".into(),
                },
            ],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn sweep_follows_dependency_order() {
        let region = populated_region();
        let report = clean(&region, "us-east-1", &live()).await;

        assert_eq!(
            region.calls(),
            vec![
                "delete_nat_gateway nat-1",
                "delete_network_interface eni-1",
                "detach_internet_gateway igw-1 vpc-1",
                "delete_internet_gateway igw-1",
                "delete_vpn_connection vpn-1",
                "detach_vpn_gateway vgw-1 vpc-1",
                "delete_vpn_gateway vgw-1",
                "delete_transit_gateway_vpc_attachment tgw-attach-1",
                "delete_transit_gateway tgw-1",
                "disassociate_route_table rtbassoc-1",
                "delete_route_table rtb-1",
                "delete_subnet subnet-1",
                "delete_security_group sg-1",
                "delete_network_acl acl-1",
                "delete_vpc_endpoint vpce-1",
                "delete_peering_connection pcx-1",
                "delete_vpc vpc-1",
            ]
        );
        // nat-old, eni-busy, pcx-old
        assert_eq!(report.skipped, 3);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn order_lists_every_step_once() {
        let unique: std::collections::HashSet<_> = VPC_CLEANUP_ORDER.iter().collect();
        assert_eq!(unique.len(), VPC_CLEANUP_ORDER.len());
        assert_eq!(VPC_CLEANUP_ORDER.first(), Some(&VpcStep::NatGateways));
        assert_eq!(VPC_CLEANUP_ORDER.last(), Some(&VpcStep::Vpcs));
        assert_eq!(
            VPC_CLEANUP_ORDER.iter().filter(|s| s.is_per_vpc()).count(),
            6
        );
    }

    #[tokio::test]
    async fn dry_run_records_nothing() {
        let region = populated_region();
        let report = clean(&region, "us-east-1", &CleanupOptions::default()).await;

        assert!(region.calls().is_empty());
        // every delete in the live sweep above
        assert_eq!(report.dry_run, 14);
        assert_eq!(report.deleted, 0);
    }

    #[tokio::test]
    async fn default_vpc_is_swept_but_kept() {
        let region = RecordingVpc {
            vpcs: vec![vpc("vpc-default", true), vpc("vpc-2", false)],
            subnets: HashMap::from([(
                "vpc-default".to_string(),
                vec![Subnet {
                    id: "subnet-d".into(),
                    cidr_block: None,
                }],
            )]),
            ..Default::default()
        };

        let report = clean(&region, "eu-west-1", &live()).await;

        assert_eq!(
            region.calls(),
            vec!["delete_subnet subnet-d", "delete_vpc vpc-2"]
        );
        assert_eq!(report.skipped, 1);
    }

    #[tokio::test]
    async fn failed_vpc_listing_still_runs_region_wide_steps() {
        let region = RecordingVpc {
            vpc_listing_fails: true,
            nat_gateways: vec![NatGateway {
                id: "nat-1".into(),
                vpc_id: None,
                state: "available".into(),
            }],
            peerings: vec![PeeringConnection {
                id: "pcx-1".into(),
                status: "active".into(),
            }],
            ..Default::default()
        };

        let report = clean(&region, "us-west-2", &live()).await;

        assert_eq!(
            region.calls(),
            vec!["delete_nat_gateway nat-1", "delete_peering_connection pcx-1"]
        );
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn missing_transit_gateways_are_not_failures() {
        let region = RecordingVpc {
            tgw_unavailable: true,
            ..Default::default()
        };

        let report = clean(&region, "ap-east-1", &live()).await;

        assert!(region.calls().is_empty());
        assert_eq!(report, CleanupReport::default());
    }
}
