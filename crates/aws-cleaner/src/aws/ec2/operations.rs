//! EC2 and VPC operation traits for testing

use super::Ec2Client;
use super::types::{
    ElasticIp, Image, Instance, InternetGateway, NatGateway, NetworkAcl, NetworkInterface,
    PeeringConnection, RouteTable, SecurityGroup, Snapshot, Subnet, TransitGateway,
    TransitGatewayAttachment, Volume, Vpc, VpcEndpoint, VpnConnection, VpnGateway,
};
use crate::aws::error::AwsError;

/// Compute-side EC2 operations used by the EC2 cleaner.
///
/// Abstracted so the cleaner's skip and dry-run logic can be tested
/// without hitting real AWS.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait Ec2Api: Send + Sync {
    async fn list_instances(&self) -> Result<Vec<Instance>, AwsError>;
    async fn terminate_instance(&self, instance_id: &str) -> Result<(), AwsError>;

    /// All security groups in the region
    async fn list_security_groups(&self) -> Result<Vec<SecurityGroup>, AwsError>;
    async fn delete_security_group(&self, group_id: &str) -> Result<(), AwsError>;

    async fn list_addresses(&self) -> Result<Vec<ElasticIp>, AwsError>;
    async fn release_address(&self, allocation_id: &str) -> Result<(), AwsError>;

    async fn list_volumes(&self) -> Result<Vec<Volume>, AwsError>;
    async fn delete_volume(&self, volume_id: &str) -> Result<(), AwsError>;

    async fn list_snapshots(&self, owner_id: &str) -> Result<Vec<Snapshot>, AwsError>;
    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<(), AwsError>;

    async fn list_images(&self, owner_id: &str) -> Result<Vec<Image>, AwsError>;
    async fn deregister_image(&self, image_id: &str) -> Result<(), AwsError>;
}

/// VPC networking operations used by the VPC cleaner.
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait VpcApi: Send + Sync {
    async fn list_vpcs(&self) -> Result<Vec<Vpc>, AwsError>;
    async fn delete_vpc(&self, vpc_id: &str) -> Result<(), AwsError>;

    async fn list_nat_gateways(&self) -> Result<Vec<NatGateway>, AwsError>;
    async fn delete_nat_gateway(&self, nat_gateway_id: &str) -> Result<(), AwsError>;

    async fn list_network_interfaces(&self) -> Result<Vec<NetworkInterface>, AwsError>;
    async fn delete_network_interface(&self, eni_id: &str) -> Result<(), AwsError>;

    async fn list_internet_gateways(&self) -> Result<Vec<InternetGateway>, AwsError>;
    async fn detach_internet_gateway(&self, igw_id: &str, vpc_id: &str) -> Result<(), AwsError>;
    async fn delete_internet_gateway(&self, igw_id: &str) -> Result<(), AwsError>;

    async fn list_vpn_connections(&self) -> Result<Vec<VpnConnection>, AwsError>;
    async fn delete_vpn_connection(&self, vpn_connection_id: &str) -> Result<(), AwsError>;

    async fn list_vpn_gateways(&self) -> Result<Vec<VpnGateway>, AwsError>;
    async fn detach_vpn_gateway(&self, vgw_id: &str, vpc_id: &str) -> Result<(), AwsError>;
    async fn delete_vpn_gateway(&self, vgw_id: &str) -> Result<(), AwsError>;

    async fn list_transit_gateway_attachments(
        &self,
    ) -> Result<Vec<TransitGatewayAttachment>, AwsError>;
    async fn delete_transit_gateway_vpc_attachment(
        &self,
        attachment_id: &str,
    ) -> Result<(), AwsError>;

    async fn list_transit_gateways(&self) -> Result<Vec<TransitGateway>, AwsError>;
    async fn delete_transit_gateway(&self, tgw_id: &str) -> Result<(), AwsError>;

    async fn list_route_tables(&self, vpc_id: &str) -> Result<Vec<RouteTable>, AwsError>;
    async fn disassociate_route_table(&self, association_id: &str) -> Result<(), AwsError>;
    async fn delete_route_table(&self, route_table_id: &str) -> Result<(), AwsError>;

    async fn list_subnets(&self, vpc_id: &str) -> Result<Vec<Subnet>, AwsError>;
    async fn delete_subnet(&self, subnet_id: &str) -> Result<(), AwsError>;

    /// Security groups scoped to one VPC
    async fn list_vpc_security_groups(&self, vpc_id: &str)
    -> Result<Vec<SecurityGroup>, AwsError>;
    async fn delete_security_group(&self, group_id: &str) -> Result<(), AwsError>;

    async fn list_network_acls(&self, vpc_id: &str) -> Result<Vec<NetworkAcl>, AwsError>;
    async fn delete_network_acl(&self, acl_id: &str) -> Result<(), AwsError>;

    async fn list_vpc_endpoints(&self, vpc_id: &str) -> Result<Vec<VpcEndpoint>, AwsError>;
    async fn delete_vpc_endpoint(&self, endpoint_id: &str) -> Result<(), AwsError>;

    async fn list_peering_connections(&self) -> Result<Vec<PeeringConnection>, AwsError>;
    async fn delete_peering_connection(&self, peering_id: &str) -> Result<(), AwsError>;
}

impl Ec2Api for Ec2Client {
    async fn list_instances(&self) -> Result<Vec<Instance>, AwsError> {
        Ec2Client::list_instances(self).await
    }

    async fn terminate_instance(&self, instance_id: &str) -> Result<(), AwsError> {
        Ec2Client::terminate_instance(self, instance_id).await
    }

    async fn list_security_groups(&self) -> Result<Vec<SecurityGroup>, AwsError> {
        Ec2Client::list_security_groups(self, None).await
    }

    async fn delete_security_group(&self, group_id: &str) -> Result<(), AwsError> {
        Ec2Client::delete_security_group(self, group_id).await
    }

    async fn list_addresses(&self) -> Result<Vec<ElasticIp>, AwsError> {
        Ec2Client::list_addresses(self).await
    }

    async fn release_address(&self, allocation_id: &str) -> Result<(), AwsError> {
        Ec2Client::release_address(self, allocation_id).await
    }

    async fn list_volumes(&self) -> Result<Vec<Volume>, AwsError> {
        Ec2Client::list_volumes(self).await
    }

    async fn delete_volume(&self, volume_id: &str) -> Result<(), AwsError> {
        Ec2Client::delete_volume(self, volume_id).await
    }

    async fn list_snapshots(&self, owner_id: &str) -> Result<Vec<Snapshot>, AwsError> {
        Ec2Client::list_snapshots(self, owner_id).await
    }

    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<(), AwsError> {
        Ec2Client::delete_snapshot(self, snapshot_id).await
    }

    async fn list_images(&self, owner_id: &str) -> Result<Vec<Image>, AwsError> {
        Ec2Client::list_images(self, owner_id).await
    }

    async fn deregister_image(&self, image_id: &str) -> Result<(), AwsError> {
        Ec2Client::deregister_image(self, image_id).await
    }
}

impl VpcApi for Ec2Client {
    async fn list_vpcs(&self) -> Result<Vec<Vpc>, AwsError> {
        Ec2Client::list_vpcs(self).await
    }

    async fn delete_vpc(&self, vpc_id: &str) -> Result<(), AwsError> {
        Ec2Client::delete_vpc(self, vpc_id).await
    }

    async fn list_nat_gateways(&self) -> Result<Vec<NatGateway>, AwsError> {
        Ec2Client::list_nat_gateways(self).await
    }

    async fn delete_nat_gateway(&self, nat_gateway_id: &str) -> Result<(), AwsError> {
        Ec2Client::delete_nat_gateway(self, nat_gateway_id).await
    }

    async fn list_network_interfaces(&self) -> Result<Vec<NetworkInterface>, AwsError> {
        Ec2Client::list_network_interfaces(self).await
    }

    async fn delete_network_interface(&self, eni_id: &str) -> Result<(), AwsError> {
        Ec2Client::delete_network_interface(self, eni_id).await
    }

    async fn list_internet_gateways(&self) -> Result<Vec<InternetGateway>, AwsError> {
        Ec2Client::list_internet_gateways(self).await
    }

    async fn detach_internet_gateway(&self, igw_id: &str, vpc_id: &str) -> Result<(), AwsError> {
        Ec2Client::detach_internet_gateway(self, igw_id, vpc_id).await
    }

    async fn delete_internet_gateway(&self, igw_id: &str) -> Result<(), AwsError> {
        Ec2Client::delete_internet_gateway(self, igw_id).await
    }

    async fn list_vpn_connections(&self) -> Result<Vec<VpnConnection>, AwsError> {
        Ec2Client::list_vpn_connections(self).await
    }

    async fn delete_vpn_connection(&self, vpn_connection_id: &str) -> Result<(), AwsError> {
        Ec2Client::delete_vpn_connection(self, vpn_connection_id).await
    }

    async fn list_vpn_gateways(&self) -> Result<Vec<VpnGateway>, AwsError> {
        Ec2Client::list_vpn_gateways(self).await
    }

    async fn detach_vpn_gateway(&self, vgw_id: &str, vpc_id: &str) -> Result<(), AwsError> {
        Ec2Client::detach_vpn_gateway(self, vgw_id, vpc_id).await
    }

    async fn delete_vpn_gateway(&self, vgw_id: &str) -> Result<(), AwsError> {
        Ec2Client::delete_vpn_gateway(self, vgw_id).await
    }

    async fn list_transit_gateway_attachments(
        &self,
    ) -> Result<Vec<TransitGatewayAttachment>, AwsError> {
        Ec2Client::list_transit_gateway_attachments(self).await
    }

    async fn delete_transit_gateway_vpc_attachment(
        &self,
        attachment_id: &str,
    ) -> Result<(), AwsError> {
        Ec2Client::delete_transit_gateway_vpc_attachment(self, attachment_id).await
    }

    async fn list_transit_gateways(&self) -> Result<Vec<TransitGateway>, AwsError> {
        Ec2Client::list_transit_gateways(self).await
    }

    async fn delete_transit_gateway(&self, tgw_id: &str) -> Result<(), AwsError> {
        Ec2Client::delete_transit_gateway(self, tgw_id).await
    }

    async fn list_route_tables(&self, vpc_id: &str) -> Result<Vec<RouteTable>, AwsError> {
        Ec2Client::list_route_tables(self, vpc_id).await
    }

    async fn disassociate_route_table(&self, association_id: &str) -> Result<(), AwsError> {
        Ec2Client::disassociate_route_table(self, association_id).await
    }

    async fn delete_route_table(&self, route_table_id: &str) -> Result<(), AwsError> {
        Ec2Client::delete_route_table(self, route_table_id).await
    }

    async fn list_subnets(&self, vpc_id: &str) -> Result<Vec<Subnet>, AwsError> {
        Ec2Client::list_subnets(self, vpc_id).await
    }

    async fn delete_subnet(&self, subnet_id: &str) -> Result<(), AwsError> {
        Ec2Client::delete_subnet(self, subnet_id).await
    }

    async fn list_vpc_security_groups(
        &self,
        vpc_id: &str,
    ) -> Result<Vec<SecurityGroup>, AwsError> {
        Ec2Client::list_security_groups(self, Some(vpc_id)).await
    }

    async fn delete_security_group(&self, group_id: &str) -> Result<(), AwsError> {
        Ec2Client::delete_security_group(self, group_id).await
    }

    async fn list_network_acls(&self, vpc_id: &str) -> Result<Vec<NetworkAcl>, AwsError> {
        Ec2Client::list_network_acls(self, vpc_id).await
    }

    async fn delete_network_acl(&self, acl_id: &str) -> Result<(), AwsError> {
        Ec2Client::delete_network_acl(self, acl_id).await
    }

    async fn list_vpc_endpoints(&self, vpc_id: &str) -> Result<Vec<VpcEndpoint>, AwsError> {
        Ec2Client::list_vpc_endpoints(self, vpc_id).await
    }

    async fn delete_vpc_endpoint(&self, endpoint_id: &str) -> Result<(), AwsError> {
        Ec2Client::delete_vpc_endpoint(self, endpoint_id).await
    }

    async fn list_peering_connections(&self) -> Result<Vec<PeeringConnection>, AwsError> {
        Ec2Client::list_peering_connections(self).await
    }

    async fn delete_peering_connection(&self, peering_id: &str) -> Result<(), AwsError> {
        Ec2Client::delete_peering_connection(self, peering_id).await
    }
}
