//! VPC networking resources

use super::types::{
    InternetGateway, NatGateway, NetworkAcl, NetworkInterface, PeeringConnection, RouteTable,
    Subnet, TransitGateway, TransitGatewayAttachment, Vpc, VpcEndpoint, VpnConnection, VpnGateway,
};
use super::{Ec2Client, vpc_filter};
use crate::aws::error::{AwsError, classify_aws_error};

impl Ec2Client {
    pub async fn list_vpcs(&self) -> Result<Vec<Vpc>, AwsError> {
        let pages = self
            .client
            .describe_vpcs()
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages.iter().flat_map(|p| p.vpcs()).map(Vpc::from).collect())
    }

    pub async fn delete_vpc(&self, vpc_id: &str) -> Result<(), AwsError> {
        self.client.delete_vpc().vpc_id(vpc_id).send().await?;
        Ok(())
    }

    pub async fn list_nat_gateways(&self) -> Result<Vec<NatGateway>, AwsError> {
        let pages = self
            .client
            .describe_nat_gateways()
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.nat_gateways())
            .map(NatGateway::from)
            .collect())
    }

    pub async fn delete_nat_gateway(&self, nat_gateway_id: &str) -> Result<(), AwsError> {
        self.client
            .delete_nat_gateway()
            .nat_gateway_id(nat_gateway_id)
            .send()
            .await?;
        Ok(())
    }

    pub async fn list_network_interfaces(&self) -> Result<Vec<NetworkInterface>, AwsError> {
        let pages = self
            .client
            .describe_network_interfaces()
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.network_interfaces())
            .map(NetworkInterface::from)
            .collect())
    }

    pub async fn delete_network_interface(&self, eni_id: &str) -> Result<(), AwsError> {
        self.client
            .delete_network_interface()
            .network_interface_id(eni_id)
            .send()
            .await?;
        Ok(())
    }

    pub async fn list_internet_gateways(&self) -> Result<Vec<InternetGateway>, AwsError> {
        let pages = self
            .client
            .describe_internet_gateways()
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.internet_gateways())
            .map(InternetGateway::from)
            .collect())
    }

    pub async fn detach_internet_gateway(&self, igw_id: &str, vpc_id: &str) -> Result<(), AwsError> {
        self.client
            .detach_internet_gateway()
            .internet_gateway_id(igw_id)
            .vpc_id(vpc_id)
            .send()
            .await?;
        Ok(())
    }

    pub async fn delete_internet_gateway(&self, igw_id: &str) -> Result<(), AwsError> {
        self.client
            .delete_internet_gateway()
            .internet_gateway_id(igw_id)
            .send()
            .await?;
        Ok(())
    }

    pub async fn list_vpn_connections(&self) -> Result<Vec<VpnConnection>, AwsError> {
        let response = self.client.describe_vpn_connections().send().await?;
        Ok(response
            .vpn_connections()
            .iter()
            .map(VpnConnection::from)
            .collect())
    }

    pub async fn delete_vpn_connection(&self, vpn_connection_id: &str) -> Result<(), AwsError> {
        self.client
            .delete_vpn_connection()
            .vpn_connection_id(vpn_connection_id)
            .send()
            .await?;
        Ok(())
    }

    pub async fn list_vpn_gateways(&self) -> Result<Vec<VpnGateway>, AwsError> {
        let response = self.client.describe_vpn_gateways().send().await?;
        Ok(response.vpn_gateways().iter().map(VpnGateway::from).collect())
    }

    pub async fn detach_vpn_gateway(&self, vgw_id: &str, vpc_id: &str) -> Result<(), AwsError> {
        self.client
            .detach_vpn_gateway()
            .vpn_gateway_id(vgw_id)
            .vpc_id(vpc_id)
            .send()
            .await?;
        Ok(())
    }

    pub async fn delete_vpn_gateway(&self, vgw_id: &str) -> Result<(), AwsError> {
        self.client
            .delete_vpn_gateway()
            .vpn_gateway_id(vgw_id)
            .send()
            .await?;
        Ok(())
    }

    pub async fn list_transit_gateway_attachments(
        &self,
    ) -> Result<Vec<TransitGatewayAttachment>, AwsError> {
        let pages = self
            .client
            .describe_transit_gateway_attachments()
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.transit_gateway_attachments())
            .map(TransitGatewayAttachment::from)
            .collect())
    }

    pub async fn delete_transit_gateway_vpc_attachment(
        &self,
        attachment_id: &str,
    ) -> Result<(), AwsError> {
        self.client
            .delete_transit_gateway_vpc_attachment()
            .transit_gateway_attachment_id(attachment_id)
            .send()
            .await?;
        Ok(())
    }

    pub async fn list_transit_gateways(&self) -> Result<Vec<TransitGateway>, AwsError> {
        let pages = self
            .client
            .describe_transit_gateways()
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.transit_gateways())
            .map(TransitGateway::from)
            .collect())
    }

    pub async fn delete_transit_gateway(&self, tgw_id: &str) -> Result<(), AwsError> {
        self.client
            .delete_transit_gateway()
            .transit_gateway_id(tgw_id)
            .send()
            .await?;
        Ok(())
    }

    pub async fn list_route_tables(&self, vpc_id: &str) -> Result<Vec<RouteTable>, AwsError> {
        let pages = self
            .client
            .describe_route_tables()
            .filters(vpc_filter(vpc_id))
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.route_tables())
            .map(RouteTable::from)
            .collect())
    }

    pub async fn disassociate_route_table(&self, association_id: &str) -> Result<(), AwsError> {
        self.client
            .disassociate_route_table()
            .association_id(association_id)
            .send()
            .await?;
        Ok(())
    }

    pub async fn delete_route_table(&self, route_table_id: &str) -> Result<(), AwsError> {
        self.client
            .delete_route_table()
            .route_table_id(route_table_id)
            .send()
            .await?;
        Ok(())
    }

    pub async fn list_subnets(&self, vpc_id: &str) -> Result<Vec<Subnet>, AwsError> {
        let pages = self
            .client
            .describe_subnets()
            .filters(vpc_filter(vpc_id))
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.subnets())
            .map(Subnet::from)
            .collect())
    }

    pub async fn delete_subnet(&self, subnet_id: &str) -> Result<(), AwsError> {
        self.client
            .delete_subnet()
            .subnet_id(subnet_id)
            .send()
            .await?;
        Ok(())
    }

    pub async fn list_network_acls(&self, vpc_id: &str) -> Result<Vec<NetworkAcl>, AwsError> {
        let pages = self
            .client
            .describe_network_acls()
            .filters(vpc_filter(vpc_id))
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.network_acls())
            .map(NetworkAcl::from)
            .collect())
    }

    pub async fn delete_network_acl(&self, acl_id: &str) -> Result<(), AwsError> {
        self.client
            .delete_network_acl()
            .network_acl_id(acl_id)
            .send()
            .await?;
        Ok(())
    }

    pub async fn list_vpc_endpoints(&self, vpc_id: &str) -> Result<Vec<VpcEndpoint>, AwsError> {
        let pages = self
            .client
            .describe_vpc_endpoints()
            .filters(vpc_filter(vpc_id))
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.vpc_endpoints())
            .map(VpcEndpoint::from)
            .collect())
    }

    /// Delete one endpoint.
    ///
    /// The batch API reports per-item failures in the response body rather
    /// than as an error, so those are lifted into [`AwsError`] here.
    pub async fn delete_vpc_endpoint(&self, endpoint_id: &str) -> Result<(), AwsError> {
        let response = self
            .client
            .delete_vpc_endpoints()
            .vpc_endpoint_ids(endpoint_id)
            .send()
            .await?;

        match response.unsuccessful().first().and_then(|item| item.error()) {
            Some(err) => Err(classify_aws_error(err.code(), err.message())),
            None => Ok(()),
        }
    }

    pub async fn list_peering_connections(&self) -> Result<Vec<PeeringConnection>, AwsError> {
        let pages = self
            .client
            .describe_vpc_peering_connections()
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|p| p.vpc_peering_connections())
            .map(PeeringConnection::from)
            .collect())
    }

    pub async fn delete_peering_connection(&self, peering_id: &str) -> Result<(), AwsError> {
        self.client
            .delete_vpc_peering_connection()
            .vpc_peering_connection_id(peering_id)
            .send()
            .await?;
        Ok(())
    }
}
