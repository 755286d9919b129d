// Copyright (c) 2025 - Cowboy AI, Inc.
//! Per-VPC phase planning

use tracing::{debug, info, warn};

use crate::domain::{Cidr, SubnetRole, SubnetSpec, VpcSpec};
use crate::errors::PlannerResult;
use crate::topology::{
    Attachment, Eip, Entity, EntityKey, InternetGateway, NatGateway, ResourceRef, ResourceShare,
    RouteTable, RouteTableScope, RouteTarget, StaticRoute, TopologyModel, TransitGateway, Vpc,
};

use super::{RoutePlanner, VpcPlan, TGW_ROUTE_TABLES};

/// A subnet with the key of the route table serving it
struct PlannedSubnet {
    spec: SubnetSpec,
    key: EntityKey,
    route_table: EntityKey,
}

impl RoutePlanner {
    /// Plan everything one VPC's phase creates
    ///
    /// `existing_transit_gateway` is the hub id persisted by an earlier
    /// phase. The hub-owning VPC plans the transit gateway itself only when
    /// no id exists yet, so the hub is created once; any other VPC without
    /// an id gets no attachment and no transit gateway routes until the hub
    /// phase has run.
    pub fn plan_vpc(
        &self,
        vpc: &VpcSpec,
        existing_transit_gateway: Option<&str>,
    ) -> PlannerResult<VpcPlan> {
        let subnets = self.allocator.allocate(vpc)?;
        let mut model = TopologyModel::new();

        let vpc_key = model.insert(Entity::Vpc(Vpc {
            name: vpc.name.clone(),
            cidr: vpc.cidr,
            flow_logs: vpc.flow_logs,
        }))?;

        let mut planned = Vec::with_capacity(subnets.len());
        for spec in subnets {
            let key = model.insert(Entity::Subnet(spec.clone()))?;
            let route_table = model.insert(Entity::RouteTable(RouteTable {
                name: spec.route_table_name(),
                scope: RouteTableScope::Subnet {
                    vpc: vpc.name.clone(),
                    subnet: key.clone(),
                },
            }))?;
            planned.push(PlannedSubnet {
                spec,
                key,
                route_table,
            });
        }

        let mut plan = VpcPlan {
            vpc: vpc.name.clone(),
            model,
            attachment: None,
            transit_gateway: None,
            route_tables: Vec::new(),
        };

        let transit_gateway = match (existing_transit_gateway, &vpc.share_with) {
            (Some(id), _) => Some(ResourceRef::existing(id)),
            (None, Some(principal)) => Some(self.plan_hub(&mut plan, principal)?),
            (None, None) => None,
        };

        let nat_gateways = self.plan_internet_egress(&mut plan.model, vpc, &vpc_key, &planned)?;

        // NAT default routes do not need the transit gateway
        let isolated: Vec<&PlannedSubnet> = planned
            .iter()
            .filter(|s| s.spec.role.is_isolated())
            .collect();
        if vpc.is_inspection() && !nat_gateways.is_empty() {
            for subnet in &isolated {
                let nat = &nat_gateways[subnet.spec.az.index() % nat_gateways.len()];
                plan.model.add_route(StaticRoute::new(
                    &subnet.route_table.name,
                    ResourceRef::Planned(subnet.route_table.clone()),
                    Cidr::default_route(),
                    RouteTarget::NatGateway(ResourceRef::Planned(nat.clone())),
                ))?;
            }
        }

        let Some(transit_gateway) = transit_gateway else {
            warn!(
                vpc = %vpc.name,
                "Transit gateway not available yet; skipping attachment and transit routes"
            );
            return Ok(plan);
        };

        let transit_subnets: Vec<EntityKey> = planned
            .iter()
            .filter(|s| s.spec.role == SubnetRole::Transit)
            .map(|s| s.key.clone())
            .collect();

        let attachment = plan.model.insert(Entity::Attachment(Attachment {
            name: format!("{}/attachment", vpc.name),
            vpc: vpc_key.clone(),
            vpc_cidr: vpc.cidr,
            transit_gateway: transit_gateway.clone(),
            subnets: transit_subnets,
            appliance_mode: vpc.is_inspection(),
        }))?;
        plan.attachment = Some(attachment.clone());

        if vpc.is_inspection() {
            let mut destinations: Vec<Cidr> = Vec::new();
            destinations.extend(self.settings.overall_cidr);
            destinations.extend(self.settings.onprem_cidrs.iter().copied());

            // private and transit tables first, then public
            let public = planned.iter().filter(|s| s.spec.role == SubnetRole::Public);
            for subnet in isolated.iter().copied().chain(public) {
                for destination in &destinations {
                    self.add_transit_route(
                        &mut plan.model,
                        subnet,
                        *destination,
                        &transit_gateway,
                        &attachment,
                    )?;
                }
            }
        } else {
            for subnet in &isolated {
                self.add_transit_route(
                    &mut plan.model,
                    subnet,
                    Cidr::default_route(),
                    &transit_gateway,
                    &attachment,
                )?;
            }
        }

        info!(
            vpc = %vpc.name,
            role = %vpc.role,
            entities = plan.model.len(),
            "Planned VPC phase"
        );
        Ok(plan)
    }

    /// Transit gateway, its route tables and the organization share
    fn plan_hub(&self, plan: &mut VpcPlan, principal: &str) -> PlannerResult<ResourceRef> {
        let name = self.settings.transit_gateway_name.clone();
        let tgw = plan.model.insert(Entity::TransitGateway(TransitGateway {
            description: name.clone(),
            name: name.clone(),
            auto_accept_shared_attachments: true,
            default_route_table_association: false,
            default_route_table_propagation: false,
        }))?;
        let tgw_ref = ResourceRef::Planned(tgw.clone());

        for table in TGW_ROUTE_TABLES {
            let key = plan.model.insert(Entity::RouteTable(RouteTable {
                name: table.to_string(),
                scope: RouteTableScope::TransitGateway {
                    transit_gateway: tgw_ref.clone(),
                },
            }))?;
            plan.route_tables.push((table.to_string(), key));
        }

        plan.model.insert(Entity::ResourceShare(ResourceShare {
            name: format!("{}-share", name),
            resource: tgw_ref.clone(),
            principals: vec![principal.to_string()],
            allow_external_principals: false,
        }))?;

        debug!(vpc = %plan.vpc, transit_gateway = %name, "Planned transit gateway hub");
        plan.transit_gateway = Some(tgw);
        Ok(tgw_ref)
    }

    /// Internet gateway, default routes on public tables, and one EIP + NAT
    /// gateway per public subnet; returns the NAT keys in zone order
    fn plan_internet_egress(
        &self,
        model: &mut TopologyModel,
        vpc: &VpcSpec,
        vpc_key: &EntityKey,
        planned: &[PlannedSubnet],
    ) -> PlannerResult<Vec<EntityKey>> {
        let public: Vec<&PlannedSubnet> = planned
            .iter()
            .filter(|s| s.spec.role == SubnetRole::Public)
            .collect();
        if public.is_empty() {
            return Ok(Vec::new());
        }

        let igw = model.insert(Entity::InternetGateway(InternetGateway {
            name: format!("{}/igw", vpc.name),
            vpc: vpc_key.clone(),
        }))?;

        let mut nat_gateways = Vec::with_capacity(public.len());
        for subnet in public {
            model.add_route(StaticRoute::new(
                &subnet.route_table.name,
                ResourceRef::Planned(subnet.route_table.clone()),
                Cidr::default_route(),
                RouteTarget::InternetGateway(ResourceRef::Planned(igw.clone())),
            ))?;

            let eip = model.insert(Entity::Eip(Eip {
                name: format!("{}/eip-{}", vpc.name, subnet.spec.az),
            }))?;
            let nat = model.insert(Entity::NatGateway(NatGateway {
                name: format!("{}/nat-{}", vpc.name, subnet.spec.az),
                az: subnet.spec.az,
                subnet: subnet.key.clone(),
                eip,
            }))?;
            nat_gateways.push(nat);
        }

        Ok(nat_gateways)
    }

    /// Route to the transit gateway that must wait for the attachment
    fn add_transit_route(
        &self,
        model: &mut TopologyModel,
        subnet: &PlannedSubnet,
        destination: Cidr,
        transit_gateway: &ResourceRef,
        attachment: &EntityKey,
    ) -> PlannerResult<()> {
        let route = model.add_route(StaticRoute::new(
            &subnet.route_table.name,
            ResourceRef::Planned(subnet.route_table.clone()),
            destination,
            RouteTarget::TransitGateway(transit_gateway.clone()),
        ))?;
        model.add_dependency(&route, attachment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkSettings;
    use crate::domain::{ResourceKind, SubnetAllocation};
    use crate::errors::PlannerError;
    use crate::plan_graph::ResourcePlanGraph;
    use pretty_assertions::assert_eq;

    fn cidr(s: &str) -> Cidr {
        Cidr::new(s).unwrap()
    }

    fn planner() -> RoutePlanner {
        let settings = NetworkSettings::default()
            .with_overall_cidr(cidr("172.16.128.0/17"))
            .with_onprem_cidrs(vec![cidr("10.200.0.0/16"), cidr("10.230.0.0/16")]);
        RoutePlanner::new(settings, Some(cidr("172.16.144.0/23")))
    }

    fn inspection_vpc() -> VpcSpec {
        VpcSpec::inspection("shared-infra-services", cidr("172.16.144.0/23"))
            .with_subnets(SubnetRole::Public, SubnetAllocation::Mask(27))
            .with_subnets(
                SubnetRole::Private,
                "172.16.144.128/27,172.16.144.160/27,172.16.144.192/27".parse().unwrap(),
            )
            .with_subnets(
                SubnetRole::Transit,
                "172.16.145.0/28,172.16.145.16/28,172.16.145.32/28".parse().unwrap(),
            )
    }

    fn spoke_vpc(name: &str, block: &str) -> VpcSpec {
        VpcSpec::spoke(name, cidr(block))
            .with_contiguous(true)
            .with_subnets(SubnetRole::Private, SubnetAllocation::Mask(26))
            .with_subnets(SubnetRole::Transit, SubnetAllocation::Mask(28))
    }

    fn table(vpc: &str, subnet: &str) -> ResourceRef {
        ResourceRef::planned(ResourceKind::RouteTable, format!("{}/{}-rt", vpc, subnet))
    }

    #[test]
    fn test_spoke_routes_default_to_transit_gateway() {
        let plan = planner()
            .plan_vpc(&spoke_vpc("datalake-dev", "172.16.146.0/24"), Some("tgw-0123"))
            .unwrap();
        let model = &plan.model;

        assert!(plan.attachment.is_some());
        assert_eq!(model.count(ResourceKind::Subnet), 6);
        assert_eq!(model.count(ResourceKind::NatGateway), 0);
        assert_eq!(model.count(ResourceKind::Route), 6);

        for subnet in ["private-subnet-a", "transit-subnet-c"] {
            let t = table("datalake-dev", subnet);
            let route = model.route_for(&t, &Cidr::default_route()).unwrap();
            assert_eq!(
                route.target,
                RouteTarget::TransitGateway(ResourceRef::existing("tgw-0123"))
            );
            let key = Entity::Route(route.clone()).key();
            assert!(model
                .dependencies_of(&key)
                .contains(plan.attachment.as_ref().unwrap()));
        }
    }

    #[test]
    fn test_spoke_attachment_uses_transit_subnets() {
        let plan = planner()
            .plan_vpc(&spoke_vpc("datalake-dev", "172.16.146.0/24"), Some("tgw-0123"))
            .unwrap();
        match plan.model.get(plan.attachment.as_ref().unwrap()) {
            Some(Entity::Attachment(a)) => {
                assert_eq!(a.subnets.len(), 3);
                assert!(a.subnets.iter().all(|s| s.name.contains("transit-subnet")));
                assert!(!a.appliance_mode);
                assert_eq!(a.vpc_cidr, cidr("172.16.146.0/24"));
            }
            other => panic!("expected attachment, got {:?}", other),
        }
    }

    #[test]
    fn test_inspection_routes() {
        let plan = planner()
            .plan_vpc(&inspection_vpc(), Some("tgw-0123"))
            .unwrap();
        let model = &plan.model;
        let vpc = "shared-infra-services";

        assert_eq!(model.count(ResourceKind::NatGateway), 3);
        assert_eq!(model.count(ResourceKind::Eip), 3);
        assert_eq!(model.count(ResourceKind::InternetGateway), 1);

        // 9 tables x 3 transit destinations, 6 NAT defaults, 3 IGW defaults
        assert_eq!(model.count(ResourceKind::Route), 27 + 6 + 3);

        let transit_b = table(vpc, "transit-subnet-b");
        let nat = model.route_for(&transit_b, &Cidr::default_route()).unwrap();
        assert_eq!(
            nat.target,
            RouteTarget::NatGateway(ResourceRef::planned(
                ResourceKind::NatGateway,
                format!("{}/nat-b", vpc)
            ))
        );

        let public_a = table(vpc, "public-subnet-a");
        let onprem = model.route_for(&public_a, &cidr("10.230.0.0/16")).unwrap();
        assert!(matches!(onprem.target, RouteTarget::TransitGateway(_)));
        let igw = model.route_for(&public_a, &Cidr::default_route()).unwrap();
        assert!(matches!(igw.target, RouteTarget::InternetGateway(_)));

        match model.get(plan.attachment.as_ref().unwrap()) {
            Some(Entity::Attachment(a)) => assert!(a.appliance_mode),
            other => panic!("expected attachment, got {:?}", other),
        }
    }

    #[test]
    fn test_inspection_tables_enumerated_private_then_public() {
        let plan = planner()
            .plan_vpc(&inspection_vpc(), Some("tgw-0123"))
            .unwrap();
        let tables: Vec<String> = plan
            .model
            .routes()
            .filter(|r| r.destination == cidr("172.16.128.0/17"))
            .map(|r| r.route_table.to_string())
            .collect();
        assert_eq!(tables.len(), 9);
        assert!(tables[0].contains("private-subnet-a"));
        assert!(tables[3].contains("transit-subnet-a"));
        assert!(tables[6].contains("public-subnet-a"));
    }

    #[test]
    fn test_missing_transit_gateway_skips_attachment() {
        let plan = planner()
            .plan_vpc(&spoke_vpc("datalake-dev", "172.16.146.0/24"), None)
            .unwrap();
        assert!(plan.attachment.is_none());
        assert_eq!(plan.model.count(ResourceKind::Attachment), 0);
        assert_eq!(plan.model.count(ResourceKind::Route), 0);
        assert_eq!(plan.model.count(ResourceKind::Subnet), 6);
    }

    #[test]
    fn test_hub_vpc_plans_transit_gateway() {
        let hub = VpcSpec::spoke("network", cidr("172.16.128.0/24"))
            .with_contiguous(true)
            .with_subnets(SubnetRole::Transit, SubnetAllocation::Mask(28))
            .shared_with("arn:aws:organizations::012345678912:organization/o-sm87ee7sqc");

        let plan = planner().plan_vpc(&hub, None).unwrap();
        let tgw = plan.transit_gateway.clone().unwrap();

        assert_eq!(plan.route_tables.len(), 2);
        assert_eq!(plan.model.count(ResourceKind::ResourceShare), 1);
        match plan.model.get(&tgw) {
            Some(Entity::TransitGateway(t)) => {
                assert!(t.auto_accept_shared_attachments);
                assert!(!t.default_route_table_association);
                assert!(!t.default_route_table_propagation);
            }
            other => panic!("expected transit gateway, got {:?}", other),
        }

        // the attachment points at the planned hub and is emitted after it
        let attachment = plan.attachment.clone().unwrap();
        assert!(plan.model.dependencies_of(&attachment).contains(&tgw));
        let order = ResourcePlanGraph::new(&plan.model).serialize().unwrap();
        let pos = |k: &EntityKey| order.iter().position(|p| &p.key == k).unwrap();
        assert!(pos(&tgw) < pos(&attachment));
    }

    #[test]
    fn test_hub_vpc_reuses_existing_transit_gateway() {
        let hub = inspection_vpc()
            .shared_with("arn:aws:organizations::012345678912:organization/o-sm87ee7sqc");

        let plan = planner().plan_vpc(&hub, Some("tgw-already-created")).unwrap();

        assert!(plan.transit_gateway.is_none());
        assert!(plan.route_tables.is_empty());
        assert_eq!(plan.model.count(ResourceKind::TransitGateway), 0);
        assert_eq!(plan.model.count(ResourceKind::ResourceShare), 0);
        match plan.model.get(plan.attachment.as_ref().unwrap()) {
            Some(Entity::Attachment(a)) => {
                assert_eq!(a.transit_gateway, ResourceRef::existing("tgw-already-created"))
            }
            other => panic!("expected attachment, got {:?}", other),
        }
    }

    #[test]
    fn test_conflicting_destination_rejected() {
        let settings = NetworkSettings::default()
            .with_onprem_cidrs(vec![cidr("10.200.0.0/16"), cidr("10.200.0.0/16")]);
        let planner = RoutePlanner::new(settings, None);
        // identical routes collapse; only conflicting targets are rejected
        assert!(planner.plan_vpc(&inspection_vpc(), Some("tgw-1")).is_ok());

        let settings = NetworkSettings::default().with_onprem_cidrs(vec![Cidr::default_route()]);
        let planner = RoutePlanner::new(settings, None);
        assert!(matches!(
            planner.plan_vpc(&inspection_vpc(), Some("tgw-1")),
            Err(PlannerError::DuplicateRoute { .. })
        ));
    }

    #[test]
    fn test_replanning_is_idempotent() {
        let planner = planner();
        let vpc = inspection_vpc();
        let first = planner.plan_vpc(&vpc, Some("tgw-0123")).unwrap();
        let second = planner.plan_vpc(&vpc, Some("tgw-0123")).unwrap();
        assert_eq!(first.model, second.model);
    }
}
