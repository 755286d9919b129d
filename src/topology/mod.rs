// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Model
//!
//! The in-memory graph the planner builds: VPCs, subnets, route tables,
//! gateways, the transit gateway with its attachments and associations,
//! and static routes, with explicit dependency edges between them.

pub mod entity;
pub mod model;

pub use entity::{
    Attachment, Eip, Entity, EntityKey, InternetGateway, NatGateway, ResourceRef, ResourceShare,
    RouteTable, RouteTableAssociation, RouteTableScope, RouteTarget, StaticRoute, TransitGateway,
    Vpc,
};
pub use model::TopologyModel;
