// Copyright (c) 2025 - Cowboy AI, Inc.
//! Routing phase: associations and transit gateway routes

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::domain::Cidr;
use crate::errors::PlannerResult;
use crate::parameter_store::AttachmentRecord;
use crate::topology::{
    Entity, ResourceRef, RouteTableAssociation, RouteTarget, StaticRoute, TopologyModel,
};

use super::{RoutePlanner, RouteSynthesis, TgwRouteTables, EGRESS_RT, INSPECTION_RT};

impl RoutePlanner {
    /// Stitch persisted attachments together on the hub
    ///
    /// The inspection attachment (the one whose VPC CIDR equals the
    /// inspection VPC's) is associated with `inspection-rt` and becomes the
    /// default route of `egress-rt`. Every other attachment is associated
    /// with `egress-rt` and gets a route for its CIDR in `inspection-rt`.
    ///
    /// Unparseable records are logged and skipped; a record repeated for the
    /// same attachment id is planned once.
    pub fn synthesize_routes(
        &self,
        raw_records: &[String],
        tables: &TgwRouteTables,
    ) -> PlannerResult<RouteSynthesis> {
        let mut synthesis = RouteSynthesis::default();
        let mut seen = HashSet::new();

        for raw in raw_records {
            let record = match AttachmentRecord::parse(raw) {
                Ok(record) => record,
                Err(malformed) => {
                    warn!(
                        record = %malformed.raw,
                        reason = %malformed.reason,
                        "Skipping attachment record"
                    );
                    synthesis.skipped.push(malformed);
                    continue;
                }
            };

            if !seen.insert(record.attachment_id.clone()) {
                debug!(attachment = %record.attachment_id, "Duplicate attachment record");
                continue;
            }

            let attachment = ResourceRef::existing(record.attachment_id.clone());
            if self.is_inspection(&record) {
                associate(&mut synthesis.model, INSPECTION_RT, &tables.inspection, &attachment)?;
                synthesis.model.add_route(StaticRoute::new(
                    EGRESS_RT,
                    tables.egress.clone(),
                    Cidr::default_route(),
                    RouteTarget::Attachment(attachment),
                ))?;
            } else {
                associate(&mut synthesis.model, EGRESS_RT, &tables.egress, &attachment)?;
                synthesis.model.add_route(StaticRoute::new(
                    INSPECTION_RT,
                    tables.inspection.clone(),
                    record.vpc_cidr,
                    RouteTarget::Attachment(attachment),
                ))?;
            }
            synthesis.accepted.push(record);
        }

        info!(
            attachments = synthesis.accepted.len(),
            skipped = synthesis.skipped.len(),
            entities = synthesis.model.len(),
            "Synthesized transit gateway routes"
        );
        Ok(synthesis)
    }

    fn is_inspection(&self, record: &AttachmentRecord) -> bool {
        self.inspection_cidr == Some(record.vpc_cidr)
    }
}

fn associate(
    model: &mut TopologyModel,
    table_name: &str,
    table: &ResourceRef,
    attachment: &ResourceRef,
) -> PlannerResult<()> {
    model.insert(Entity::RouteTableAssociation(RouteTableAssociation {
        name: format!("{}:{}", table_name, attachment),
        attachment: attachment.clone(),
        route_table: table.clone(),
    }))?;
    Ok(())
}
