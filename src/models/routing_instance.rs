use std::net::IpAddr;
use std::sync::Arc;

use super::{AutonomousSystem, Status};
use crate::inheritance::{AttributeMap, Entity, EntityRef, Field, FieldValue, Kind, Relation};

/// BGP process running on a device
#[derive(Clone, Debug)]
pub struct RoutingInstance {
    pub device: String,
    pub autonomous_system: Arc<AutonomousSystem>,
    pub router_id: Option<IpAddr>,
    pub description: Option<String>,
    pub status: Status,
    pub extra_attributes: AttributeMap,
}

impl Entity for RoutingInstance {
    fn kind(&self) -> Kind {
        Kind::RoutingInstance
    }

    fn label(&self) -> String {
        self.device.clone()
    }

    fn field(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::AutonomousSystem => Some(FieldValue::Asn(self.autonomous_system.asn)),
            Field::RouterId => self.router_id.map(FieldValue::Address),
            Field::Description => FieldValue::text(&self.description),
            _ => None,
        }
    }

    fn related(&self, _relation: Relation) -> Option<EntityRef> {
        None
    }

    fn extra_attributes(&self) -> &AttributeMap {
        &self.extra_attributes
    }
}
