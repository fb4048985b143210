use std::collections::HashMap;
use std::sync::Arc;

use ipnetwork::IpNetwork;
use log::{debug, trace};
use serde::Serialize;

use super::{entity, AutonomousSystem, RoutingInstance, Status};
use crate::config::InventoryError;
use crate::inheritance::{AttributeMap, Entity, EntityRef, Field, FieldValue, Kind, Relation};

/// Reusable session settings shared by peer groups
#[derive(Clone, Debug, Default)]
pub struct PeerGroupTemplate {
    pub name: String,
    pub role: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub autonomous_system: Option<Arc<AutonomousSystem>>,
    pub import_policy: Option<String>,
    pub export_policy: Option<String>,
    pub auth_password: Option<String>,
    pub source_ip: Option<IpNetwork>,
    pub extra_attributes: AttributeMap,
}

impl Entity for PeerGroupTemplate {
    fn kind(&self) -> Kind {
        Kind::PeerGroupTemplate
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn field(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::AuthPassword => FieldValue::text(&self.auth_password),
            Field::AutonomousSystem => self
                .autonomous_system
                .as_ref()
                .map(|system| FieldValue::Asn(system.asn)),
            Field::Description => FieldValue::text(&self.description),
            Field::Enabled => self.enabled.map(FieldValue::Bool),
            Field::ExportPolicy => FieldValue::text(&self.export_policy),
            Field::ImportPolicy => FieldValue::text(&self.import_policy),
            Field::SourceIp => self.source_ip.map(FieldValue::Network),
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

/// Bundle of session settings on a routing instance
#[derive(Clone, Debug)]
pub struct PeerGroup {
    pub name: String,
    pub routing_instance: Arc<RoutingInstance>,
    pub template: Option<Arc<PeerGroupTemplate>>,
    pub role: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub autonomous_system: Option<Arc<AutonomousSystem>>,
    pub source_ip: Option<IpNetwork>,
    pub source_interface: Option<String>,
    pub import_policy: Option<String>,
    pub export_policy: Option<String>,
    pub auth_password: Option<String>,
    pub extra_attributes: AttributeMap,
}

impl PeerGroup {
    /// Unique key, "<device>/<name>"
    pub fn key(&self) -> String {
        format!("{}/{}", self.routing_instance.device, self.name)
    }
}

impl Entity for PeerGroup {
    fn kind(&self) -> Kind {
        Kind::PeerGroup
    }

    fn label(&self) -> String {
        self.key()
    }

    fn field(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::AuthPassword => FieldValue::text(&self.auth_password),
            Field::AutonomousSystem => self
                .autonomous_system
                .as_ref()
                .map(|system| FieldValue::Asn(system.asn)),
            Field::Description => FieldValue::text(&self.description),
            Field::Enabled => self.enabled.map(FieldValue::Bool),
            Field::ExportPolicy => FieldValue::text(&self.export_policy),
            Field::ImportPolicy => FieldValue::text(&self.import_policy),
            Field::SourceIp => self.source_ip.map(FieldValue::Network),
            Field::SourceInterface => FieldValue::text(&self.source_interface),
            _ => None,
        }
    }

    fn related(&self, relation: Relation) -> Option<EntityRef> {
        match relation {
            Relation::Template => self.template.as_ref().map(entity),
            Relation::RoutingInstance => Some(entity(&self.routing_instance)),
            _ => None,
        }
    }

    fn extra_attributes(&self) -> &AttributeMap {
        &self.extra_attributes
    }
}

/// One side of a BGP session
///
/// Local endpoints belong to a routing instance; remote endpoints usually
/// only carry an address and an ASN.
#[derive(Clone, Debug, Default)]
pub struct PeerEndpoint {
    pub name: String,
    pub routing_instance: Option<Arc<RoutingInstance>>,
    pub peer_group: Option<Arc<PeerGroup>>,
    pub source_ip: Option<IpNetwork>,
    pub source_interface: Option<String>,
    pub autonomous_system: Option<Arc<AutonomousSystem>>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub import_policy: Option<String>,
    pub export_policy: Option<String>,
    pub auth_password: Option<String>,
    /// Peering (session) this endpoint takes part in
    pub peering: Option<String>,
    /// Key of the endpoint on the other side of the peering
    pub peer: Option<String>,
    pub extra_attributes: AttributeMap,
}

impl PeerEndpoint {
    /// Unique key, "<device>/<name>" for local endpoints
    pub fn key(&self) -> String {
        match &self.routing_instance {
            Some(instance) => format!("{}/{}", instance.device, self.name),
            None => self.name.clone(),
        }
    }
}

impl Entity for PeerEndpoint {
    fn kind(&self) -> Kind {
        Kind::PeerEndpoint
    }

    fn label(&self) -> String {
        self.key()
    }

    fn field(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::AuthPassword => FieldValue::text(&self.auth_password),
            Field::AutonomousSystem => self
                .autonomous_system
                .as_ref()
                .map(|system| FieldValue::Asn(system.asn)),
            Field::Description => FieldValue::text(&self.description),
            Field::Enabled => self.enabled.map(FieldValue::Bool),
            Field::ExportPolicy => FieldValue::text(&self.export_policy),
            Field::ImportPolicy => FieldValue::text(&self.import_policy),
            Field::SourceIp => self.source_ip.map(FieldValue::Network),
            Field::SourceInterface => FieldValue::text(&self.source_interface),
            _ => None,
        }
    }

    fn related(&self, relation: Relation) -> Option<EntityRef> {
        match relation {
            Relation::PeerGroup => self.peer_group.as_ref().map(entity),
            Relation::RoutingInstance => self.routing_instance.as_ref().map(entity),
            _ => None,
        }
    }

    fn extra_attributes(&self) -> &AttributeMap {
        &self.extra_attributes
    }
}

/// BGP session between (at most) two endpoints
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Peering {
    pub name: String,
    pub status: Status,
}

/// Point each endpoint's `peer` at the other endpoint of its peering
///
/// Endpoints of a peering with a single endpoint (or none) get their `peer`
/// cleared. A peering can't have more than two endpoints.
pub fn synchronize_peers(endpoints: &mut [PeerEndpoint]) -> Result<(), InventoryError> {
    let mut peerings: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, endpoint) in endpoints.iter_mut().enumerate() {
        endpoint.peer = None;
        if let Some(peering) = &endpoint.peering {
            peerings.entry(peering.clone()).or_default().push(i);
        }
    }
    for (peering, members) in peerings {
        match members.as_slice() {
            &[a, b] => {
                let (key_a, key_b) = (endpoints[a].key(), endpoints[b].key());
                trace!("Peering {}: {} <-> {}", peering, key_a, key_b);
                endpoints[a].peer = Some(key_b);
                endpoints[b].peer = Some(key_a);
            }
            [_] => debug!("Peering {} has a single endpoint", peering),
            _ => {
                return Err(InventoryError::PeeringOverflow(peering, members.len()));
            }
        }
    }
    Ok(())
}
