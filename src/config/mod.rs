mod file;

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::sync::Arc;

use log::{debug, info};
use thiserror::Error;

use crate::inheritance::{EntityRef, Kind};
use crate::models::{
    synchronize_peers, AddressFamily, AutonomousSystem, AutonomousSystemRange, Family,
    PeerEndpoint, PeerEndpointAddressFamily, PeerGroup, PeerGroupAddressFamily,
    PeerGroupTemplate, Peering, RoutingInstance,
};
use crate::utils::{asn_from_dotted, available_asns, AsnSlot};

use file::{AsnSpec, InventorySpec};

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Unable to read inventory: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid inventory: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{kind} '{key}' references unknown {target} '{reference}'")]
    MissingReference {
        kind: Kind,
        key: String,
        target: &'static str,
        reference: String,
    },
    #[error("Duplicate {0} '{1}'")]
    Duplicate(&'static str, String),
    #[error("Invalid {0} '{1}': {2}")]
    InvalidValue(&'static str, String, String),
    #[error("Peering '{0}' has {1} endpoints, a peering joins at most 2")]
    PeeringOverflow(String, usize),
    #[error("Peer endpoint '{0}' needs a routing instance, or both a source IP and an autonomous system")]
    IncompleteEndpoint(String),
}

fn insert_unique<T>(
    map: &mut BTreeMap<String, T>,
    what: &'static str,
    key: String,
    item: T,
) -> Result<(), InventoryError> {
    if map.contains_key(&key) {
        return Err(InventoryError::Duplicate(what, key));
    }
    map.insert(key, item);
    Ok(())
}

/// In-memory, read-only graph of every configured BGP object
///
/// Objects reference their parents through `Arc`s, so any object handed out
/// stays usable for resolution on its own.
#[derive(Debug, Default)]
pub struct Inventory {
    autonomous_systems: BTreeMap<u32, Arc<AutonomousSystem>>,
    asn_ranges: BTreeMap<String, AutonomousSystemRange>,
    routing_instances: BTreeMap<String, Arc<RoutingInstance>>,
    peer_group_templates: BTreeMap<String, Arc<PeerGroupTemplate>>,
    peer_groups: BTreeMap<String, Arc<PeerGroup>>,
    peer_endpoints: BTreeMap<String, Arc<PeerEndpoint>>,
    peerings: BTreeMap<String, Peering>,
    address_families: BTreeMap<String, Arc<AddressFamily>>,
    peer_group_address_families: BTreeMap<String, Arc<PeerGroupAddressFamily>>,
    peer_endpoint_address_families: BTreeMap<String, Arc<PeerEndpointAddressFamily>>,
}

impl Inventory {
    /// Parse a TOML inventory file and build the object graph
    pub fn from_file(path: &str) -> Result<Self, InventoryError> {
        let spec = InventorySpec::from_file(path)?;
        let inventory = Self::from_spec(spec)?;
        info!("Loaded inventory from {}", path);
        Ok(inventory)
    }

    pub fn from_toml(contents: &str) -> Result<Self, InventoryError> {
        Self::from_spec(InventorySpec::from_toml(contents)?)
    }

    fn from_spec(spec: InventorySpec) -> Result<Self, InventoryError> {
        let mut inventory = Self::default();

        for system in spec.autonomous_systems {
            let asn = system.asn.0;
            if inventory.autonomous_systems.contains_key(&asn) {
                return Err(InventoryError::Duplicate(
                    "autonomous system",
                    asn.to_string(),
                ));
            }
            let mut record = AutonomousSystem::new(asn);
            record.description = system.description;
            record.status = system.status;
            inventory.autonomous_systems.insert(asn, Arc::new(record));
        }

        for range in spec.asn_ranges {
            if range.asn_min.0 > range.asn_max.0 {
                return Err(InventoryError::InvalidValue(
                    "ASN range",
                    range.name,
                    format!("{} is above {}", range.asn_min.0, range.asn_max.0),
                ));
            }
            let record = AutonomousSystemRange {
                name: range.name.clone(),
                asn_min: range.asn_min.0,
                asn_max: range.asn_max.0,
                description: range.description,
            };
            insert_unique(&mut inventory.asn_ranges, "ASN range", range.name, record)?;
        }

        for instance in spec.routing_instances {
            let autonomous_system = inventory.asn(
                Kind::RoutingInstance,
                &instance.device,
                instance.autonomous_system,
            )?;
            let record = RoutingInstance {
                device: instance.device.clone(),
                autonomous_system,
                router_id: instance.router_id,
                description: instance.description,
                status: instance.status,
                extra_attributes: instance.extra_attributes,
            };
            insert_unique(
                &mut inventory.routing_instances,
                "routing instance",
                instance.device,
                Arc::new(record),
            )?;
        }

        for template in spec.peer_group_templates {
            let session = template.session;
            let autonomous_system =
                inventory.maybe_asn(Kind::PeerGroupTemplate, &template.name, session.autonomous_system)?;
            let record = PeerGroupTemplate {
                name: template.name.clone(),
                role: template.role,
                description: session.description,
                enabled: session.enabled,
                autonomous_system,
                import_policy: session.import_policy,
                export_policy: session.export_policy,
                auth_password: session.auth_password,
                source_ip: session.source_ip,
                extra_attributes: session.extra_attributes,
            };
            insert_unique(
                &mut inventory.peer_group_templates,
                "peer group template",
                template.name,
                Arc::new(record),
            )?;
        }

        for group in spec.peer_groups {
            let key = format!("{}/{}", group.device, group.name);
            let session = group.session;
            let routing_instance =
                inventory.routing_instance_ref(Kind::PeerGroup, &key, &group.device)?;
            let template = match &group.template {
                Some(name) => Some(
                    inventory
                        .peer_group_templates
                        .get(name)
                        .cloned()
                        .ok_or_else(|| InventoryError::MissingReference {
                            kind: Kind::PeerGroup,
                            key: key.clone(),
                            target: "peer group template",
                            reference: name.clone(),
                        })?,
                ),
                None => None,
            };
            let autonomous_system =
                inventory.maybe_asn(Kind::PeerGroup, &key, session.autonomous_system)?;
            let record = PeerGroup {
                name: group.name,
                routing_instance,
                template,
                role: group.role,
                description: session.description,
                enabled: session.enabled,
                autonomous_system,
                source_ip: session.source_ip,
                source_interface: group.source_interface,
                import_policy: session.import_policy,
                export_policy: session.export_policy,
                auth_password: session.auth_password,
                extra_attributes: session.extra_attributes,
            };
            insert_unique(&mut inventory.peer_groups, "peer group", key, Arc::new(record))?;
        }

        for peering in spec.peerings {
            let record = Peering {
                name: peering.name.clone(),
                status: peering.status,
            };
            insert_unique(&mut inventory.peerings, "peering", peering.name, record)?;
        }

        let mut endpoints: Vec<PeerEndpoint> = Vec::with_capacity(spec.peer_endpoints.len());
        let mut endpoint_keys = BTreeSet::new();
        for endpoint in spec.peer_endpoints {
            let key = match &endpoint.device {
                Some(device) => format!("{}/{}", device, endpoint.name),
                None => endpoint.name.clone(),
            };
            let session = endpoint.session;
            let routing_instance = match &endpoint.device {
                Some(device) => Some(inventory.routing_instance_ref(
                    Kind::PeerEndpoint,
                    &key,
                    device,
                )?),
                None => None,
            };
            let peer_group = match (&endpoint.peer_group, &endpoint.device) {
                (Some(name), Some(device)) => {
                    let group_key = format!("{}/{}", device, name);
                    Some(inventory.peer_groups.get(&group_key).cloned().ok_or_else(|| {
                        InventoryError::MissingReference {
                            kind: Kind::PeerEndpoint,
                            key: key.clone(),
                            target: "peer group",
                            reference: group_key.clone(),
                        }
                    })?)
                }
                (Some(name), None) => {
                    return Err(InventoryError::InvalidValue(
                        "peer endpoint",
                        key,
                        format!("peer group '{}' given without a device", name),
                    ));
                }
                (None, _) => None,
            };
            if let Some(peering) = &endpoint.peering {
                if !inventory.peerings.contains_key(peering) {
                    return Err(InventoryError::MissingReference {
                        kind: Kind::PeerEndpoint,
                        key,
                        target: "peering",
                        reference: peering.clone(),
                    });
                }
            }
            let autonomous_system =
                inventory.maybe_asn(Kind::PeerEndpoint, &key, session.autonomous_system)?;
            if routing_instance.is_none()
                && (session.source_ip.is_none() || autonomous_system.is_none())
            {
                return Err(InventoryError::IncompleteEndpoint(key));
            }
            if !endpoint_keys.insert(key.clone()) {
                return Err(InventoryError::Duplicate("peer endpoint", key));
            }
            endpoints.push(PeerEndpoint {
                name: endpoint.name,
                routing_instance,
                peer_group,
                source_ip: session.source_ip,
                source_interface: endpoint.source_interface,
                autonomous_system,
                description: session.description,
                enabled: session.enabled,
                import_policy: session.import_policy,
                export_policy: session.export_policy,
                auth_password: session.auth_password,
                peering: endpoint.peering,
                peer: None,
                extra_attributes: session.extra_attributes,
            });
        }
        synchronize_peers(&mut endpoints)?;
        inventory.peer_endpoints = endpoints
            .into_iter()
            .map(|endpoint| (endpoint.key(), Arc::new(endpoint)))
            .collect();

        for family in spec.address_families {
            let routing_instance = inventory.routing_instance_ref(
                Kind::AddressFamily,
                &family.device,
                &family.device,
            )?;
            let record = AddressFamily {
                routing_instance,
                vrf: family.vrf,
                afi_safi: family.afi_safi,
                import_policy: family.settings.import_policy,
                export_policy: family.settings.export_policy,
                multipath: family.settings.multipath,
                extra_attributes: family.settings.extra_attributes,
            };
            insert_unique(
                &mut inventory.address_families,
                "address family",
                record.key(),
                Arc::new(record),
            )?;
        }

        for family in spec.peer_group_address_families {
            let group_key = format!("{}/{}", family.device, family.peer_group);
            let peer_group = inventory.peer_groups.get(&group_key).cloned().ok_or_else(|| {
                InventoryError::MissingReference {
                    kind: Kind::PeerGroupAddressFamily,
                    key: format!("{} {}", group_key, family.afi_safi),
                    target: "peer group",
                    reference: group_key.clone(),
                }
            })?;
            let address_family = inventory.instance_family(&family.device, family.afi_safi);
            let record = PeerGroupAddressFamily {
                peer_group,
                address_family,
                afi_safi: family.afi_safi,
                import_policy: family.settings.import_policy,
                export_policy: family.settings.export_policy,
                multipath: family.settings.multipath,
                maximum_prefix: family.maximum_prefix,
                extra_attributes: family.settings.extra_attributes,
            };
            insert_unique(
                &mut inventory.peer_group_address_families,
                "peer group address family",
                record.key(),
                Arc::new(record),
            )?;
        }

        for family in spec.peer_endpoint_address_families {
            let endpoint_key = match &family.device {
                Some(device) => format!("{}/{}", device, family.peer_endpoint),
                None => family.peer_endpoint.clone(),
            };
            let peer_endpoint = inventory
                .peer_endpoints
                .get(&endpoint_key)
                .cloned()
                .ok_or_else(|| InventoryError::MissingReference {
                    kind: Kind::PeerEndpointAddressFamily,
                    key: format!("{} {}", endpoint_key, family.afi_safi),
                    target: "peer endpoint",
                    reference: endpoint_key.clone(),
                })?;
            let peer_group_address_family = peer_endpoint.peer_group.as_ref().and_then(|group| {
                inventory
                    .peer_group_address_families
                    .get(&format!("{} {}", group.key(), family.afi_safi))
                    .cloned()
            });
            let address_family = peer_endpoint
                .routing_instance
                .as_ref()
                .and_then(|instance| inventory.instance_family(&instance.device, family.afi_safi));
            let record = PeerEndpointAddressFamily {
                peer_endpoint,
                peer_group_address_family,
                address_family,
                afi_safi: family.afi_safi,
                import_policy: family.settings.import_policy,
                export_policy: family.settings.export_policy,
                multipath: family.settings.multipath,
                maximum_prefix: family.maximum_prefix,
                extra_attributes: family.settings.extra_attributes,
            };
            insert_unique(
                &mut inventory.peer_endpoint_address_families,
                "peer endpoint address family",
                record.key(),
                Arc::new(record),
            )?;
        }

        for (kind, count) in inventory.summary() {
            debug!("Loaded {} {} records", count, kind);
        }
        Ok(inventory)
    }

    fn asn(
        &self,
        kind: Kind,
        key: &str,
        asn: AsnSpec,
    ) -> Result<Arc<AutonomousSystem>, InventoryError> {
        self.autonomous_systems
            .get(&asn.0)
            .cloned()
            .ok_or_else(|| InventoryError::MissingReference {
                kind,
                key: key.to_string(),
                target: "autonomous system",
                reference: asn.0.to_string(),
            })
    }

    fn maybe_asn(
        &self,
        kind: Kind,
        key: &str,
        asn: Option<AsnSpec>,
    ) -> Result<Option<Arc<AutonomousSystem>>, InventoryError> {
        asn.map(|asn| self.asn(kind, key, asn)).transpose()
    }

    fn routing_instance_ref(
        &self,
        kind: Kind,
        key: &str,
        device: &str,
    ) -> Result<Arc<RoutingInstance>, InventoryError> {
        self.routing_instances
            .get(device)
            .cloned()
            .ok_or_else(|| InventoryError::MissingReference {
                kind,
                key: key.to_string(),
                target: "routing instance",
                reference: device.to_string(),
            })
    }

    // Global (non-VRF) address family of a routing instance
    fn instance_family(&self, device: &str, family: Family) -> Option<Arc<AddressFamily>> {
        self.address_families
            .get(&format!("{} {}", device, family))
            .cloned()
    }

    pub fn autonomous_system(&self, asn: u32) -> Option<Arc<AutonomousSystem>> {
        self.autonomous_systems.get(&asn).cloned()
    }

    pub fn autonomous_systems(&self) -> impl Iterator<Item = &Arc<AutonomousSystem>> {
        self.autonomous_systems.values()
    }

    /// Allocated ASNs within `range`, ascending
    pub fn autonomous_systems_in(
        &self,
        range: &AutonomousSystemRange,
    ) -> Vec<Arc<AutonomousSystem>> {
        self.autonomous_systems
            .range(range.asn_min..=range.asn_max)
            .map(|(_, system)| Arc::clone(system))
            .collect()
    }

    pub fn asn_range(&self, name: &str) -> Option<&AutonomousSystemRange> {
        self.asn_ranges.get(name)
    }

    pub fn asn_ranges(&self) -> impl Iterator<Item = &AutonomousSystemRange> {
        self.asn_ranges.values()
    }

    /// Allocated and free ASNs of the named range
    pub fn available_asns(&self, name: &str) -> Option<Vec<AsnSlot>> {
        let range = self.asn_range(name)?;
        let allocated = self.autonomous_systems_in(range);
        Some(available_asns(range.asn_min, range.asn_max, &allocated))
    }

    pub fn routing_instance(&self, device: &str) -> Option<Arc<RoutingInstance>> {
        self.routing_instances.get(device).cloned()
    }

    pub fn peer_group_template(&self, name: &str) -> Option<Arc<PeerGroupTemplate>> {
        self.peer_group_templates.get(name).cloned()
    }

    pub fn peer_group(&self, device: &str, name: &str) -> Option<Arc<PeerGroup>> {
        self.peer_groups.get(&format!("{}/{}", device, name)).cloned()
    }

    /// Look up an endpoint by key ("<device>/<name>", or just the name for
    /// remote endpoints)
    pub fn peer_endpoint(&self, key: &str) -> Option<Arc<PeerEndpoint>> {
        self.peer_endpoints.get(key).cloned()
    }

    pub fn peer_endpoints(&self) -> impl Iterator<Item = &Arc<PeerEndpoint>> {
        self.peer_endpoints.values()
    }

    pub fn peering(&self, name: &str) -> Option<&Peering> {
        self.peerings.get(name)
    }

    pub fn peerings(&self) -> impl Iterator<Item = &Peering> {
        self.peerings.values()
    }

    /// Every object of `kind`, sorted by key
    pub fn entities(&self, kind: Kind) -> Vec<EntityRef> {
        fn collect<K, T: crate::inheritance::Entity + 'static>(
            map: &BTreeMap<K, Arc<T>>,
        ) -> Vec<EntityRef> {
            map.values().map(|item| Arc::clone(item) as EntityRef).collect()
        }
        match kind {
            Kind::AutonomousSystem => collect(&self.autonomous_systems),
            Kind::RoutingInstance => collect(&self.routing_instances),
            Kind::PeerGroupTemplate => collect(&self.peer_group_templates),
            Kind::PeerGroup => collect(&self.peer_groups),
            Kind::PeerEndpoint => collect(&self.peer_endpoints),
            Kind::AddressFamily => collect(&self.address_families),
            Kind::PeerGroupAddressFamily => collect(&self.peer_group_address_families),
            Kind::PeerEndpointAddressFamily => collect(&self.peer_endpoint_address_families),
        }
    }

    /// Single object of `kind` by key (ASNs may be given as "AS65000" or asdot)
    pub fn entity(&self, kind: Kind, key: &str) -> Option<EntityRef> {
        fn get<T: crate::inheritance::Entity + 'static>(
            map: &BTreeMap<String, Arc<T>>,
            key: &str,
        ) -> Option<EntityRef> {
            map.get(key).map(|item| Arc::clone(item) as EntityRef)
        }
        match kind {
            Kind::AutonomousSystem => {
                let key = key.trim();
                let asn = asn_from_dotted(key.strip_prefix("AS").unwrap_or(key)).ok()?;
                self.autonomous_systems
                    .get(&asn)
                    .map(|system| Arc::clone(system) as EntityRef)
            }
            Kind::RoutingInstance => get(&self.routing_instances, key),
            Kind::PeerGroupTemplate => get(&self.peer_group_templates, key),
            Kind::PeerGroup => get(&self.peer_groups, key),
            Kind::PeerEndpoint => get(&self.peer_endpoints, key),
            Kind::AddressFamily => get(&self.address_families, key),
            Kind::PeerGroupAddressFamily => get(&self.peer_group_address_families, key),
            Kind::PeerEndpointAddressFamily => get(&self.peer_endpoint_address_families, key),
        }
    }

    /// Number of objects per kind
    pub fn summary(&self) -> Vec<(Kind, usize)> {
        Kind::ALL
            .iter()
            .map(|kind| {
                let count = match kind {
                    Kind::AutonomousSystem => self.autonomous_systems.len(),
                    Kind::RoutingInstance => self.routing_instances.len(),
                    Kind::PeerGroupTemplate => self.peer_group_templates.len(),
                    Kind::PeerGroup => self.peer_groups.len(),
                    Kind::PeerEndpoint => self.peer_endpoints.len(),
                    Kind::AddressFamily => self.address_families.len(),
                    Kind::PeerGroupAddressFamily => self.peer_group_address_families.len(),
                    Kind::PeerEndpointAddressFamily => {
                        self.peer_endpoint_address_families.len()
                    }
                };
                (*kind, count)
            })
            .collect()
    }
}
