//! Field inheritance for BGP configuration objects
//!
//! An object may leave a field unset and pick up its effective value from a
//! declared chain of related objects (peer-group, template, routing-instance).
//! Scalar fields resolve first-match-wins across the declared paths, while the
//! free-form `extra_attributes` documents are deep-merged along the whole chain.
mod merge;
mod path;
mod resolver;
mod schema;
mod walker;

pub use merge::deep_merge;
pub use path::{Path, RelationPath, MAX_PATH_DEPTH};
pub use resolver::{FieldReport, Resolved, Resolver};
pub use schema::{KindSchema, Schema, SchemaError};
pub use walker::{reach, walk, Found};

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;

use ipnetwork::IpNetwork;
use serde::{Serialize, Serializer};

use crate::utils::u32_to_dotted;

/// Free-form, arbitrarily nested configuration document
pub type AttributeMap = serde_json::Map<String, serde_json::Value>;

/// Shared handle to any object taking part in inheritance
pub type EntityRef = Arc<dyn Entity>;

/// Read-only access the resolver needs from a configuration object
pub trait Entity: fmt::Debug {
    fn kind(&self) -> Kind;
    /// Human readable identifier, unique within the kind
    fn label(&self) -> String;
    /// Local (stored) value of a field, `None` when unset
    fn field(&self, field: Field) -> Option<FieldValue>;
    /// Follow a single relationship hop, `None` when the relationship is unset
    fn related(&self, relation: Relation) -> Option<EntityRef>;
    fn extra_attributes(&self) -> &AttributeMap;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    AutonomousSystem,
    RoutingInstance,
    PeerGroupTemplate,
    PeerGroup,
    PeerEndpoint,
    AddressFamily,
    PeerGroupAddressFamily,
    PeerEndpointAddressFamily,
}

impl Kind {
    pub const ALL: [Kind; 8] = [
        Kind::AutonomousSystem,
        Kind::RoutingInstance,
        Kind::PeerGroupTemplate,
        Kind::PeerGroup,
        Kind::PeerEndpoint,
        Kind::AddressFamily,
        Kind::PeerGroupAddressFamily,
        Kind::PeerEndpointAddressFamily,
    ];

    pub fn as_str(self) -> &'static str {
        use Kind::*;
        match self {
            AutonomousSystem => "autonomous_system",
            RoutingInstance => "routing_instance",
            PeerGroupTemplate => "peer_group_template",
            PeerGroup => "peer_group",
            PeerEndpoint => "peer_endpoint",
            AddressFamily => "address_family",
            PeerGroupAddressFamily => "peer_group_address_family",
            PeerEndpointAddressFamily => "peer_endpoint_address_family",
        }
    }

    /// Local fields stored on objects of this kind
    pub fn fields(self) -> &'static [Field] {
        use Field::*;
        match self {
            Kind::AutonomousSystem => &[Description],
            Kind::RoutingInstance => &[AutonomousSystem, RouterId, Description],
            Kind::PeerGroupTemplate => &[
                AuthPassword,
                AutonomousSystem,
                Description,
                Enabled,
                ExportPolicy,
                ImportPolicy,
                SourceIp,
            ],
            Kind::PeerGroup | Kind::PeerEndpoint => &[
                AuthPassword,
                AutonomousSystem,
                Description,
                Enabled,
                ExportPolicy,
                ImportPolicy,
                SourceIp,
                SourceInterface,
            ],
            Kind::AddressFamily => &[ExportPolicy, ImportPolicy, Multipath],
            Kind::PeerGroupAddressFamily | Kind::PeerEndpointAddressFamily => {
                &[ExportPolicy, ImportPolicy, Multipath, MaximumPrefix]
            }
        }
    }

    /// Relationship hops available from this kind, with the kind they lead to
    pub fn relations(self) -> &'static [(Relation, Kind)] {
        match self {
            Kind::AutonomousSystem | Kind::RoutingInstance | Kind::PeerGroupTemplate => &[],
            Kind::PeerGroup => &[
                (Relation::Template, Kind::PeerGroupTemplate),
                (Relation::RoutingInstance, Kind::RoutingInstance),
            ],
            Kind::PeerEndpoint => &[
                (Relation::PeerGroup, Kind::PeerGroup),
                (Relation::RoutingInstance, Kind::RoutingInstance),
            ],
            Kind::AddressFamily => &[(Relation::RoutingInstance, Kind::RoutingInstance)],
            Kind::PeerGroupAddressFamily => &[
                (Relation::PeerGroup, Kind::PeerGroup),
                (Relation::AddressFamily, Kind::AddressFamily),
            ],
            Kind::PeerEndpointAddressFamily => &[
                (Relation::PeerEndpoint, Kind::PeerEndpoint),
                (
                    Relation::PeerGroupAddressFamily,
                    Kind::PeerGroupAddressFamily,
                ),
                (Relation::AddressFamily, Kind::AddressFamily),
            ],
        }
    }

    /// Kind reached by following `relation` from this kind
    pub fn target(self, relation: Relation) -> Option<Kind> {
        self.relations()
            .iter()
            .find(|(r, _)| *r == relation)
            .map(|(_, kind)| *kind)
    }

    pub fn has_field(self, field: Field) -> bool {
        self.fields().contains(&field)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Kind {
    type Err = String;

    /// Accepts snake or kebab case, singular or plural ("peer-endpoints")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        let singular = normalized
            .strip_suffix("ies")
            .map(|stem| format!("{}y", stem))
            .or_else(|| normalized.strip_suffix('s').map(String::from));
        Kind::ALL
            .iter()
            .find(|kind| {
                kind.as_str() == normalized || Some(kind.as_str()) == singular.as_deref()
            })
            .copied()
            .ok_or_else(|| format!("Unsupported kind: '{}'", s))
    }
}

impl Serialize for Kind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Inheritable field names
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    AuthPassword,
    AutonomousSystem,
    Description,
    Enabled,
    ExportPolicy,
    ImportPolicy,
    SourceIp,
    SourceInterface,
    RouterId,
    Multipath,
    MaximumPrefix,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        use Field::*;
        match self {
            AuthPassword => "auth_password",
            AutonomousSystem => "autonomous_system",
            Description => "description",
            Enabled => "enabled",
            ExportPolicy => "export_policy",
            ImportPolicy => "import_policy",
            SourceIp => "source_ip",
            SourceInterface => "source_interface",
            RouterId => "router_id",
            Multipath => "multipath",
            MaximumPrefix => "maximum_prefix",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Field::*;
        let field = match s {
            "auth_password" => AuthPassword,
            "autonomous_system" => AutonomousSystem,
            "description" => Description,
            "enabled" => Enabled,
            "export_policy" => ExportPolicy,
            "import_policy" => ImportPolicy,
            "source_ip" | "ip" => SourceIp,
            "source_interface" => SourceInterface,
            "router_id" => RouterId,
            "multipath" => Multipath,
            "maximum_prefix" => MaximumPrefix,
            _ => return Err(format!("Unsupported field: '{}'", s)),
        };
        Ok(field)
    }
}

/// Relationship hops between configuration objects
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    Template,
    RoutingInstance,
    PeerGroup,
    PeerEndpoint,
    AddressFamily,
    PeerGroupAddressFamily,
}

impl Relation {
    pub fn as_str(self) -> &'static str {
        use Relation::*;
        match self {
            Template => "template",
            RoutingInstance => "routing_instance",
            PeerGroup => "peer_group",
            PeerEndpoint => "peer_endpoint",
            AddressFamily => "address_family",
            PeerGroupAddressFamily => "peer_group_address_family",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Relation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Relation::*;
        let relation = match s {
            "template" => Template,
            "routing_instance" => RoutingInstance,
            "peer_group" => PeerGroup,
            "peer_endpoint" => PeerEndpoint,
            "address_family" => AddressFamily,
            "peer_group_address_family" => PeerGroupAddressFamily,
            _ => return Err(format!("Unsupported relation: '{}'", s)),
        };
        Ok(relation)
    }
}

/// Value of a single configuration field
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Bool(bool),
    Integer(u32),
    Text(String),
    Asn(u32),
    Address(IpAddr),
    Network(IpNetwork),
}

impl FieldValue {
    /// Empty text is stored by some sources in place of "unset"
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(text) if text.is_empty())
    }

    pub fn text(value: &Option<String>) -> Option<Self> {
        value.clone().map(FieldValue::Text)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldValue::Bool(value) => write!(f, "{}", value),
            FieldValue::Integer(value) => write!(f, "{}", value),
            FieldValue::Text(value) => write!(f, "{}", value),
            FieldValue::Asn(asn) => write!(f, "{}", u32_to_dotted(*asn, '.')),
            FieldValue::Address(addr) => write!(f, "{}", addr),
            FieldValue::Network(network) => write!(f, "{}", network),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FieldValue::Bool(value) => serializer.serialize_bool(*value),
            FieldValue::Integer(value) | FieldValue::Asn(value) => serializer.serialize_u32(*value),
            FieldValue::Text(value) => serializer.serialize_str(value),
            FieldValue::Address(addr) => serializer.collect_str(addr),
            FieldValue::Network(network) => serializer.collect_str(network),
        }
    }
}
