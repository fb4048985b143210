use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bgp_rs::{AFI, SAFI};
use serde::{self, Deserialize, Deserializer, Serialize, Serializer};

use super::{entity, PeerEndpoint, PeerGroup, RoutingInstance};
use crate::inheritance::{AttributeMap, Entity, EntityRef, Field, FieldValue, Kind, Relation};
use crate::utils::ParseError;

/// AFI/SAFI pair, E.g. IPv4 Unicast
///
/// Parsing accepts the `ipv4`, `ipv6` and `l2vpn` AFIs combined with the
/// `unicast`, `multicast` and `flowspec` (or `flow`) SAFIs. Other families,
/// such as `vpnv4_unicast` or `l2vpn_evpn`, are rejected with a `ParseError`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Family {
    pub afi: AFI,
    pub safi: SAFI,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.afi, self.safi)
    }
}

impl Family {
    pub fn new(afi: AFI, safi: SAFI) -> Self {
        Self { afi, safi }
    }
}

impl FromStr for Family {
    type Err = ParseError;

    /// Accepts "ipv4_unicast" as well as "ipv4 unicast"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', " ");
        let parts: Vec<&str> = normalized.split_whitespace().collect();
        if parts.len() != 2 {
            return Err(ParseError::new(format!(
                "Incorrect family format: '{}'",
                s
            )));
        }
        let afi = match parts[0] {
            "ipv4" => AFI::IPV4,
            "ipv6" => AFI::IPV6,
            "l2vpn" => AFI::L2VPN,
            family => return Err(ParseError::new(format!("Unsupported AFI: '{}'", family))),
        };
        let safi = match parts[1] {
            "unicast" => SAFI::Unicast,
            "multicast" => SAFI::Multicast,
            "flow" | "flowspec" => SAFI::Flowspec,
            sfamily => return Err(ParseError::new(format!("Unsupported SAFI: '{}'", sfamily))),
        };
        Ok(Family::new(afi, safi))
    }
}

impl Serialize for Family {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Family {
    fn deserialize<D>(deserializer: D) -> Result<Family, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Address family configured on a routing instance (optionally per VRF)
#[derive(Clone, Debug)]
pub struct AddressFamily {
    pub routing_instance: Arc<RoutingInstance>,
    pub vrf: Option<String>,
    pub afi_safi: Family,
    pub import_policy: Option<String>,
    pub export_policy: Option<String>,
    pub multipath: Option<bool>,
    pub extra_attributes: AttributeMap,
}

impl AddressFamily {
    /// Unique key, E.g. "edge-01 IPv4 Unicast" or "edge-01 blue IPv4 Unicast"
    pub fn key(&self) -> String {
        match &self.vrf {
            Some(vrf) => format!("{} {} {}", self.routing_instance.device, vrf, self.afi_safi),
            None => format!("{} {}", self.routing_instance.device, self.afi_safi),
        }
    }
}

impl Entity for AddressFamily {
    fn kind(&self) -> Kind {
        Kind::AddressFamily
    }

    fn label(&self) -> String {
        self.key()
    }

    fn field(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::ExportPolicy => FieldValue::text(&self.export_policy),
            Field::ImportPolicy => FieldValue::text(&self.import_policy),
            Field::Multipath => self.multipath.map(FieldValue::Bool),
            _ => None,
        }
    }

    fn related(&self, relation: Relation) -> Option<EntityRef> {
        match relation {
            Relation::RoutingInstance => Some(entity(&self.routing_instance)),
            _ => None,
        }
    }

    fn extra_attributes(&self) -> &AttributeMap {
        &self.extra_attributes
    }
}

/// Address-family settings scoped to a peer group
#[derive(Clone, Debug)]
pub struct PeerGroupAddressFamily {
    pub peer_group: Arc<PeerGroup>,
    /// Routing instance's address family with the same AFI/SAFI
    pub address_family: Option<Arc<AddressFamily>>,
    pub afi_safi: Family,
    pub import_policy: Option<String>,
    pub export_policy: Option<String>,
    pub multipath: Option<bool>,
    pub maximum_prefix: Option<u32>,
    pub extra_attributes: AttributeMap,
}

impl PeerGroupAddressFamily {
    pub fn key(&self) -> String {
        format!("{} {}", self.peer_group.key(), self.afi_safi)
    }
}

impl Entity for PeerGroupAddressFamily {
    fn kind(&self) -> Kind {
        Kind::PeerGroupAddressFamily
    }

    fn label(&self) -> String {
        self.key()
    }

    fn field(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::ExportPolicy => FieldValue::text(&self.export_policy),
            Field::ImportPolicy => FieldValue::text(&self.import_policy),
            Field::Multipath => self.multipath.map(FieldValue::Bool),
            Field::MaximumPrefix => self.maximum_prefix.map(FieldValue::Integer),
            _ => None,
        }
    }

    fn related(&self, relation: Relation) -> Option<EntityRef> {
        match relation {
            Relation::PeerGroup => Some(entity(&self.peer_group)),
            Relation::AddressFamily => self.address_family.as_ref().map(entity),
            _ => None,
        }
    }

    fn extra_attributes(&self) -> &AttributeMap {
        &self.extra_attributes
    }
}

/// Address-family settings scoped to a single peer endpoint
#[derive(Clone, Debug)]
pub struct PeerEndpointAddressFamily {
    pub peer_endpoint: Arc<PeerEndpoint>,
    /// Peer group's address family with the same AFI/SAFI
    pub peer_group_address_family: Option<Arc<PeerGroupAddressFamily>>,
    /// Routing instance's address family with the same AFI/SAFI
    pub address_family: Option<Arc<AddressFamily>>,
    pub afi_safi: Family,
    pub import_policy: Option<String>,
    pub export_policy: Option<String>,
    pub multipath: Option<bool>,
    pub maximum_prefix: Option<u32>,
    pub extra_attributes: AttributeMap,
}

impl PeerEndpointAddressFamily {
    pub fn key(&self) -> String {
        format!("{} {}", self.peer_endpoint.key(), self.afi_safi)
    }
}

impl Entity for PeerEndpointAddressFamily {
    fn kind(&self) -> Kind {
        Kind::PeerEndpointAddressFamily
    }

    fn label(&self) -> String {
        self.key()
    }

    fn field(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::ExportPolicy => FieldValue::text(&self.export_policy),
            Field::ImportPolicy => FieldValue::text(&self.import_policy),
            Field::Multipath => self.multipath.map(FieldValue::Bool),
            Field::MaximumPrefix => self.maximum_prefix.map(FieldValue::Integer),
            _ => None,
        }
    }

    fn related(&self, relation: Relation) -> Option<EntityRef> {
        match relation {
            Relation::PeerEndpoint => Some(entity(&self.peer_endpoint)),
            Relation::PeerGroupAddressFamily => self.peer_group_address_family.as_ref().map(entity),
            Relation::AddressFamily => self.address_family.as_ref().map(entity),
            _ => None,
        }
    }

    fn extra_attributes(&self) -> &AttributeMap {
        &self.extra_attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::value::{Error, StrDeserializer};
    use serde::de::IntoDeserializer;

    #[test]
    fn test_display_family() {
        assert_eq!(
            &Family::new(AFI::IPV4, SAFI::Unicast).to_string(),
            "IPv4 Unicast"
        );
        assert_eq!(
            &Family::new(AFI::IPV6, SAFI::Flowspec).to_string(),
            "IPv6 Flowspec"
        );
    }

    #[test]
    fn test_parse_family() {
        assert_eq!(
            "ipv4_unicast".parse::<Family>().unwrap(),
            Family::new(AFI::IPV4, SAFI::Unicast)
        );
        assert_eq!(
            "IPv6 Multicast".parse::<Family>().unwrap(),
            Family::new(AFI::IPV6, SAFI::Multicast)
        );
        assert!("vpnv4".parse::<Family>().is_err());
        assert_eq!(
            "vpnv4_unicast".parse::<Family>().unwrap_err().to_string(),
            "ParseError: Unsupported AFI: 'vpnv4'"
        );
        assert_eq!(
            "l2vpn_evpn".parse::<Family>().unwrap_err().to_string(),
            "ParseError: Unsupported SAFI: 'evpn'"
        );
        assert!("l2_evpn".parse::<Family>().is_err());
        assert!("ipv4_labeled".parse::<Family>().is_err());
    }

    #[test]
    fn test_deserialize_family() {
        let deserializer: StrDeserializer<Error> = "ipv6 unicast".into_deserializer();
        let family = Family::deserialize(deserializer).unwrap();
        assert_eq!(family, Family::new(AFI::IPV6, SAFI::Unicast));

        let deserializer: StrDeserializer<Error> = "ipv4_flowspec".into_deserializer();
        let family = Family::deserialize(deserializer).unwrap();
        assert_eq!(family, Family::new(AFI::IPV4, SAFI::Flowspec));
    }
}
