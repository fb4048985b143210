use std::fs::File;
use std::io::Read;
use std::net::IpAddr;

use ipnetwork::IpNetwork;
use serde::{self, Deserialize, Deserializer};

use super::InventoryError;
use crate::inheritance::AttributeMap;
use crate::models::{Family, Status};
use crate::utils::asn_from_dotted;

struct Defaults {}

impl Defaults {
    fn status() -> Status {
        Status::Active
    }
}

/// ASN given either as an integer or in asdot notation ("65000.100")
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct AsnSpec(pub(super) u32);

impl<'de> Deserialize<'de> for AsnSpec {
    fn deserialize<D>(deserializer: D) -> Result<AsnSpec, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Plain(u32),
            Dotted(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Plain(asn) => Ok(AsnSpec(asn)),
            Raw::Dotted(asn) => asn_from_dotted(&asn)
                .map(AsnSpec)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AutonomousSystemSpec {
    pub(super) asn: AsnSpec,
    pub(super) description: Option<String>,
    #[serde(default = "Defaults::status")]
    pub(super) status: Status,
}

#[derive(Debug, Deserialize)]
pub(super) struct AsnRangeSpec {
    pub(super) name: String,
    pub(super) asn_min: AsnSpec,
    pub(super) asn_max: AsnSpec,
    pub(super) description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RoutingInstanceSpec {
    pub(super) device: String,
    pub(super) autonomous_system: AsnSpec,
    pub(super) router_id: Option<IpAddr>,
    pub(super) description: Option<String>,
    #[serde(default = "Defaults::status")]
    pub(super) status: Status,
    #[serde(default)]
    pub(super) extra_attributes: AttributeMap,
}

/// Session settings common to templates, peer groups, and endpoints
///
/// Anything left out here is unset and may be inherited.
#[derive(Debug, Default, Deserialize)]
pub(super) struct SessionSpec {
    pub(super) description: Option<String>,
    pub(super) enabled: Option<bool>,
    pub(super) autonomous_system: Option<AsnSpec>,
    pub(super) import_policy: Option<String>,
    pub(super) export_policy: Option<String>,
    pub(super) auth_password: Option<String>,
    pub(super) source_ip: Option<IpNetwork>,
    #[serde(default)]
    pub(super) extra_attributes: AttributeMap,
}

#[derive(Debug, Deserialize)]
pub(super) struct PeerGroupTemplateSpec {
    pub(super) name: String,
    pub(super) role: Option<String>,
    #[serde(flatten)]
    pub(super) session: SessionSpec,
}

#[derive(Debug, Deserialize)]
pub(super) struct PeerGroupSpec {
    pub(super) device: String,
    pub(super) name: String,
    pub(super) template: Option<String>,
    pub(super) role: Option<String>,
    pub(super) source_interface: Option<String>,
    #[serde(flatten)]
    pub(super) session: SessionSpec,
}

#[derive(Debug, Deserialize)]
pub(super) struct PeerEndpointSpec {
    // Local endpoints live on a device's routing instance
    pub(super) device: Option<String>,
    pub(super) name: String,
    // Name of a peer group on the same device
    pub(super) peer_group: Option<String>,
    pub(super) peering: Option<String>,
    pub(super) source_interface: Option<String>,
    #[serde(flatten)]
    pub(super) session: SessionSpec,
}

#[derive(Debug, Deserialize)]
pub(super) struct PeeringSpec {
    pub(super) name: String,
    #[serde(default = "Defaults::status")]
    pub(super) status: Status,
}

/// Policy settings common to all address-family objects
#[derive(Debug, Default, Deserialize)]
pub(super) struct FamilySettingsSpec {
    pub(super) import_policy: Option<String>,
    pub(super) export_policy: Option<String>,
    pub(super) multipath: Option<bool>,
    #[serde(default)]
    pub(super) extra_attributes: AttributeMap,
}

#[derive(Debug, Deserialize)]
pub(super) struct AddressFamilySpec {
    pub(super) device: String,
    pub(super) vrf: Option<String>,
    pub(super) afi_safi: Family,
    #[serde(flatten)]
    pub(super) settings: FamilySettingsSpec,
}

#[derive(Debug, Deserialize)]
pub(super) struct PeerGroupAddressFamilySpec {
    pub(super) device: String,
    pub(super) peer_group: String,
    pub(super) afi_safi: Family,
    pub(super) maximum_prefix: Option<u32>,
    #[serde(flatten)]
    pub(super) settings: FamilySettingsSpec,
}

#[derive(Debug, Deserialize)]
pub(super) struct PeerEndpointAddressFamilySpec {
    pub(super) device: Option<String>,
    pub(super) peer_endpoint: String,
    pub(super) afi_safi: Family,
    pub(super) maximum_prefix: Option<u32>,
    #[serde(flatten)]
    pub(super) settings: FamilySettingsSpec,
}

/// Config (toml) representation of the whole inventory
#[derive(Debug, Default, Deserialize)]
pub(super) struct InventorySpec {
    #[serde(default = "Vec::new")]
    pub(super) autonomous_systems: Vec<AutonomousSystemSpec>,
    #[serde(default = "Vec::new")]
    pub(super) asn_ranges: Vec<AsnRangeSpec>,
    #[serde(default = "Vec::new")]
    pub(super) routing_instances: Vec<RoutingInstanceSpec>,
    #[serde(default = "Vec::new")]
    pub(super) peer_group_templates: Vec<PeerGroupTemplateSpec>,
    #[serde(default = "Vec::new")]
    pub(super) peer_groups: Vec<PeerGroupSpec>,
    #[serde(default = "Vec::new")]
    pub(super) peer_endpoints: Vec<PeerEndpointSpec>,
    #[serde(default = "Vec::new")]
    pub(super) peerings: Vec<PeeringSpec>,
    #[serde(default = "Vec::new")]
    pub(super) address_families: Vec<AddressFamilySpec>,
    #[serde(default = "Vec::new")]
    pub(super) peer_group_address_families: Vec<PeerGroupAddressFamilySpec>,
    #[serde(default = "Vec::new")]
    pub(super) peer_endpoint_address_families: Vec<PeerEndpointAddressFamilySpec>,
}

impl InventorySpec {
    pub(super) fn from_file(path: &str) -> Result<Self, InventoryError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_toml(&contents)
    }

    pub(super) fn from_toml(contents: &str) -> Result<Self, InventoryError> {
        Ok(toml::from_str(contents)?)
    }
}
