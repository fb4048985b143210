mod autonomous_system;
mod families;
mod peering;
mod routing_instance;

pub use autonomous_system::{AutonomousSystem, AutonomousSystemRange};
pub use families::{AddressFamily, Family, PeerEndpointAddressFamily, PeerGroupAddressFamily};
pub use peering::{synchronize_peers, PeerEndpoint, PeerGroup, PeerGroupTemplate, Peering};
pub use routing_instance::RoutingInstance;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::inheritance::{Entity, EntityRef};

/// Lifecycle status shared by BGP objects
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Available,
    Planned,
    Reserved,
    Deprecated,
    Decommissioned,
}

impl Default for Status {
    fn default() -> Self {
        Status::Active
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Status::*;
        let word = match self {
            Active => "Active",
            Available => "Available",
            Planned => "Planned",
            Reserved => "Reserved",
            Deprecated => "Deprecated",
            Decommissioned => "Decommissioned",
        };
        write!(f, "{}", word)
    }
}

fn entity<T: Entity + 'static>(item: &Arc<T>) -> EntityRef {
    Arc::clone(item) as EntityRef
}
