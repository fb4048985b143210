use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::models::AutonomousSystem;

/// Entry in an ASN range listing
#[derive(Clone, Debug, PartialEq)]
pub enum AsnSlot {
    Allocated(Arc<AutonomousSystem>),
    /// Run of `available` unallocated ASNs starting at `asn`
    Available { asn: u32, available: u64 },
}

impl Serialize for AsnSlot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            AsnSlot::Allocated(system) => system.serialize(serializer),
            AsnSlot::Available { asn, available } => {
                use serde::ser::SerializeStruct;
                let mut state = serializer.serialize_struct("Available", 2)?;
                state.serialize_field("asn", asn)?;
                state.serialize_field("available", available)?;
                state.end()
            }
        }
    }
}

/// Interleave allocated ASNs in `[asn_min, asn_max]` with runs of free ones
///
/// `allocated` must already be sorted ascending and within the range.
pub fn available_asns(
    asn_min: u32,
    asn_max: u32,
    allocated: &[Arc<AutonomousSystem>],
) -> Vec<AsnSlot> {
    let mut slots = Vec::with_capacity(allocated.len() * 2 + 1);
    // Next ASN not yet accounted for
    let mut next = u64::from(asn_min);
    for system in allocated {
        let asn = u64::from(system.asn);
        if asn > next {
            slots.push(AsnSlot::Available {
                asn: next as u32,
                available: asn - next,
            });
        }
        slots.push(AsnSlot::Allocated(Arc::clone(system)));
        next = asn + 1;
    }
    if next <= u64::from(asn_max) {
        slots.push(AsnSlot::Available {
            asn: next as u32,
            available: u64::from(asn_max) - next + 1,
        });
    }
    slots
}
