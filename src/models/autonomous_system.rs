use serde::Serialize;

use super::Status;
use crate::inheritance::{AttributeMap, Entity, EntityRef, Field, FieldValue, Kind, Relation};
use crate::utils::u32_to_dotted;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AutonomousSystem {
    pub asn: u32,
    pub description: Option<String>,
    pub status: Status,
    #[serde(skip_serializing_if = "AttributeMap::is_empty")]
    pub extra_attributes: AttributeMap,
}

impl AutonomousSystem {
    pub fn new(asn: u32) -> Self {
        Self {
            asn,
            description: None,
            status: Status::default(),
            extra_attributes: AttributeMap::new(),
        }
    }

    /// ASN in asdot notation when it exceeds 2 bytes
    pub fn asdot(&self) -> String {
        u32_to_dotted(self.asn, '.')
    }
}

impl Entity for AutonomousSystem {
    fn kind(&self) -> Kind {
        Kind::AutonomousSystem
    }

    fn label(&self) -> String {
        format!("AS{}", self.asdot())
    }

    fn field(&self, field: Field) -> Option<FieldValue> {
        match field {
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

/// Named block of ASNs available for allocation
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AutonomousSystemRange {
    pub name: String,
    pub asn_min: u32,
    pub asn_max: u32,
    pub description: Option<String>,
}

impl AutonomousSystemRange {
    pub fn contains(&self, asn: u32) -> bool {
        (self.asn_min..=self.asn_max).contains(&asn)
    }

    /// Total number of ASNs in the range
    pub fn size(&self) -> u64 {
        u64::from(self.asn_max) - u64::from(self.asn_min) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_asdot() {
        assert_eq!(AutonomousSystem::new(65000).label(), "AS65000");
        assert_eq!(AutonomousSystem::new(4259840100).label(), "AS65000.100");
    }

    #[test]
    fn test_range_contains() {
        let range = AutonomousSystemRange {
            name: "private".to_string(),
            asn_min: 64512,
            asn_max: 65534,
            description: None,
        };
        assert!(range.contains(64512));
        assert!(range.contains(65534));
        assert!(!range.contains(65535));
        assert_eq!(range.size(), 1023);
    }
}
