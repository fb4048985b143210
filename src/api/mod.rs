//! Presentation of configuration objects for external consumers
//!
//! Objects are rendered with their stored values by default. Callers opt in to
//! effective (inherited) values with an `include_inherited` toggle.
use std::collections::BTreeMap;

use serde::Serialize;

use crate::inheritance::{AttributeMap, EntityRef, FieldValue, Kind, Resolver};

/// Interpret a loosely typed `include_inherited` parameter
///
/// Only "true", "True", and "1" enable inheritance.
pub fn include_inherited(param: Option<&str>) -> bool {
    matches!(param, Some("true") | Some("True") | Some("1"))
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InheritedField {
    pub field: &'static str,
    /// "<kind> <label>" of the object the value was taken from
    pub source: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ObjectDetail {
    pub kind: Kind,
    pub name: String,
    #[serde(flatten)]
    pub fields: BTreeMap<&'static str, Option<FieldValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited_fields: Option<Vec<InheritedField>>,
    pub extra_attributes: AttributeMap,
}

/// Build the representation of `entity`, with effective values when
/// `include_inherited` is set
pub fn represent(resolver: &Resolver, entity: &EntityRef, include_inherited: bool) -> ObjectDetail {
    let mut fields = BTreeMap::new();
    let mut inherited_fields = Vec::new();
    for field in entity.kind().fields() {
        let resolved = resolver.resolve(entity, *field, include_inherited);
        if let Some(source) = resolved.source_label() {
            inherited_fields.push(InheritedField {
                field: field.as_str(),
                source,
            });
        }
        fields.insert(field.as_str(), resolved.value);
    }
    ObjectDetail {
        kind: entity.kind(),
        name: entity.label(),
        fields,
        inherited_fields: if include_inherited {
            Some(inherited_fields)
        } else {
            None
        },
        extra_attributes: resolver.extra_attributes(entity, include_inherited),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::config::Inventory;
    use crate::inheritance::Schema;

    const INVENTORY: &str = r#"
        [[autonomous_systems]]
        asn = 65000

        [[routing_instances]]
        device = "edge-01"
        autonomous_system = 65000
        [routing_instances.extra_attributes]
        bfd = { interval = 300 }

        [[peer_groups]]
        device = "edge-01"
        name = "ibgp"
        description = "iBGP mesh"
        enabled = false

        [[peer_endpoints]]
        device = "edge-01"
        name = "10.1.0.2"
        peer_group = "ibgp"
        import_policy = "IBGP-IN"
        [peer_endpoints.extra_attributes]
        bfd = { multiplier = 3 }
    "#;

    #[test]
    fn test_include_inherited_param() {
        assert!(include_inherited(Some("true")));
        assert!(include_inherited(Some("True")));
        assert!(include_inherited(Some("1")));
        assert!(!include_inherited(Some("TRUE")));
        assert!(!include_inherited(Some("yes")));
        assert!(!include_inherited(Some("0")));
        assert!(!include_inherited(None));
    }

    #[test]
    fn test_represent_stored() {
        let inventory = Inventory::from_toml(INVENTORY).unwrap();
        let schema = Schema::bgp().unwrap();
        let resolver = Resolver::new(&schema);
        let endpoint = inventory.entity(Kind::PeerEndpoint, "edge-01/10.1.0.2").unwrap();

        let detail = serde_json::to_value(represent(&resolver, &endpoint, false)).unwrap();
        assert_eq!(detail["kind"], json!("peer_endpoint"));
        assert_eq!(detail["name"], json!("edge-01/10.1.0.2"));
        assert_eq!(detail["import_policy"], json!("IBGP-IN"));
        assert_eq!(detail["autonomous_system"], json!(null));
        assert_eq!(detail["enabled"], json!(null));
        assert!(detail.get("inherited_fields").is_none());
        assert_eq!(detail["extra_attributes"], json!({"bfd": {"multiplier": 3}}));
    }

    #[test]
    fn test_represent_inherited() {
        let inventory = Inventory::from_toml(INVENTORY).unwrap();
        let schema = Schema::bgp().unwrap();
        let resolver = Resolver::new(&schema);
        let endpoint = inventory.entity(Kind::PeerEndpoint, "edge-01/10.1.0.2").unwrap();

        let detail = represent(&resolver, &endpoint, true);
        assert_eq!(detail.fields["enabled"], Some(FieldValue::Bool(false)));
        assert_eq!(detail.fields["autonomous_system"], Some(FieldValue::Asn(65000)));
        let inherited = detail.inherited_fields.clone().unwrap();
        assert_eq!(
            inherited,
            vec![
                InheritedField {
                    field: "autonomous_system",
                    source: "routing_instance edge-01".to_string(),
                },
                InheritedField {
                    field: "description",
                    source: "peer_group edge-01/ibgp".to_string(),
                },
                InheritedField {
                    field: "enabled",
                    source: "peer_group edge-01/ibgp".to_string(),
                },
            ]
        );
        assert_eq!(
            serde_json::Value::Object(detail.extra_attributes),
            json!({"bfd": {"interval": 300, "multiplier": 3}})
        );
    }
}
