use log::trace;

use super::{deep_merge, reach, walk, AttributeMap, EntityRef, Field, FieldValue, Schema};

/// Effective value of a field along with where it came from
#[derive(Clone, Debug, Default)]
pub struct Resolved {
    pub value: Option<FieldValue>,
    /// Value was taken from an ancestor rather than stored locally
    pub inherited: bool,
    /// Ancestor that supplied an inherited value
    pub source: Option<EntityRef>,
}

impl Resolved {
    fn local(value: Option<FieldValue>) -> Self {
        Self {
            value,
            inherited: false,
            source: None,
        }
    }

    pub fn source_label(&self) -> Option<String> {
        self.source
            .as_ref()
            .map(|source| format!("{} {}", source.kind(), source.label()))
    }
}

/// Resolved value for every declared field of an object, in declaration order
pub type FieldReport = Vec<(Field, Resolved)>;

/// Computes effective configuration from the inheritance [`Schema`]
///
/// Nothing is cached: every call walks the current state of the object graph.
#[derive(Clone, Copy, Debug)]
pub struct Resolver<'a> {
    schema: &'a Schema,
}

impl<'a> Resolver<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Resolve a single field, first declared path with a value wins
    ///
    /// A stored value (including `false` and `0`) is always returned as-is and
    /// no ancestor is consulted.
    pub fn resolve(&self, entity: &EntityRef, field: Field, include_inherited: bool) -> Resolved {
        let local = entity.field(field).filter(|v| !v.is_blank());
        if local.is_some() || !include_inherited {
            return Resolved::local(local);
        }
        let paths = match self.schema.get(entity.kind()).and_then(|s| s.paths(field)) {
            Some(paths) => paths,
            None => return Resolved::local(None),
        };
        for path in paths {
            if let Some(found) = walk(entity, path) {
                trace!(
                    "{} {}: {} = {} (from {})",
                    entity.kind(),
                    entity.label(),
                    field,
                    found.value,
                    path
                );
                return Resolved {
                    value: Some(found.value),
                    inherited: true,
                    source: Some(found.source),
                };
            }
        }
        Resolved::local(None)
    }

    /// Resolve every field declared for the object's kind
    pub fn all_fields(&self, entity: &EntityRef, include_inherited: bool) -> FieldReport {
        match self.schema.get(entity.kind()) {
            Some(schema) => schema
                .fields()
                .map(|field| (field, self.resolve(entity, field, include_inherited)))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Effective extra attributes, deep-merged from the most distal ancestor in
    /// to the object itself
    pub fn extra_attributes(&self, entity: &EntityRef, include_inherited: bool) -> AttributeMap {
        if !include_inherited {
            return entity.extra_attributes().clone();
        }
        let chain = self
            .schema
            .get(entity.kind())
            .map(|s| s.attribute_chain())
            .unwrap_or_default();
        let ancestors: Vec<EntityRef> = chain
            .iter()
            .filter_map(|relations| reach(entity, relations))
            .collect();

        let mut merged = AttributeMap::new();
        for ancestor in ancestors.iter().rev() {
            deep_merge(&mut merged, ancestor.extra_attributes());
        }
        deep_merge(&mut merged, entity.extra_attributes());
        trace!(
            "{} {}: merged extra attributes from {} ancestors",
            entity.kind(),
            entity.label(),
            ancestors.len()
        );
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;
    use std::sync::Arc;

    use serde_json::json;

    use crate::inheritance::tests::MockEntity;
    use crate::inheritance::{Kind, KindSchema, Relation};

    struct Fixture {
        endpoint: Arc<MockEntity>,
        group: Arc<MockEntity>,
        template: Arc<MockEntity>,
        instance: Arc<MockEntity>,
    }

    impl Fixture {
        fn endpoint(&self) -> EntityRef {
            self.endpoint.clone()
        }

        fn total_hops(&self) -> usize {
            self.endpoint.hops.get()
                + self.group.hops.get()
                + self.template.hops.get()
                + self.instance.hops.get()
        }
    }

    fn fixture(endpoint: MockEntity) -> Fixture {
        let template = Arc::new(
            MockEntity::new(Kind::PeerGroupTemplate, "EDGE")
                .with_field(Field::AutonomousSystem, FieldValue::Asn(65100))
                .with_field(Field::Description, FieldValue::Text("from template".into()))
                .with_field(Field::Enabled, FieldValue::Bool(true))
                .with_field(Field::ImportPolicy, FieldValue::Text("TEMPLATE-IN".into()))
                .with_attributes(json!({"timers": {"hold": 90, "keepalive": 30}, "ttl": 1})),
        );
        let instance = Arc::new(
            MockEntity::new(Kind::RoutingInstance, "edge-01")
                .with_field(Field::AutonomousSystem, FieldValue::Asn(65000))
                .with_attributes(json!({"timers": {"hold": 180}, "bfd": {"interval": 300}})),
        );
        let group = Arc::new(
            MockEntity::new(Kind::PeerGroup, "edge-01/transit")
                .with_field(Field::AutonomousSystem, FieldValue::Asn(65200))
                .with_field(Field::ImportPolicy, FieldValue::Text(String::new()))
                .with_relation(Relation::Template, template.clone())
                .with_relation(Relation::RoutingInstance, instance.clone())
                .with_attributes(json!({"timers": {"keepalive": 10}})),
        );
        let endpoint = Arc::new(
            endpoint
                .with_relation(Relation::PeerGroup, group.clone())
                .with_relation(Relation::RoutingInstance, instance.clone()),
        );
        Fixture {
            endpoint,
            group,
            template,
            instance,
        }
    }

    fn bare_endpoint() -> MockEntity {
        MockEntity::new(Kind::PeerEndpoint, "edge-01/10.0.0.1")
    }

    #[test]
    fn test_local_value_wins() {
        let schema = Schema::bgp().unwrap();
        let resolver = Resolver::new(&schema);
        let fx = fixture(
            bare_endpoint().with_field(Field::AutonomousSystem, FieldValue::Asn(64512)),
        );
        for include_inherited in [true, false] {
            let resolved =
                resolver.resolve(&fx.endpoint(), Field::AutonomousSystem, include_inherited);
            assert_eq!(resolved.value, Some(FieldValue::Asn(64512)));
            assert!(!resolved.inherited);
            assert!(resolved.source.is_none());
        }
        assert_eq!(fx.total_hops(), 0);
    }

    #[test]
    fn test_explicit_false_and_zero_win() {
        let schema = Schema::bgp().unwrap();
        let resolver = Resolver::new(&schema);
        let fx = fixture(bare_endpoint().with_field(Field::Enabled, FieldValue::Bool(false)));
        let resolved = resolver.resolve(&fx.endpoint(), Field::Enabled, true);
        assert_eq!(resolved.value, Some(FieldValue::Bool(false)));
        assert!(!resolved.inherited);

        let schema = {
            let mut schema = Schema::new();
            schema
                .register(
                    KindSchema::new(Kind::PeerEndpointAddressFamily)
                        .field(
                            "maximum_prefix",
                            &["peer_group_address_family.maximum_prefix"],
                        )
                        .unwrap(),
                )
                .unwrap();
            schema
        };
        let resolver = Resolver::new(&schema);
        let group_af: EntityRef = Arc::new(
            MockEntity::new(Kind::PeerGroupAddressFamily, "transit ipv4")
                .with_field(Field::MaximumPrefix, FieldValue::Integer(1000)),
        );
        let endpoint_af: EntityRef = Arc::new(
            MockEntity::new(Kind::PeerEndpointAddressFamily, "10.0.0.1 ipv4")
                .with_field(Field::MaximumPrefix, FieldValue::Integer(0))
                .with_relation(Relation::PeerGroupAddressFamily, group_af),
        );
        let resolved = resolver.resolve(&endpoint_af, Field::MaximumPrefix, true);
        assert_eq!(resolved.value, Some(FieldValue::Integer(0)));
        assert!(!resolved.inherited);
    }

    #[test]
    fn test_no_inheritance_requested() {
        let schema = Schema::bgp().unwrap();
        let resolver = Resolver::new(&schema);
        let fx = fixture(bare_endpoint());
        let resolved = resolver.resolve(&fx.endpoint(), Field::AutonomousSystem, false);
        assert!(resolved.value.is_none());
        assert!(!resolved.inherited);
        assert_eq!(fx.total_hops(), 0);
    }

    #[test]
    fn test_first_match_wins() {
        let schema = Schema::bgp().unwrap();
        let resolver = Resolver::new(&schema);
        let fx = fixture(bare_endpoint());
        // Peer group, template, and routing instance all carry an ASN
        let resolved = resolver.resolve(&fx.endpoint(), Field::AutonomousSystem, true);
        assert_eq!(resolved.value, Some(FieldValue::Asn(65200)));
        assert!(resolved.inherited);
        let group: EntityRef = fx.group.clone();
        assert!(Arc::ptr_eq(resolved.source.as_ref().unwrap(), &group));
        assert_eq!(
            resolved.source_label().unwrap(),
            "peer_group edge-01/transit"
        );
    }

    #[test]
    fn test_blank_ancestor_skipped() {
        let schema = Schema::bgp().unwrap();
        let resolver = Resolver::new(&schema);
        let fx = fixture(bare_endpoint());
        let resolved = resolver.resolve(&fx.endpoint(), Field::ImportPolicy, true);
        assert_eq!(
            resolved.value,
            Some(FieldValue::Text("TEMPLATE-IN".to_string()))
        );
        let template: EntityRef = fx.template.clone();
        assert!(Arc::ptr_eq(resolved.source.as_ref().unwrap(), &template));
    }

    #[test]
    fn test_missing_hop_falls_through() {
        let schema = Schema::bgp().unwrap();
        let resolver = Resolver::new(&schema);
        let instance: EntityRef = Arc::new(
            MockEntity::new(Kind::RoutingInstance, "edge-02")
                .with_field(Field::AutonomousSystem, FieldValue::Asn(65000)),
        );
        let endpoint: EntityRef = Arc::new(
            bare_endpoint().with_relation(Relation::RoutingInstance, Arc::clone(&instance)),
        );
        let resolved = resolver.resolve(&endpoint, Field::AutonomousSystem, true);
        assert_eq!(resolved.value, Some(FieldValue::Asn(65000)));
        assert!(Arc::ptr_eq(resolved.source.as_ref().unwrap(), &instance));

        let orphan: EntityRef = Arc::new(bare_endpoint());
        let resolved = resolver.resolve(&orphan, Field::AutonomousSystem, true);
        assert!(resolved.value.is_none());
        assert!(!resolved.inherited);
    }

    #[test]
    fn test_undeclared_field_is_local_only() {
        let schema = Schema::bgp().unwrap();
        let resolver = Resolver::new(&schema);
        let addr: IpAddr = "192.0.2.1".parse().unwrap();
        let instance: EntityRef = Arc::new(
            MockEntity::new(Kind::RoutingInstance, "edge-01")
                .with_field(Field::RouterId, FieldValue::Address(addr)),
        );
        let resolved = resolver.resolve(&instance, Field::RouterId, true);
        assert_eq!(resolved.value, Some(FieldValue::Address(addr)));
        let resolved = resolver.resolve(&instance, Field::Description, true);
        assert!(resolved.value.is_none());
    }

    #[test]
    fn test_all_fields_report() {
        let schema = Schema::bgp().unwrap();
        let resolver = Resolver::new(&schema);
        let fx = fixture(bare_endpoint().with_field(Field::Enabled, FieldValue::Bool(false)));

        let report = resolver.all_fields(&fx.endpoint(), false);
        assert_eq!(report.len(), 8);
        assert_eq!(report[0].0, Field::AuthPassword);
        assert!(report
            .iter()
            .all(|(field, r)| !r.inherited && (r.value.is_some() == (*field == Field::Enabled))));
        assert_eq!(fx.total_hops(), 0);

        let report = resolver.all_fields(&fx.endpoint(), true);
        let description = report
            .iter()
            .find(|(f, _)| *f == Field::Description)
            .map(|(_, r)| r)
            .unwrap();
        assert_eq!(
            description.value,
            Some(FieldValue::Text("from template".to_string()))
        );
        assert!(description.inherited);
    }

    #[test]
    fn test_extra_attributes_merge_order() {
        let schema = Schema::bgp().unwrap();
        let resolver = Resolver::new(&schema);
        let fx = fixture(bare_endpoint().with_attributes(json!({"ttl": 2})));
        let merged = resolver.extra_attributes(&fx.endpoint(), true);
        assert_eq!(
            serde_json::Value::Object(merged),
            json!({
                "timers": {"hold": 90, "keepalive": 10},
                "bfd": {"interval": 300},
                "ttl": 2,
            })
        );
    }

    #[test]
    fn test_extra_attributes_short_circuit() {
        let schema = Schema::bgp().unwrap();
        let resolver = Resolver::new(&schema);
        let own = json!({"timers": {"hold": 30}});
        let fx = fixture(bare_endpoint().with_attributes(own.clone()));
        let attributes = resolver.extra_attributes(&fx.endpoint(), false);
        assert_eq!(serde_json::Value::Object(attributes), own);
        assert_eq!(fx.total_hops(), 0);

        resolver.extra_attributes(&fx.endpoint(), true);
        assert_eq!(
            serde_json::Value::Object(fx.endpoint.attributes.clone()),
            own
        );
        assert!(fx.total_hops() > 0);
    }

    #[test]
    fn test_extra_attributes_idempotent() {
        let schema = Schema::bgp().unwrap();
        let resolver = Resolver::new(&schema);
        let fx = fixture(bare_endpoint().with_attributes(json!({"ttl": 2})));
        let merged = resolver.extra_attributes(&fx.endpoint(), true);

        let resolved: EntityRef = Arc::new(
            bare_endpoint().with_attributes(serde_json::Value::Object(merged.clone())),
        );
        assert_eq!(resolver.extra_attributes(&resolved, true), merged);
    }
}
