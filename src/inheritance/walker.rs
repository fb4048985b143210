use std::sync::Arc;

use log::trace;

use super::{EntityRef, FieldValue, Path, RelationPath};

/// Value found at the end of an attribute chain
#[derive(Clone, Debug)]
pub struct Found {
    pub value: FieldValue,
    /// Object whose field yielded the value
    pub source: EntityRef,
}

/// Follow every hop of `relations` from `root`
///
/// Returns `None` as soon as a relationship along the way is unset; a missing
/// relationship is ordinary state (E.g. an endpoint without a peer-group).
pub fn reach(root: &EntityRef, relations: &RelationPath) -> Option<EntityRef> {
    let mut current = Arc::clone(root);
    for hop in relations.hops() {
        current = match current.related(*hop) {
            Some(next) => next,
            None => {
                trace!("{} has no {}", current.label(), hop);
                return None;
            }
        };
    }
    Some(current)
}

/// Walk `path` from `root` and read its terminal field
///
/// Blank values at the end of the chain count as not found.
pub fn walk(root: &EntityRef, path: &Path) -> Option<Found> {
    let source = reach(root, &path.relations)?;
    let value = source.field(path.field).filter(|v| !v.is_blank())?;
    Some(Found { value, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inheritance::tests::MockEntity;
    use crate::inheritance::{Field, Kind, Relation};

    fn chain() -> (EntityRef, EntityRef) {
        let template: EntityRef = Arc::new(
            MockEntity::new(Kind::PeerGroupTemplate, "EDGE")
                .with_field(Field::AutonomousSystem, FieldValue::Asn(65001))
                .with_field(Field::Description, FieldValue::Text(String::new())),
        );
        let group: EntityRef = Arc::new(
            MockEntity::new(Kind::PeerGroup, "edge-peers")
                .with_relation(Relation::Template, Arc::clone(&template)),
        );
        let endpoint: EntityRef = Arc::new(
            MockEntity::new(Kind::PeerEndpoint, "10.0.0.1")
                .with_relation(Relation::PeerGroup, group),
        );
        (endpoint, template)
    }

    #[test]
    fn test_walk_to_terminal() {
        let (endpoint, template) = chain();
        let path: Path = "peer_group.template.autonomous_system".parse().unwrap();
        let found = walk(&endpoint, &path).unwrap();
        assert_eq!(found.value, FieldValue::Asn(65001));
        assert!(Arc::ptr_eq(&found.source, &template));
    }

    #[test]
    fn test_walk_missing_hop() {
        let (endpoint, _) = chain();
        let path: Path = "routing_instance.autonomous_system".parse().unwrap();
        assert!(walk(&endpoint, &path).is_none());
        let path: Path = "peer_group.routing_instance.autonomous_system"
            .parse()
            .unwrap();
        assert!(walk(&endpoint, &path).is_none());
    }

    #[test]
    fn test_walk_blank_terminal() {
        let (endpoint, _) = chain();
        let path: Path = "peer_group.template.description".parse().unwrap();
        assert!(walk(&endpoint, &path).is_none());
    }

    #[test]
    fn test_reach_self() {
        let (endpoint, _) = chain();
        let reached = reach(&endpoint, &RelationPath(vec![])).unwrap();
        assert!(Arc::ptr_eq(&reached, &endpoint));
    }
}
