use std::collections::BTreeMap;

use log::debug;
use thiserror::Error;

use super::{Field, Kind, Path, RelationPath};

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("Empty hop in path '{0}'")]
    EmptyHop(String),
    #[error("Unknown relation '{1}' in path '{0}'")]
    UnknownRelation(String, String),
    #[error("Unknown field '{1}' in path '{0}'")]
    UnknownField(String, String),
    #[error("Path '{0}' exceeds {1} hops")]
    TooDeep(String, usize),
    #[error("{kind} has no relation '{relation}' (in path '{path}')")]
    InvalidHop {
        kind: Kind,
        relation: String,
        path: String,
    },
    #[error("{kind} has no field '{field}'")]
    FieldNotOnKind { kind: Kind, field: Field },
    #[error("Field '{field}' declared twice for {kind}")]
    DuplicateField { kind: Kind, field: Field },
    #[error("Inheritance for {0} registered twice")]
    DuplicateKind(Kind),
}

/// Inheritance rules for one kind of object
#[derive(Clone, Debug)]
pub struct KindSchema {
    kind: Kind,
    // Declaration order is kept for reports
    fields: Vec<(Field, Vec<Path>)>,
    // Ancestors merged into `extra_attributes`, nearest first
    attribute_chain: Vec<RelationPath>,
}

impl KindSchema {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
            attribute_chain: Vec::new(),
        }
    }

    /// Declare `field` with its inheritance paths, in priority order
    pub fn field(mut self, field: &str, paths: &[&str]) -> Result<Self, SchemaError> {
        let field: Field = field
            .parse()
            .map_err(|_| SchemaError::UnknownField(field.to_string(), field.to_string()))?;
        if self.paths(field).is_some() {
            return Err(SchemaError::DuplicateField {
                kind: self.kind,
                field,
            });
        }
        let paths = paths
            .iter()
            .map(|p| p.parse::<Path>())
            .collect::<Result<Vec<_>, _>>()?;
        self.fields.push((field, paths));
        Ok(self)
    }

    /// Declare the ancestors whose extra attributes are merged, nearest first
    pub fn extra_attributes(mut self, chain: &[&str]) -> Result<Self, SchemaError> {
        self.attribute_chain = chain
            .iter()
            .map(|p| p.parse::<RelationPath>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self)
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.iter().map(|(field, _)| *field)
    }

    pub fn paths(&self, field: Field) -> Option<&[Path]> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, paths)| paths.as_slice())
    }

    pub fn attribute_chain(&self) -> &[RelationPath] {
        &self.attribute_chain
    }

    /// Check every declared path against the relations each kind offers
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (field, paths) in &self.fields {
            if !self.kind.has_field(*field) {
                return Err(SchemaError::FieldNotOnKind {
                    kind: self.kind,
                    field: *field,
                });
            }
            for path in paths {
                let terminal = self.follow(&path.relations, &path.to_string())?;
                if !terminal.has_field(path.field) {
                    return Err(SchemaError::FieldNotOnKind {
                        kind: terminal,
                        field: path.field,
                    });
                }
            }
        }
        for chain in &self.attribute_chain {
            self.follow(chain, &chain.to_string())?;
        }
        Ok(())
    }

    fn follow(&self, relations: &RelationPath, path: &str) -> Result<Kind, SchemaError> {
        let mut kind = self.kind;
        for hop in relations.hops() {
            kind = kind.target(*hop).ok_or_else(|| SchemaError::InvalidHop {
                kind,
                relation: hop.to_string(),
                path: path.to_string(),
            })?;
        }
        Ok(kind)
    }
}

/// Registry of inheritance rules per kind
///
/// Built once at startup and only read afterwards. Kinds without an entry
/// resolve local values only.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    kinds: BTreeMap<Kind, KindSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, schema: KindSchema) -> Result<(), SchemaError> {
        schema.validate()?;
        if self.kinds.contains_key(&schema.kind) {
            return Err(SchemaError::DuplicateKind(schema.kind));
        }
        debug!(
            "Registered inheritance for {} ({} fields)",
            schema.kind,
            schema.fields.len()
        );
        self.kinds.insert(schema.kind, schema);
        Ok(())
    }

    pub fn get(&self, kind: Kind) -> Option<&KindSchema> {
        self.kinds.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &KindSchema> {
        self.kinds.values()
    }

    /// Inheritance rules for the BGP configuration hierarchy
    pub fn bgp() -> Result<Self, SchemaError> {
        let mut schema = Self::new();

        schema.register(
            KindSchema::new(Kind::PeerGroupTemplate)
                .field("auth_password", &[])?
                .field("autonomous_system", &[])?
                .field("description", &[])?
                .field("enabled", &[])?
                .field("export_policy", &[])?
                .field("import_policy", &[])?
                .field("source_ip", &[])?,
        )?;

        schema.register(
            KindSchema::new(Kind::PeerGroup)
                .field("auth_password", &["template.auth_password"])?
                .field(
                    "autonomous_system",
                    &[
                        "template.autonomous_system",
                        "routing_instance.autonomous_system",
                    ],
                )?
                .field("description", &["template.description"])?
                .field("enabled", &["template.enabled"])?
                .field("export_policy", &["template.export_policy"])?
                .field("import_policy", &["template.import_policy"])?
                .field("source_ip", &[])?
                .field("source_interface", &[])?
                .extra_attributes(&["template", "routing_instance"])?,
        )?;

        schema.register(
            KindSchema::new(Kind::PeerEndpoint)
                .field(
                    "auth_password",
                    &["peer_group.auth_password", "peer_group.template.auth_password"],
                )?
                .field(
                    "autonomous_system",
                    &[
                        "peer_group.autonomous_system",
                        "peer_group.template.autonomous_system",
                        "routing_instance.autonomous_system",
                    ],
                )?
                .field(
                    "description",
                    &["peer_group.description", "peer_group.template.description"],
                )?
                .field(
                    "enabled",
                    &["peer_group.enabled", "peer_group.template.enabled"],
                )?
                .field(
                    "export_policy",
                    &["peer_group.export_policy", "peer_group.template.export_policy"],
                )?
                .field(
                    "import_policy",
                    &["peer_group.import_policy", "peer_group.template.import_policy"],
                )?
                .field("source_ip", &["peer_group.source_ip"])?
                .field("source_interface", &["peer_group.source_interface"])?
                .extra_attributes(&["peer_group", "peer_group.template", "routing_instance"])?,
        )?;

        schema.register(
            KindSchema::new(Kind::AddressFamily)
                .field("export_policy", &[])?
                .field("import_policy", &[])?
                .field("multipath", &[])?
                .extra_attributes(&["routing_instance"])?,
        )?;

        schema.register(
            KindSchema::new(Kind::PeerGroupAddressFamily)
                .field(
                    "export_policy",
                    &["address_family.export_policy", "peer_group.export_policy"],
                )?
                .field(
                    "import_policy",
                    &["address_family.import_policy", "peer_group.import_policy"],
                )?
                .field("multipath", &["address_family.multipath"])?
                .field("maximum_prefix", &[])?
                .extra_attributes(&["address_family", "peer_group"])?,
        )?;

        schema.register(
            KindSchema::new(Kind::PeerEndpointAddressFamily)
                .field(
                    "export_policy",
                    &[
                        "peer_group_address_family.export_policy",
                        "address_family.export_policy",
                        "peer_endpoint.export_policy",
                    ],
                )?
                .field(
                    "import_policy",
                    &[
                        "peer_group_address_family.import_policy",
                        "address_family.import_policy",
                        "peer_endpoint.import_policy",
                    ],
                )?
                .field(
                    "multipath",
                    &[
                        "peer_group_address_family.multipath",
                        "address_family.multipath",
                    ],
                )?
                .field(
                    "maximum_prefix",
                    &["peer_group_address_family.maximum_prefix"],
                )?
                .extra_attributes(&[
                    "peer_group_address_family",
                    "address_family",
                    "peer_endpoint",
                ])?,
        )?;

        Ok(schema)
    }
}
