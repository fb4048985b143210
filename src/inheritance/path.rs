use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

use super::{Field, Relation, SchemaError};

/// Longest hop chain a declared path may contain
pub const MAX_PATH_DEPTH: usize = 8;

/// Chain of relationship hops with no terminal field, E.g. "peer_group.template"
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationPath(pub Vec<Relation>);

impl RelationPath {
    pub fn hops(&self) -> &[Relation] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RelationPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("."))
    }
}

impl FromStr for RelationPath {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hops = split_path(s)?
            .into_iter()
            .map(|hop| {
                hop.parse::<Relation>()
                    .map_err(|_| SchemaError::UnknownRelation(s.to_string(), hop.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if hops.len() > MAX_PATH_DEPTH {
            return Err(SchemaError::TooDeep(s.to_string(), MAX_PATH_DEPTH));
        }
        Ok(RelationPath(hops))
    }
}

/// Attribute chain ending in a field, E.g. "peer_group.template.enabled"
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    pub relations: RelationPath,
    pub field: Field,
}

impl Path {
    pub fn hops(&self) -> &[Relation] {
        self.relations.hops()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.relations.is_empty() {
            write!(f, "{}", self.field)
        } else {
            write!(f, "{}.{}", self.relations, self.field)
        }
    }
}

impl FromStr for Path {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (relations, field) = match s.rfind('.') {
            Some(i) => (s[..i].parse::<RelationPath>()?, &s[i + 1..]),
            None => (RelationPath(vec![]), s),
        };
        let field = field
            .parse::<Field>()
            .map_err(|_| SchemaError::UnknownField(s.to_string(), field.to_string()))?;
        Ok(Path { relations, field })
    }
}

fn split_path(path: &str) -> Result<Vec<&str>, SchemaError> {
    let hops: Vec<&str> = path.trim().split('.').collect();
    if hops.iter().any(|hop| hop.is_empty()) {
        return Err(SchemaError::EmptyHop(path.to_string()));
    }
    Ok(hops)
}
