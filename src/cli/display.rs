use itertools::Itertools;
use prettytable::{cell, row, Row};

use super::table::ToRow;
use crate::inheritance::{Field, Kind, KindSchema, Resolved};
use crate::utils::{maybe_string, u32_to_dotted, AsnSlot, EMPTY_VALUE};

/// Effective value of one field, optionally prefixed with the object name
pub struct FieldRow {
    pub name: Option<String>,
    pub field: Field,
    pub resolved: Resolved,
}

impl ToRow for FieldRow {
    fn columns() -> Row {
        row!["Name", "Field", "Value", "Inherited From"]
    }

    fn to_row(&self) -> Row {
        row![
            maybe_string(self.name.as_ref()),
            self.field,
            maybe_string(self.resolved.value.as_ref()),
            maybe_string(self.resolved.source_label().as_ref()),
        ]
    }
}

pub struct AsnSlotRow(pub AsnSlot);

impl ToRow for AsnSlotRow {
    fn columns() -> Row {
        row!["ASN", "Status", "Available", "Description"]
    }

    fn to_row(&self) -> Row {
        match &self.0 {
            AsnSlot::Allocated(system) => row![
                system.asdot(),
                system.status,
                EMPTY_VALUE,
                maybe_string(system.description.as_ref()),
            ],
            AsnSlot::Available { asn, available } => row![
                u32_to_dotted(*asn, '.'),
                "Available",
                available,
                EMPTY_VALUE,
            ],
        }
    }
}

pub struct CountRow(pub Kind, pub usize);

impl ToRow for CountRow {
    fn columns() -> Row {
        row!["Kind", "Count"]
    }

    fn to_row(&self) -> Row {
        row![self.0, self.1]
    }
}

/// Inheritance paths of a single field (or of the extra attributes)
pub struct SchemaRow {
    pub kind: Kind,
    pub field: String,
    pub paths: String,
}

impl SchemaRow {
    /// Rows for every declared field, followed by the extra attributes chain
    pub fn for_kind(schema: &KindSchema) -> Vec<SchemaRow> {
        let mut rows: Vec<SchemaRow> = schema
            .fields()
            .map(|field| SchemaRow {
                kind: schema.kind(),
                field: field.to_string(),
                paths: schema
                    .paths(field)
                    .map(|paths| paths.iter().join(", "))
                    .unwrap_or_default(),
            })
            .collect();
        if !schema.attribute_chain().is_empty() {
            rows.push(SchemaRow {
                kind: schema.kind(),
                field: "extra_attributes".to_string(),
                paths: schema.attribute_chain().iter().join(" < "),
            });
        }
        rows
    }
}

impl ToRow for SchemaRow {
    fn columns() -> Row {
        row!["Kind", "Field", "Inherits From"]
    }

    fn to_row(&self) -> Row {
        row![self.kind, self.field, self.paths]
    }
}
