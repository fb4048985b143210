//! # bgp-models CLI
//!
//! Inspect a BGP configuration inventory and the effective (inherited)
//! settings of its objects.
//!
//! ```sh
//! $ bgp-models -i demos/inventory.toml show-object peer-endpoint edge-01/192.0.2.1 --include-inherited
//!  Name  Field              Value           Inherited From
//! ---------------------------------------------------------------------------
//!        auth_password      transit-secret  peer_group_template TRANSIT
//!        autonomous_system  64496           peer_group edge-01/transit
//!        description        Transit         peer_group_template TRANSIT
//!        enabled            true            peer_group_template TRANSIT
//!        ...
//! ```
//!
//! ASN ranges list allocated ASNs interleaved with runs of free ones:
//! ```sh
//! $ bgp-models -i demos/inventory.toml available-asns private
//!  ASN    Status     Available  Description
//! ------------------------------------------------
//!  64512  Active                Edge sites
//!  64513  Available  2
//!  64515  Planned               Lab
//!  64516  Available  1019
//! ```
use std::error::Error;

use clap::Parser;
use colored::*;
use log::{debug, info};

use crate::api::represent;
use crate::config::Inventory;
use crate::inheritance::{EntityRef, FieldReport, Kind, Resolver, Schema};
use crate::utils::AsnPattern;

mod display;
mod table;

use display::{AsnSlotRow, CountRow, FieldRow, SchemaRow};
use table::OutputTable;

#[derive(Parser, Debug)]
#[clap(name = "bgp-models", rename_all = "kebab-case")]
/// Inspect BGP configuration objects and their inherited settings
pub struct Args {
    #[clap(subcommand)]
    pub cmd: Command,
    /// Path to the inventory TOML file
    #[clap(short, long, default_value = "inventory.toml", global = true)]
    pub inventory: String,
    /// Show debug logs (additive for trace logs)
    #[clap(short, parse(from_occurrences), global = true)]
    pub verbose: u8,
}

#[derive(Parser, Debug)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Load the inventory and report object counts
    Check,
    /// List every object of a kind
    #[clap(alias = "s")]
    Show(ShowOptions),
    /// Field report for a single object
    #[clap(alias = "o")]
    ShowObject(ObjectOptions),
    /// Allocated and free ASNs in a named range
    AvailableAsns {
        /// Name of the ASN range
        range: String,
    },
    /// Expand an AS pattern, E.g. "65[0-1]0[1,5]"
    Expand {
        #[clap()]
        pattern: String,
    },
    /// Print the inheritance rules
    Schema {
        /// Only show rules for this kind
        #[clap()]
        kind: Option<Kind>,
    },
}

#[derive(Parser, Debug)]
#[clap(rename_all = "kebab-case")]
pub struct ShowOptions {
    /// Object kind, E.g. "peer-endpoints"
    #[clap()]
    kind: Kind,
    /// Show effective values inherited from related objects
    #[clap(long)]
    include_inherited: bool,
    /// Print JSON instead of a table
    #[clap(long)]
    json: bool,
}

#[derive(Parser, Debug)]
#[clap(rename_all = "kebab-case")]
pub struct ObjectOptions {
    #[clap()]
    kind: Kind,
    /// Object key, E.g. "edge-01/transit" for a peer group
    #[clap()]
    key: String,
    /// Show effective values inherited from related objects
    #[clap(long)]
    include_inherited: bool,
}

fn load_inventory(path: &str) -> Result<Inventory, Box<dyn Error>> {
    let inventory = Inventory::from_file(path)?;
    debug!(
        "Found {} objects in {}",
        inventory.summary().iter().map(|(_, count)| count).sum::<usize>(),
        path
    );
    Ok(inventory)
}

/// Every local field of the object, including kinds without inheritance rules
fn field_report(resolver: &Resolver, entity: &EntityRef, include_inherited: bool) -> FieldReport {
    entity
        .kind()
        .fields()
        .iter()
        .map(|&field| (field, resolver.resolve(entity, field, include_inherited)))
        .collect()
}

fn run_cmd(args: &Args) -> Result<(), Box<dyn Error>> {
    let schema = Schema::bgp()?;
    let resolver = Resolver::new(&schema);
    match &args.cmd {
        Command::Check => {
            let inventory = load_inventory(&args.inventory)?;
            let mut table = OutputTable::new();
            for (kind, count) in inventory.summary() {
                table.add_row(&CountRow(kind, count));
            }
            table.print();
            println!("{}", format!("{} is valid", args.inventory).green());
        }
        Command::Show(options) => {
            let inventory = load_inventory(&args.inventory)?;
            let entities = inventory.entities(options.kind);
            if options.json {
                let details: Vec<_> = entities
                    .iter()
                    .map(|entity| represent(&resolver, entity, options.include_inherited))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&details)?);
                return Ok(());
            }
            let mut table = OutputTable::new();
            for entity in &entities {
                let report = field_report(&resolver, entity, options.include_inherited);
                for (i, (field, resolved)) in report.into_iter().enumerate() {
                    table.add_row(&FieldRow {
                        name: if i == 0 { Some(entity.label()) } else { None },
                        field,
                        resolved,
                    });
                }
            }
            table.print();
            info!("{} {} objects", entities.len(), options.kind);
        }
        Command::ShowObject(options) => {
            let inventory = load_inventory(&args.inventory)?;
            let entity = inventory
                .entity(options.kind, &options.key)
                .ok_or_else(|| format!("No {} found for '{}'", options.kind, options.key))?;
            let mut table = OutputTable::new();
            for (field, resolved) in field_report(&resolver, &entity, options.include_inherited) {
                table.add_row(&FieldRow {
                    name: None,
                    field,
                    resolved,
                });
            }
            println!("{} {}", entity.kind(), entity.label().bold());
            table.print();
            let attributes = resolver.extra_attributes(&entity, options.include_inherited);
            if !attributes.is_empty() {
                println!("\nExtra attributes:");
                println!("{}", serde_json::to_string_pretty(&attributes)?);
            }
        }
        Command::AvailableAsns { range } => {
            let inventory = load_inventory(&args.inventory)?;
            let slots = inventory
                .available_asns(range)
                .ok_or_else(|| format!("No ASN range named '{}'", range))?;
            let mut table = OutputTable::new();
            for slot in slots {
                table.add_row(&AsnSlotRow(slot));
            }
            table.print();
        }
        Command::Expand { pattern } => {
            let pattern = AsnPattern::parse(pattern)?;
            match pattern.len() {
                Some(count) => debug!("Pattern expands to {} values", count),
                None => debug!("Pattern expands to more than {} values", u64::MAX),
            }
            for value in pattern.iter() {
                println!("{}", value);
            }
        }
        Command::Schema { kind } => {
            let mut table = OutputTable::new();
            for kind_schema in schema.iter() {
                if kind.map_or(false, |kind| kind != kind_schema.kind()) {
                    continue;
                }
                for row in SchemaRow::for_kind(kind_schema) {
                    table.add_row(&row);
                }
            }
            table.print();
        }
    }
    Ok(())
}

/// Run a single command, printing any error
pub fn run(args: &Args) -> bool {
    match run_cmd(args) {
        Ok(()) => true,
        Err(err) => {
            eprintln!("{}", err.to_string().red());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inheritance::{Field, FieldValue};

    const INVENTORY: &str = "demos/inventory.toml";

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(
            ["bgp-models", "-i", INVENTORY]
                .iter()
                .chain(args.iter())
                .copied(),
        )
    }

    #[test]
    fn test_check() {
        assert!(run(&parse(&["check"])));
    }

    #[test]
    fn test_table_commands() {
        assert!(run(&parse(&["show", "routing-instance"])));
        assert!(run(&parse(&[
            "show-object",
            "peer-endpoint",
            "edge-01/192.0.2.1",
            "--include-inherited",
        ])));
        assert!(run(&parse(&["available-asns", "private"])));
        assert!(run(&parse(&["schema", "peer-group"])));
        assert!(run(&parse(&["expand", "6451[2-3]"])));
    }

    #[test]
    fn test_command_errors() {
        assert!(!run(&parse(&["available-asns", "public"])));
        assert!(!run(&parse(&["show-object", "peer-group", "edge-09/transit"])));
        let args = Args::parse_from(["bgp-models", "-i", "missing.toml", "check"]);
        assert!(!run(&args));
    }

    #[test]
    fn test_field_report_without_rules() {
        let schema = Schema::bgp().unwrap();
        let resolver = Resolver::new(&schema);
        let inventory = Inventory::from_file(INVENTORY).unwrap();
        let instance = inventory.entity(Kind::RoutingInstance, "edge-01").unwrap();
        let report = field_report(&resolver, &instance, true);
        assert_eq!(report.len(), Kind::RoutingInstance.fields().len());
        let (_, router_id) = report
            .iter()
            .find(|(field, _)| *field == Field::RouterId)
            .unwrap();
        assert_eq!(
            router_id.value,
            Some(FieldValue::Address("10.255.0.1".parse().unwrap()))
        );
        assert!(!router_id.inherited);
    }
}
