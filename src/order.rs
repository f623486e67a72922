//! Table creation order.
//!
//! MySQL rejects a foreign key that references a table which does not exist
//! yet, so tables are layered: first those without foreign keys, then in
//! each round every table whose referenced tables are all placed. The
//! number of rounds is bounded by `tables + 1`; a cycle between tables
//! leaves them unplaced.

use crate::schema::Schema;
use crate::validate::ErrorKind;
use tracing::{debug, info, warn};

/// Tables that could not be placed within the round budget.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Could not order tables by their foreign keys ({placed} placed, unresolved: {}); \
     they probably reference each other",
    .unplaced.join(", ")
)]
pub struct OrderingIncomplete {
    pub placed: usize,
    pub unplaced: Vec<String>,
}

impl OrderingIncomplete {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::OrderingIncomplete
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOrder {
    /// Tables in creation order.
    pub order: Vec<String>,
    /// Tables left over when the round budget ran out, in schema order.
    pub unplaced: Vec<String>,
    /// Rounds run after seeding.
    pub rounds: usize,
}

impl TableOrder {
    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }

    pub fn incomplete(&self) -> Option<OrderingIncomplete> {
        (!self.is_complete()).then(|| OrderingIncomplete {
            placed: self.order.len(),
            unplaced: self.unplaced.clone(),
        })
    }

    pub fn position(&self, table: &str) -> Option<usize> {
        self.order.iter().position(|t| t == table)
    }
}

/// Order the tables of a schema by their foreign-key dependencies.
pub fn order_tables(schema: &Schema) -> TableOrder {
    let tables: Vec<(&str, Vec<&str>)> = schema
        .tables()
        .iter()
        .map(|t| (t.name.as_str(), t.dependencies()))
        .collect();
    order_by_dependencies(&tables)
}

/// Order `(table, referenced tables)` pairs.
///
/// Input order is the tie-break: within a round tables are placed in the
/// order they are given, so the result is deterministic.
pub fn order_by_dependencies(tables: &[(&str, Vec<&str>)]) -> TableOrder {
    let max_rounds = tables.len() + 1;

    let mut order: Vec<&str> = tables
        .iter()
        .filter(|(_, deps)| deps.is_empty())
        .map(|(name, _)| *name)
        .collect();
    let mut pending: Vec<&(&str, Vec<&str>)> =
        tables.iter().filter(|(_, deps)| !deps.is_empty()).collect();

    let mut rounds = 0;
    while !pending.is_empty() && rounds < max_rounds {
        rounds += 1;

        let mut waiting = Vec::with_capacity(pending.len());
        for entry in pending {
            let (name, deps) = entry;
            let satisfied = deps.iter().all(|dep| dep == name || order.contains(dep));
            if satisfied {
                order.push(*name);
            } else {
                waiting.push(entry);
            }
        }
        pending = waiting;

        debug!(round = rounds, placed = order.len(), waiting = pending.len(), "ordering round");
    }

    let unplaced: Vec<String> = pending.iter().map(|(name, _)| name.to_string()).collect();
    if unplaced.is_empty() {
        info!(tables = order.len(), "tables have been fully ordered");
    } else {
        warn!(
            rounds,
            unplaced = %unplaced.join(", "),
            "hit the maximum number of table ordering rounds"
        );
    }

    TableOrder {
        order: order.into_iter().map(str::to_string).collect(),
        unplaced,
        rounds,
    }
}
