//! Table insertion order.
//!
//! `DependencyOrder` is the explicit list the merger follows. It can be written
//! by hand or derived from foreign-key edges with `DependencyGraph`.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, Result};

/// Hand-maintained order for the hospital dataset.
pub const DEFAULT_TABLE_ORDER: &[&str] = &[
    "address",
    "lab",
    "department",
    "medication",
    "person",
    "patient",
    "medical_staff",
    "nurse",
    "research_doctor",
    "attending_doctor",
    "treatment",
    "staff_shift",
    "treatment_medication",
];

/// Ordered table identifiers; referenced tables come first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyOrder(Vec<String>);

impl DependencyOrder {
    pub fn new<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tables.into_iter().map(Into::into).collect())
    }

    pub fn tables(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, table: &str) -> bool {
        self.0.iter().any(|t| t == table)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for DependencyOrder {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_ORDER.iter().copied())
    }
}

/// `table` holds a foreign key into `references`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub table: String,
    pub references: String,
}

impl ForeignKey {
    pub fn new(table: impl Into<String>, references: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            references: references.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    tables: Vec<String>,
    parents: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Build from declared tables plus edges. Tables that only appear in an
    /// edge are appended after the declared ones, in edge order.
    pub fn from_edges<I, S>(tables: I, edges: &[ForeignKey]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut graph = Self::default();
        for table in tables {
            graph.add_table(table.into());
        }
        for edge in edges {
            graph.add_table(edge.table.clone());
            graph.add_table(edge.references.clone());
            // self-references do not constrain insert order between tables
            if edge.table != edge.references {
                graph
                    .parents
                    .entry(edge.table.clone())
                    .or_default()
                    .push(edge.references.clone());
            }
        }
        graph
    }

    fn add_table(&mut self, table: String) {
        if !self.tables.contains(&table) {
            self.tables.push(table);
        }
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Depth-first topological sort: every table is emitted after the tables
    /// it references. Ties keep declaration order.
    pub fn topological_order(&self) -> Result<DependencyOrder> {
        let mut visited = HashSet::new();
        let mut in_progress = HashSet::new();
        let mut order = Vec::with_capacity(self.tables.len());

        for table in &self.tables {
            self.visit(table, &mut visited, &mut in_progress, &mut order)?;
        }

        Ok(DependencyOrder(order))
    }

    fn visit(
        &self,
        table: &str,
        visited: &mut HashSet<String>,
        in_progress: &mut HashSet<String>,
        order: &mut Vec<String>,
    ) -> Result<()> {
        if in_progress.contains(table) {
            return Err(MigrateError::DependencyCycle {
                table: table.to_string(),
            });
        }
        if visited.contains(table) {
            return Ok(());
        }

        in_progress.insert(table.to_string());
        if let Some(parents) = self.parents.get(table) {
            for parent in parents {
                self.visit(parent, visited, in_progress, order)?;
            }
        }
        in_progress.remove(table);

        visited.insert(table.to_string());
        order.push(table.to_string());
        Ok(())
    }
}
