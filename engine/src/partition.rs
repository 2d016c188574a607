//! Partitions and their index definitions.
//!
//! The partition set is fixed: every store opens with exactly these three
//! partitions and the indexes declared here. There is no runtime migration.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named collection of records of one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Partition {
    Clients,
    WorkOrders,
    Settings,
}

/// Definition of a secondary index on a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDef {
    /// Field the index is built on
    pub field: &'static str,
    /// Whether two records may share a value
    pub unique: bool,
}

const CLIENT_INDEXES: &[IndexDef] = &[IndexDef {
    field: "name",
    unique: false,
}];

const WORK_ORDER_INDEXES: &[IndexDef] = &[IndexDef {
    field: "work_number",
    unique: true,
}];

impl Partition {
    /// Every partition, in store-open order.
    pub const ALL: [Partition; 3] = [Partition::Clients, Partition::WorkOrders, Partition::Settings];

    /// Partitions whose records can be created offline and replayed later.
    pub const OFFLINE: [Partition; 2] = [Partition::Clients, Partition::WorkOrders];

    /// The partition's stable name.
    pub fn name(self) -> &'static str {
        match self {
            Partition::Clients => "clients",
            Partition::WorkOrders => "workOrders",
            Partition::Settings => "settings",
        }
    }

    /// Secondary indexes declared for this partition.
    pub fn indexes(self) -> &'static [IndexDef] {
        match self {
            Partition::Clients => CLIENT_INDEXES,
            Partition::WorkOrders => WORK_ORDER_INDEXES,
            Partition::Settings => &[],
        }
    }

    /// Look up an index definition by field.
    pub fn index(self, field: &str) -> Option<&'static IndexDef> {
        self.indexes().iter().find(|idx| idx.field == field)
    }

    /// Whether records in this partition take part in reconciliation.
    pub fn is_offline(self) -> bool {
        Self::OFFLINE.contains(&self)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Partition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Partition::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| Error::UnknownPartition(s.to_string()))
    }
}
