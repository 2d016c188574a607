//! Remote resources and the offline routing table.
//!
//! Each remote resource is named explicitly; which partition (if any) serves
//! it while offline is decided here by an exhaustive match, never by looking
//! at request paths.

use crate::Partition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A collection exposed by the remote REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    Clients,
    WorkOrders,
    WorkProcesses,
    TurboParts,
    CarMakes,
    Vehicles,
    WorksheetTemplates,
}

impl Resource {
    /// Path segment under the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            Resource::Clients => "clients",
            Resource::WorkOrders => "work-orders",
            Resource::WorkProcesses => "work-processes",
            Resource::TurboParts => "turbo-parts",
            Resource::CarMakes => "car-makes",
            Resource::Vehicles => "vehicles",
            Resource::WorksheetTemplates => "worksheet-templates",
        }
    }

    /// Partition serving this resource while offline.
    pub fn offline_partition(self) -> Option<Partition> {
        match self {
            Resource::Clients => Some(Partition::Clients),
            Resource::WorkOrders => Some(Partition::WorkOrders),
            Resource::WorkProcesses
            | Resource::TurboParts
            | Resource::CarMakes
            | Resource::Vehicles
            | Resource::WorksheetTemplates => None,
        }
    }

    /// Resource that accepts replayed records of `partition`.
    pub fn for_partition(partition: Partition) -> Option<Resource> {
        match partition {
            Partition::Clients => Some(Resource::Clients),
            Partition::WorkOrders => Some(Resource::WorkOrders),
            Partition::Settings => None,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
