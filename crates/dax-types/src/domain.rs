//! Scheduling domains.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The logical dimension a scheduled computation iterates over.
///
/// A worklet declares one domain; the scheduler asks every argument how
/// long that domain is and launches one work item per entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    /// One work item per grid point.
    Point,
    /// One work item per grid cell.
    Cell,
}

impl Domain {
    /// Returns a lowercase name for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Domain::Point => "point",
            Domain::Cell => "cell",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
