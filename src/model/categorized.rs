use serde::{Deserialize, Serialize};
use std::fmt;

/// A four-bucket quantity used for both demand and money
///
/// Equality is exact per bucket: two values with the same total but a
/// different split are not equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategorizedValue {
    pub economic: u64,
    pub executive: u64,
    pub first_class: u64,
    pub cargo: u64,
}

impl CategorizedValue {
    pub fn new(economic: u64, executive: u64, first_class: u64, cargo: u64) -> Self {
        Self {
            economic,
            executive,
            first_class,
            cargo,
        }
    }

}

impl fmt::Display for CategorizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.economic, self.executive, self.first_class, self.cargo
        )
    }
}
