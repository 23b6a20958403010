//! Strictness profile for geometric tolerances.

use serde::{Deserialize, Serialize};

/// An integer strictness tier. Higher profiles admit larger gaps when
/// matching symbols; neither a node nor a system can lower the floor
/// set by the other, so the effective profile is always the max.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Profile(pub u8);

impl Profile {
    /// Default strictness.
    pub const STANDARD: Profile = Profile(0);
    /// Loosest tier used by the resolution driver.
    pub const MAX: Profile = Profile(3);

    /// Effective profile for a resolution attempt.
    pub fn combined(self, other: Profile) -> Profile {
        self.max(other)
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}
