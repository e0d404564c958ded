use super::ids::{DriverId, LawEnforcerId};
use serde::{Deserialize, Serialize};

/// A driver participant.
///
/// License validity is derived from the driver's accepted fines and can only
/// be changed through [`crate::domain::resolution::assess_license`].
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Driver {
    pub id: DriverId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    license_valid: bool,
}

impl Driver {
    /// Registers a driver with a valid license.
    pub fn new(id: DriverId, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            license_valid: true,
        }
    }

    pub fn license_valid(&self) -> bool {
        self.license_valid
    }

    pub(crate) fn set_license_valid(&mut self, valid: bool) {
        self.license_valid = valid;
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LawEnforcerType {
    #[default]
    Police,
}

/// The participant that issues fines. Never mutated by the engine.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LawEnforcer {
    pub id: LawEnforcerId,
    pub kind: LawEnforcerType,
}

impl LawEnforcer {
    pub fn new(id: LawEnforcerId, kind: LawEnforcerType) -> Self {
        Self { id, kind }
    }
}
