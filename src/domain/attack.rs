// ============================================================
// Layer 3 - Attack Classes
// ============================================================
// The traffic categories of the classic KDD-style intrusion
// taxonomy. Index 0 is always benign traffic; every other index
// is an attack family.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackClass {
    Normal,
    /// Denial of service
    Dos,
    /// Surveillance and port scanning
    Probe,
    /// Remote to local: unauthorised access from a remote machine
    R2l,
    /// User to root: privilege escalation
    U2r,
}

impl AttackClass {
    pub const ALL: [AttackClass; 5] = [
        AttackClass::Normal,
        AttackClass::Dos,
        AttackClass::Probe,
        AttackClass::R2l,
        AttackClass::U2r,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AttackClass::Normal => "normal",
            AttackClass::Dos    => "dos",
            AttackClass::Probe  => "probe",
            AttackClass::R2l    => "r2l",
            AttackClass::U2r    => "u2r",
        }
    }

    /// Class names in index order, as the classifier stores them
    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|c| c.as_str().to_string()).collect()
    }
}
