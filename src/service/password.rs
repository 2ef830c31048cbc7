//! Password hashing.

use crate::service::ServiceError;

/// Turns a plaintext password into the string storage keeps.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, ServiceError>;

    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// bcrypt with a configurable work factor.
///
/// Hashes are self-describing (`$2b$<cost>$<salt><digest>`), so a hash made
/// with one cost still verifies after the cost changes.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    // Mirrors bcrypt's private MIN_COST / MAX_COST.
    pub const MIN_COST: u32 = 4;
    pub const MAX_COST: u32 = 31;

    /// `cost` outside [`Self::MIN_COST`]..=[`Self::MAX_COST`] fails on hash.
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String, ServiceError> {
        bcrypt::hash(password, self.cost).map_err(|e| ServiceError::Hash(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::debug!(error = %e, "Stored password hash is unreadable");
                false
            }
        }
    }
}
