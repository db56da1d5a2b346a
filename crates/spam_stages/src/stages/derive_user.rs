//! DeriveUser - email → User

use std::sync::Arc;

use contracts::{Inlet, Outlet, Stage, User};
use observability::StatsRegistry;
use sha1::{Digest, Sha1};
use tracing::{trace, warn};

use crate::counters;

/// Stable user id for an email: the low 64 bits of its SHA-1 digest, big-endian
pub fn user_id(email: &str) -> u64 {
    let digest = Sha1::digest(email.as_bytes());
    let mut low = [0u8; 8];
    low.copy_from_slice(&digest[digest.len() - 8..]);
    u64::from_be_bytes(low)
}

/// Turns each email into a [`User`]
#[derive(Debug, Clone)]
pub struct DeriveUser {
    stats: Arc<StatsRegistry>,
}

impl DeriveUser {
    pub fn new(stats: Arc<StatsRegistry>) -> Self {
        Self { stats }
    }
}

impl Stage for DeriveUser {
    type Input = String;
    type Output = User;

    fn name(&self) -> &str {
        "derive_user"
    }

    async fn run(&mut self, input: Inlet<String>, output: Outlet<User>) {
        while let Some(email) = input.recv().await {
            let user = User {
                id: user_id(&email),
                email,
            };
            trace!(user_id = user.id, email = %user.email, "Derived user");

            if output.send(user).await.is_err() {
                warn!("Output conduit closed, stopping stage");
                return;
            }
            self.stats.increment(counters::DERIVE_USER);
        }
    }
}
