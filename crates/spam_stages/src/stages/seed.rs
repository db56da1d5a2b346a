//! SeedEmails - source stage emitting the configured emails

use contracts::{Inlet, Outlet, Stage};
use tracing::{debug, warn};

/// Emits each email once, in order
///
/// Source stage: never reads its input conduit.
#[derive(Debug, Clone)]
pub struct SeedEmails {
    emails: Vec<String>,
}

impl SeedEmails {
    pub fn new(emails: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            emails: emails.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

impl Stage for SeedEmails {
    type Input = ();
    type Output = String;

    fn name(&self) -> &str {
        "seed_emails"
    }

    async fn run(&mut self, _input: Inlet<()>, output: Outlet<String>) {
        let emails = std::mem::take(&mut self.emails);
        debug!(count = emails.len(), "Seeding emails");
        for email in emails {
            if output.send(email).await.is_err() {
                warn!("Output conduit closed, stopping seed");
                return;
            }
        }
    }
}
