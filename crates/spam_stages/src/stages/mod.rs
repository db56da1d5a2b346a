//! Spam-check stage implementations

mod aggregate_results;
mod classify_spam;
mod derive_user;
mod expand_messages;
mod seed;

pub use aggregate_results::AggregateResults;
pub use classify_spam::ClassifySpam;
pub use derive_user::{user_id, DeriveUser};
pub use expand_messages::ExpandMessages;
pub use seed::SeedEmails;
