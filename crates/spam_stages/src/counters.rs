//! Statistics counter names used by the spam-check stages

use observability::StatsRegistry;

/// Users derived from emails
pub const DERIVE_USER: &str = "derive_user";
/// Users consumed by the expand stage
pub const EXPAND_USERS: &str = "expand_users";
/// Messages produced by the expand stage
pub const EXPAND_MESSAGES: &str = "expand_messages";
/// Messages classified
pub const CLASSIFY_SPAM: &str = "classify_spam";
/// Results collected by the aggregate stage
pub const AGGREGATE_RESULTS: &str = "aggregate_results";

/// Every counter, in pipeline order
pub const ALL: [&str; 5] = [
    DERIVE_USER,
    EXPAND_USERS,
    EXPAND_MESSAGES,
    CLASSIFY_SPAM,
    AGGREGATE_RESULTS,
];

/// Registry holding exactly the spam-check counters
pub fn registry() -> StatsRegistry {
    StatsRegistry::new(ALL)
}
