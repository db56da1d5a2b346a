//! ExpandMessages - User → MessageId (fan-out)

use std::sync::Arc;

use contracts::{Inlet, MessageId, Outlet, Stage, User};
use observability::StatsRegistry;
use tracing::warn;

use crate::counters;

/// Produces `messages_per_user` messages for every user
#[derive(Debug, Clone)]
pub struct ExpandMessages {
    stats: Arc<StatsRegistry>,
    messages_per_user: usize,
}

impl ExpandMessages {
    pub fn new(stats: Arc<StatsRegistry>, messages_per_user: usize) -> Self {
        Self {
            stats,
            messages_per_user,
        }
    }
}

impl Stage for ExpandMessages {
    type Input = User;
    type Output = MessageId;

    fn name(&self) -> &str {
        "expand_messages"
    }

    async fn run(&mut self, input: Inlet<User>, output: Outlet<MessageId>) {
        while let Some(user) = input.recv().await {
            self.stats.increment(counters::EXPAND_USERS);

            for k in 1..=self.messages_per_user {
                let message = MessageId {
                    user_id: user.id,
                    text: format!("Message {k} from {}", user.email),
                };
                if output.send(message).await.is_err() {
                    warn!(user_id = user.id, "Output conduit closed, stopping stage");
                    return;
                }
                self.stats.increment(counters::EXPAND_MESSAGES);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::test_support::{closed_with, collect};
    use contracts::Conduit;

    #[tokio::test]
    async fn test_fans_out_per_user() {
        let stats = Arc::new(counters::registry());
        let input = closed_with(vec![
            User {
                id: 7,
                email: "a@x.io".into(),
            },
            User {
                id: 9,
                email: "b@x.io".into(),
            },
        ])
        .await;
        let output = Conduit::new(8);

        ExpandMessages::new(Arc::clone(&stats), 3)
            .run(input.inlet(), output.outlet())
            .await;
        output.closer().close();

        let messages = collect(output.inlet()).await;
        assert_eq!(messages.len(), 6);
        assert_eq!(messages[0].text, "Message 1 from a@x.io");
        assert_eq!(messages[2].text, "Message 3 from a@x.io");
        assert_eq!(messages[3].user_id, 9);
        assert_eq!(stats.get(counters::EXPAND_USERS), Some(2));
        assert_eq!(stats.get(counters::EXPAND_MESSAGES), Some(6));
    }
}
