use crate::clock::Clock;
use crate::error::{DeskError, DeskResult};
use crate::model::{ModelId, ReplyDraft, TicketReply};
use crate::store::SqliteStore;
use std::sync::Arc;
use tracing::info;

/// Append-only reply threads. Adding a reply is permitted whatever the
/// ticket's status; it advances the parent ticket's updated_date in the
/// same store transaction as the insert.
pub struct ReplyService {
    store: SqliteStore,
    clock: Arc<dyn Clock>,
}

impl ReplyService {
    pub fn new(store: SqliteStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// The created_date is server time; any caller-supplied value has no
    /// way in (the draft carries none).
    pub async fn add(&self, ticket_id: ModelId, draft: ReplyDraft) -> DeskResult<TicketReply> {
        validate_reply(&draft)?;
        let now = self.clock.now();
        let mut reply = TicketReply {
            id: 0,
            message: draft.message,
            author_name: draft.author_name,
            author_email: draft.author_email,
            created_date: now,
            ticket_id,
        };
        reply.id = self.store.append_reply(&reply, now).await?;
        info!(ticket_id, reply_id = reply.id, "appended reply");
        Ok(reply)
    }

    /// Thread order: created_date ascending.
    pub async fn list(&self, ticket_id: ModelId) -> DeskResult<Vec<TicketReply>> {
        self.store.list_replies(ticket_id).await
    }

    pub async fn count(&self, ticket_id: ModelId) -> DeskResult<i64> {
        self.store.count_replies(ticket_id).await
    }
}

fn validate_reply(draft: &ReplyDraft) -> DeskResult<()> {
    let mut fields = Vec::new();
    if draft.message.trim().is_empty() || draft.message.chars().count() > 2000 {
        fields.push("message");
    }
    if draft.author_name.trim().is_empty() {
        fields.push("author_name");
    }
    if draft.author_email.trim().is_empty() {
        fields.push("author_email");
    }
    if fields.is_empty() {
        Ok(())
    } else {
        Err(DeskError::validation(fields))
    }
}
