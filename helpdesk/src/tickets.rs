use crate::clock::Clock;
use crate::error::{DeskError, DeskResult};
use crate::model::{ModelId, Ticket, TicketDraft, TicketFilter, TicketPatch, TicketStatus};
use crate::store::SqliteStore;
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info};

/// Ticket lifecycle, including the edit-permission rule.
///
/// Full-record updates are refused while the stored status is IN_PROGRESS
/// or RESOLVED; the narrower status-change path is never gated. Entering
/// RESOLVED through a status change stamps resolved_date; nothing ever
/// clears it.
pub struct TicketService {
    store: SqliteStore,
    clock: Arc<dyn Clock>,
}

impl TicketService {
    pub fn new(store: SqliteStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn create(&self, draft: TicketDraft) -> DeskResult<Ticket> {
        validate_ticket_fields(
            &draft.title,
            &draft.description,
            &draft.category,
            &draft.customer_name,
            &draft.customer_email,
            &draft.customer_phone,
        )?;
        if !self.store.order_exists(draft.order_id).await? {
            return Err(DeskError::not_found("order", draft.order_id));
        }
        let now = self.clock.now();
        let mut ticket = Ticket {
            id: 0,
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            category: draft.category,
            customer_name: draft.customer_name,
            customer_email: draft.customer_email,
            customer_phone: draft.customer_phone,
            status: draft.status.unwrap_or(TicketStatus::Open),
            created_date: now,
            updated_date: now,
            resolved_date: None,
            order_id: draft.order_id,
        };
        ticket.id = self.store.insert_ticket(&ticket).await?;
        info!(ticket_id = ticket.id, order_id = ticket.order_id, "created ticket");
        Ok(ticket)
    }

    pub async fn get(&self, id: ModelId) -> DeskResult<Ticket> {
        self.store
            .get_ticket(id)
            .await?
            .ok_or_else(|| DeskError::not_found("ticket", id))
    }

    pub async fn list(&self, filter: &TicketFilter) -> DeskResult<Vec<Ticket>> {
        self.store.list_tickets(filter).await
    }

    pub async fn for_order(&self, order_id: ModelId) -> DeskResult<Vec<Ticket>> {
        self.store.tickets_for_order(order_id).await
    }

    /// Tickets opened within the last `days` days, newest first.
    pub async fn recent(&self, days: i64) -> DeskResult<Vec<Ticket>> {
        let since = self.clock.now() - Duration::days(days);
        self.store.recent_tickets(since).await
    }

    /// Whether a full-record update would currently be accepted. A missing
    /// id is simply not editable.
    pub async fn can_edit(&self, id: ModelId) -> DeskResult<bool> {
        Ok(self
            .store
            .get_ticket(id)
            .await?
            .map(|ticket| ticket.is_editable())
            .unwrap_or(false))
    }

    /// Full-record update, gated on the *stored* status. The patch may
    /// itself move the status into a locked state; the ticket then stays
    /// locked for subsequent updates.
    pub async fn update(&self, id: ModelId, patch: TicketPatch) -> DeskResult<Ticket> {
        let current = self.get(id).await?;
        if !current.is_editable() {
            return Err(DeskError::PermissionDenied {
                id,
                status: current.status,
            });
        }
        validate_ticket_fields(
            &patch.title,
            &patch.description,
            &patch.category,
            &patch.customer_name,
            &patch.customer_email,
            &patch.customer_phone,
        )?;
        let ticket = Ticket {
            id,
            title: patch.title,
            description: patch.description,
            priority: patch.priority,
            category: patch.category,
            customer_name: patch.customer_name,
            customer_email: patch.customer_email,
            customer_phone: patch.customer_phone,
            status: patch.status.unwrap_or(current.status),
            created_date: current.created_date,
            updated_date: self.clock.now(),
            resolved_date: current.resolved_date,
            order_id: current.order_id,
        };
        self.store.update_ticket(&ticket).await?;
        debug!(ticket_id = id, "updated ticket");
        Ok(ticket)
    }

    /// Status change, allowed regardless of editability. Entering RESOLVED
    /// stamps resolved_date; leaving it keeps the stamp.
    pub async fn set_status(&self, id: ModelId, status: TicketStatus) -> DeskResult<Ticket> {
        let now = self.clock.now();
        let resolved_at = (status == TicketStatus::Resolved).then_some(now);
        if !self
            .store
            .update_ticket_status(id, status, now, resolved_at)
            .await?
        {
            return Err(DeskError::not_found("ticket", id));
        }
        info!(ticket_id = id, status = %status, "changed ticket status");
        self.get(id).await
    }

    /// Deletes the ticket and its replies.
    pub async fn delete(&self, id: ModelId) -> DeskResult<()> {
        if !self.store.delete_ticket(id).await? {
            return Err(DeskError::not_found("ticket", id));
        }
        info!(ticket_id = id, "deleted ticket");
        Ok(())
    }

    /// Distinct category values currently in use, sorted. Category is an
    /// open string domain; this feeds filter UIs, it is not an enum.
    pub async fn categories(&self) -> DeskResult<Vec<String>> {
        self.store.distinct_categories().await
    }
}

fn validate_ticket_fields(
    title: &str,
    description: &str,
    category: &str,
    customer_name: &str,
    customer_email: &str,
    customer_phone: &str,
) -> DeskResult<()> {
    let mut fields = Vec::new();
    if title.trim().is_empty() {
        fields.push("title");
    }
    if description.trim().is_empty() || description.chars().count() > 2000 {
        fields.push("description");
    }
    if category.trim().is_empty() {
        fields.push("category");
    }
    if customer_name.trim().is_empty() {
        fields.push("customer_name");
    }
    if customer_email.trim().is_empty() {
        fields.push("customer_email");
    }
    if customer_phone.trim().is_empty() {
        fields.push("customer_phone");
    }
    if fields.is_empty() {
        Ok(())
    } else {
        Err(DeskError::validation(fields))
    }
}
