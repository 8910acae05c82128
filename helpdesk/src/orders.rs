use crate::clock::Clock;
use crate::error::{DeskError, DeskResult};
use crate::model::{ModelId, Order, OrderDraft, OrderFilter, OrderStatus};
use crate::store::SqliteStore;
use chrono::Duration;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_CURRENCY: &str = "LKR";

/// Order lifecycle: creation, lookup, search, full edits, status changes
/// and (cascading) deletion. Any status may move to any other; there is no
/// transition graph.
pub struct OrderService {
    store: SqliteStore,
    clock: Arc<dyn Clock>,
}

impl OrderService {
    pub fn new(store: SqliteStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn create(&self, draft: OrderDraft) -> DeskResult<Order> {
        validate_order(&draft)?;
        let mut order = Order {
            id: 0,
            customer_name: draft.customer_name,
            customer_email: draft.customer_email,
            customer_phone: draft.customer_phone,
            delivery_address: draft.delivery_address,
            food_items: draft.food_items,
            total_amount: draft.total_amount.round_dp(2),
            currency: draft.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            status: draft.status.unwrap_or(OrderStatus::Pending),
            order_date: self.clock.now(),
            special_instructions: draft.special_instructions,
        };
        order.id = self.store.insert_order(&order).await?;
        info!(order_id = order.id, customer = %order.customer_name, "created order");
        Ok(order)
    }

    pub async fn get(&self, id: ModelId) -> DeskResult<Order> {
        self.store
            .get_order(id)
            .await?
            .ok_or_else(|| DeskError::not_found("order", id))
    }

    pub async fn list(&self, filter: &OrderFilter) -> DeskResult<Vec<Order>> {
        self.store.list_orders(filter).await
    }

    /// Orders placed within the last `days` days, newest first.
    pub async fn recent(&self, days: i64) -> DeskResult<Vec<Order>> {
        let since = self.clock.now() - Duration::days(days);
        self.store.recent_orders(since).await
    }

    /// Full replace of the mutable fields. The order date is kept unless
    /// the draft supplies one.
    pub async fn update(&self, id: ModelId, draft: OrderDraft) -> DeskResult<Order> {
        let current = self.get(id).await?;
        validate_order(&draft)?;
        let order = Order {
            id,
            customer_name: draft.customer_name,
            customer_email: draft.customer_email,
            customer_phone: draft.customer_phone,
            delivery_address: draft.delivery_address,
            food_items: draft.food_items,
            total_amount: draft.total_amount.round_dp(2),
            currency: draft.currency.unwrap_or(current.currency),
            status: draft.status.unwrap_or(current.status),
            order_date: draft.order_date.unwrap_or(current.order_date),
            special_instructions: draft.special_instructions,
        };
        self.store.update_order(&order).await?;
        debug!(order_id = id, "updated order");
        Ok(order)
    }

    pub async fn set_status(&self, id: ModelId, status: OrderStatus) -> DeskResult<Order> {
        if !self.store.update_order_status(id, status).await? {
            return Err(DeskError::not_found("order", id));
        }
        info!(order_id = id, status = %status, "changed order status");
        self.get(id).await
    }

    /// Deletes the order together with its tickets and their replies.
    /// Reports NotFound for an absent id; callers treat that as soft.
    pub async fn delete(&self, id: ModelId) -> DeskResult<()> {
        if !self.store.delete_order(id).await? {
            return Err(DeskError::not_found("order", id));
        }
        info!(order_id = id, "deleted order");
        Ok(())
    }
}

fn validate_order(draft: &OrderDraft) -> DeskResult<()> {
    let mut fields = Vec::new();
    if draft.customer_name.trim().is_empty() {
        fields.push("customer_name");
    }
    if draft.customer_email.trim().is_empty() {
        fields.push("customer_email");
    }
    if draft.customer_phone.trim().is_empty() {
        fields.push("customer_phone");
    }
    if draft.delivery_address.trim().is_empty() || draft.delivery_address.chars().count() > 500 {
        fields.push("delivery_address");
    }
    if draft.food_items.trim().is_empty() || draft.food_items.chars().count() > 1000 {
        fields.push("food_items");
    }
    if draft.total_amount <= Decimal::ZERO {
        fields.push("total_amount");
    }
    if let Some(instructions) = &draft.special_instructions {
        if instructions.chars().count() > 500 {
            fields.push("special_instructions");
        }
    }
    if fields.is_empty() {
        Ok(())
    } else {
        Err(DeskError::validation(fields))
    }
}
