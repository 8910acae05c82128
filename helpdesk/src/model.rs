use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ModelId = i64;

/// Raised when a persisted enum column holds a string no variant maps to.
/// Surfaced through the store error arm rather than silently defaulted.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownEnumValue {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownEnumValue {
                kind: "order status",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "OPEN",
            TicketStatus::InProgress => "IN_PROGRESS",
            TicketStatus::Resolved => "RESOLVED",
            TicketStatus::Closed => "CLOSED",
        }
    }
}

impl FromStr for TicketStatus {
    type Err = UnknownEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TicketStatus::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownEnumValue {
                kind: "ticket status",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        }
    }
}

impl FromStr for Priority {
    type Err = UnknownEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownEnumValue {
                kind: "priority",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer's food purchase record with delivery and payment details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: ModelId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub food_items: String,
    pub total_amount: Decimal,
    pub currency: String,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub special_instructions: Option<String>,
}

/// A customer-support case linked to exactly one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: ModelId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub status: TicketStatus,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
    pub resolved_date: Option<DateTime<Utc>>,
    pub order_id: ModelId,
}

impl Ticket {
    /// A ticket accepts full-record edits only while it is not being worked
    /// on and not already resolved. Status changes and replies are never
    /// gated by this.
    pub fn is_editable(&self) -> bool {
        !matches!(self.status, TicketStatus::InProgress | TicketStatus::Resolved)
    }
}

/// A single threaded message appended to a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketReply {
    pub id: ModelId,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub created_date: DateTime<Utc>,
    pub ticket_id: ModelId,
}

/// Caller-supplied order fields for create and update. `order_date` is
/// honored on update only; creation always stamps the current time.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderDraft {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub food_items: String,
    pub total_amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub special_instructions: Option<String>,
}

/// Caller-supplied ticket fields at creation. Customer fields are stored
/// exactly as given; pre-filling them from the order is the caller's job.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    #[serde(default)]
    pub status: Option<TicketStatus>,
    pub order_id: ModelId,
}

/// Full-record ticket update. Carries no `order_id`: tickets are never
/// re-parented. A supplied status is applied verbatim, even into a locked
/// state.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketPatch {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    #[serde(default)]
    pub status: Option<TicketStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyDraft {
    pub message: String,
    pub author_name: String,
    pub author_email: String,
}

/// Conjunctive order search. An unset field places no constraint; the empty
/// filter matches every order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    /// Case-insensitive substring match on the customer name.
    pub customer_name: Option<String>,
    /// Case-insensitive exact match on the customer email.
    pub customer_email: Option<String>,
    pub status: Option<OrderStatus>,
    /// Inclusive lower bound on the order date.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the order date.
    pub end_date: Option<DateTime<Utc>>,
}

/// Conjunctive ticket search with the same unset-means-unconstrained rule.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketFilter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub customer_name: Option<String>,
    pub category: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Ticket volume for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Activity of one customer, grouped by (name, email).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerActivity {
    pub customer_name: String,
    pub customer_email: String,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TicketStatusCounts {
    pub open: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub closed: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TicketPriorityCounts {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
    pub urgent: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderStatusCounts {
    pub pending: i64,
    pub confirmed: i64,
    pub preparing: i64,
    pub out_for_delivery: i64,
    pub delivered: i64,
    pub cancelled: i64,
}

/// Everything the dashboard view renders, assembled from independent count
/// queries over one store.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_orders: i64,
    pub total_tickets: i64,
    pub orders_by_status: OrderStatusCounts,
    pub tickets_by_status: TicketStatusCounts,
    pub tickets_by_priority: TicketPriorityCounts,
    pub tickets_by_category: Vec<CategoryCount>,
    pub top_customers_by_tickets: Vec<CustomerActivity>,
    pub top_customers_by_orders: Vec<CustomerActivity>,
}
