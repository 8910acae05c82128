use crate::error::DeskResult;
use crate::model::{
    CategoryCount, CustomerActivity, DashboardStats, OrderStatus, OrderStatusCounts, Priority,
    TicketPriorityCounts, TicketStatus, TicketStatusCounts,
};
use crate::store::SqliteStore;

const TOP_CUSTOMER_LIMIT: usize = 5;

/// Read-only rollups for the dashboard. Each figure comes from its own
/// count query; the snapshot is only as consistent as running those
/// queries back to back.
pub struct StatisticsService {
    store: SqliteStore,
}

impl StatisticsService {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    pub async fn ticket_status_counts(&self) -> DeskResult<TicketStatusCounts> {
        Ok(TicketStatusCounts {
            open: self.store.count_tickets_by_status(TicketStatus::Open).await?,
            in_progress: self
                .store
                .count_tickets_by_status(TicketStatus::InProgress)
                .await?,
            resolved: self
                .store
                .count_tickets_by_status(TicketStatus::Resolved)
                .await?,
            closed: self.store.count_tickets_by_status(TicketStatus::Closed).await?,
        })
    }

    pub async fn ticket_priority_counts(&self) -> DeskResult<TicketPriorityCounts> {
        Ok(TicketPriorityCounts {
            low: self.store.count_tickets_by_priority(Priority::Low).await?,
            medium: self.store.count_tickets_by_priority(Priority::Medium).await?,
            high: self.store.count_tickets_by_priority(Priority::High).await?,
            urgent: self.store.count_tickets_by_priority(Priority::Urgent).await?,
        })
    }

    pub async fn order_status_counts(&self) -> DeskResult<OrderStatusCounts> {
        Ok(OrderStatusCounts {
            pending: self.store.count_orders_by_status(OrderStatus::Pending).await?,
            confirmed: self
                .store
                .count_orders_by_status(OrderStatus::Confirmed)
                .await?,
            preparing: self
                .store
                .count_orders_by_status(OrderStatus::Preparing)
                .await?,
            out_for_delivery: self
                .store
                .count_orders_by_status(OrderStatus::OutForDelivery)
                .await?,
            delivered: self
                .store
                .count_orders_by_status(OrderStatus::Delivered)
                .await?,
            cancelled: self
                .store
                .count_orders_by_status(OrderStatus::Cancelled)
                .await?,
        })
    }

    /// Ticket volume per category, busiest first.
    pub async fn tickets_by_category(&self) -> DeskResult<Vec<CategoryCount>> {
        self.store.category_counts().await
    }

    /// Every (name, email) group, most tickets first.
    pub async fn top_customers_by_tickets(&self) -> DeskResult<Vec<CustomerActivity>> {
        self.store.top_customers_by_tickets().await
    }

    /// Every (name, email) group, most orders first.
    pub async fn top_customers_by_orders(&self) -> DeskResult<Vec<CustomerActivity>> {
        self.store.top_customers_by_orders().await
    }

    /// Top five, or fewer when fewer groups exist; never padded.
    pub async fn top5_customers_by_tickets(&self) -> DeskResult<Vec<CustomerActivity>> {
        let mut customers = self.top_customers_by_tickets().await?;
        customers.truncate(TOP_CUSTOMER_LIMIT);
        Ok(customers)
    }

    pub async fn top5_customers_by_orders(&self) -> DeskResult<Vec<CustomerActivity>> {
        let mut customers = self.top_customers_by_orders().await?;
        customers.truncate(TOP_CUSTOMER_LIMIT);
        Ok(customers)
    }

    pub async fn dashboard(&self) -> DeskResult<DashboardStats> {
        Ok(DashboardStats {
            total_orders: self.store.count_orders().await?,
            total_tickets: self.store.count_tickets().await?,
            orders_by_status: self.order_status_counts().await?,
            tickets_by_status: self.ticket_status_counts().await?,
            tickets_by_priority: self.ticket_priority_counts().await?,
            tickets_by_category: self.tickets_by_category().await?,
            top_customers_by_tickets: self.top5_customers_by_tickets().await?,
            top_customers_by_orders: self.top5_customers_by_orders().await?,
        })
    }
}
