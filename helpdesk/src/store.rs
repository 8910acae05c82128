use crate::error::{DeskError, DeskResult};
use crate::model::{
    CategoryCount, CustomerActivity, ModelId, Order, OrderFilter, OrderStatus, Priority, Ticket,
    TicketFilter, TicketReply, TicketStatus,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::str::FromStr;
use tracing::debug;

const SCHEMA: &str = include_str!("../resources/schema.sql");

const ORDER_COLUMNS: &str = "id, customer_name, customer_email, customer_phone, \
     delivery_address, food_items, total_amount, currency, status, order_date, \
     special_instructions";

const TICKET_COLUMNS: &str = "id, title, description, priority, category, customer_name, \
     customer_email, customer_phone, status, created_date, updated_date, resolved_date, \
     order_id";

/// SQLite persistence for orders, tickets and replies.
///
/// Holds no domain rules: validation, permission checks and timestamping all
/// live in the lifecycle services. The one multi-row transaction in the
/// system (reply append + parent-ticket touch) is encapsulated here.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> DeskResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        // An in-memory SQLite database exists per connection, so the pool
        // must never open a second one.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    pub async fn initialize_schema(&self) -> DeskResult<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        debug!("schema initialized");
        Ok(())
    }

    /// Raw pool handle for callers that need to run their own queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ---- orders ----

    /// Inserts the order and returns the store-assigned id; the caller's id
    /// field is ignored.
    pub async fn insert_order(&self, order: &Order) -> DeskResult<ModelId> {
        let row = sqlx::query(
            "INSERT INTO orders (customer_name, customer_email, customer_phone, \
             delivery_address, food_items, total_amount, currency, status, order_date, \
             special_instructions) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(&order.customer_phone)
        .bind(&order.delivery_address)
        .bind(&order.food_items)
        .bind(order.total_amount.to_string())
        .bind(&order.currency)
        .bind(order.status.as_str())
        .bind(order.order_date)
        .bind(&order.special_instructions)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get(0))
    }

    pub async fn get_order(&self, id: ModelId) -> DeskResult<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(order_from_row).transpose().map_err(DeskError::from)
    }

    pub async fn list_orders(&self, filter: &OrderFilter) -> DeskResult<Vec<Order>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders WHERE 1=1"));
        if let Some(name) = &filter.customer_name {
            qb.push(" AND LOWER(customer_name) LIKE ");
            qb.push_bind(like_pattern(name));
        }
        if let Some(email) = &filter.customer_email {
            qb.push(" AND LOWER(customer_email) = ");
            qb.push_bind(email.to_lowercase());
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ");
            qb.push_bind(status.as_str());
        }
        if let Some(start) = filter.start_date {
            qb.push(" AND order_date >= ");
            qb.push_bind(start);
        }
        if let Some(end) = filter.end_date {
            qb.push(" AND order_date <= ");
            qb.push_bind(end);
        }
        let rows = qb.build().fetch_all(&self.pool).await?;
        collect_rows(&rows, order_from_row)
    }

    pub async fn recent_orders(&self, since: DateTime<Utc>) -> DeskResult<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_date >= ? ORDER BY order_date DESC"
        ))
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        collect_rows(&rows, order_from_row)
    }

    /// Full-row replace. Returns false when the id does not exist.
    pub async fn update_order(&self, order: &Order) -> DeskResult<bool> {
        let result = sqlx::query(
            "UPDATE orders SET customer_name = ?, customer_email = ?, customer_phone = ?, \
             delivery_address = ?, food_items = ?, total_amount = ?, currency = ?, \
             status = ?, order_date = ?, special_instructions = ? WHERE id = ?",
        )
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(&order.customer_phone)
        .bind(&order.delivery_address)
        .bind(&order.food_items)
        .bind(order.total_amount.to_string())
        .bind(&order.currency)
        .bind(order.status.as_str())
        .bind(order.order_date)
        .bind(&order.special_instructions)
        .bind(order.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn update_order_status(&self, id: ModelId, status: OrderStatus) -> DeskResult<bool> {
        let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Dependent tickets and their replies go with the order (ON DELETE
    /// CASCADE).
    pub async fn delete_order(&self, id: ModelId) -> DeskResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn order_exists(&self, id: ModelId) -> DeskResult<bool> {
        let row = sqlx::query("SELECT 1 FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    pub async fn count_orders(&self) -> DeskResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get(0))
    }

    pub async fn count_orders_by_status(&self, status: OrderStatus) -> DeskResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM orders WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get(0))
    }

    pub async fn top_customers_by_orders(&self) -> DeskResult<Vec<CustomerActivity>> {
        let rows = sqlx::query(
            "SELECT customer_name, customer_email, COUNT(*) AS activity FROM orders \
             GROUP BY customer_name, customer_email ORDER BY activity DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        collect_rows(&rows, customer_activity_from_row)
    }

    // ---- tickets ----

    pub async fn insert_ticket(&self, ticket: &Ticket) -> DeskResult<ModelId> {
        let row = sqlx::query(
            "INSERT INTO tickets (title, description, priority, category, customer_name, \
             customer_email, customer_phone, status, created_date, updated_date, \
             resolved_date, order_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.priority.as_str())
        .bind(&ticket.category)
        .bind(&ticket.customer_name)
        .bind(&ticket.customer_email)
        .bind(&ticket.customer_phone)
        .bind(ticket.status.as_str())
        .bind(ticket.created_date)
        .bind(ticket.updated_date)
        .bind(ticket.resolved_date)
        .bind(ticket.order_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get(0))
    }

    pub async fn get_ticket(&self, id: ModelId) -> DeskResult<Option<Ticket>> {
        let row = sqlx::query(&format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(ticket_from_row).transpose().map_err(DeskError::from)
    }

    pub async fn list_tickets(&self, filter: &TicketFilter) -> DeskResult<Vec<Ticket>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE 1=1"));
        if let Some(title) = &filter.title {
            qb.push(" AND LOWER(title) LIKE ");
            qb.push_bind(like_pattern(title));
        }
        if let Some(description) = &filter.description {
            qb.push(" AND LOWER(description) LIKE ");
            qb.push_bind(like_pattern(description));
        }
        if let Some(name) = &filter.customer_name {
            qb.push(" AND LOWER(customer_name) LIKE ");
            qb.push_bind(like_pattern(name));
        }
        if let Some(category) = &filter.category {
            qb.push(" AND LOWER(category) LIKE ");
            qb.push_bind(like_pattern(category));
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ");
            qb.push_bind(status.as_str());
        }
        if let Some(priority) = filter.priority {
            qb.push(" AND priority = ");
            qb.push_bind(priority.as_str());
        }
        if let Some(start) = filter.start_date {
            qb.push(" AND created_date >= ");
            qb.push_bind(start);
        }
        if let Some(end) = filter.end_date {
            qb.push(" AND created_date <= ");
            qb.push_bind(end);
        }
        let rows = qb.build().fetch_all(&self.pool).await?;
        collect_rows(&rows, ticket_from_row)
    }

    pub async fn tickets_for_order(&self, order_id: ModelId) -> DeskResult<Vec<Ticket>> {
        let rows = sqlx::query(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE order_id = ?"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        collect_rows(&rows, ticket_from_row)
    }

    pub async fn recent_tickets(&self, since: DateTime<Utc>) -> DeskResult<Vec<Ticket>> {
        let rows = sqlx::query(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE created_date >= ? \
             ORDER BY created_date DESC"
        ))
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        collect_rows(&rows, ticket_from_row)
    }

    pub async fn update_ticket(&self, ticket: &Ticket) -> DeskResult<bool> {
        let result = sqlx::query(
            "UPDATE tickets SET title = ?, description = ?, priority = ?, category = ?, \
             customer_name = ?, customer_email = ?, customer_phone = ?, status = ?, \
             updated_date = ?, resolved_date = ? WHERE id = ?",
        )
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.priority.as_str())
        .bind(&ticket.category)
        .bind(&ticket.customer_name)
        .bind(&ticket.customer_email)
        .bind(&ticket.customer_phone)
        .bind(ticket.status.as_str())
        .bind(ticket.updated_date)
        .bind(ticket.resolved_date)
        .bind(ticket.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Narrow status write. `resolved_date` is stamped only when supplied;
    /// an existing value is kept otherwise.
    pub async fn update_ticket_status(
        &self,
        id: ModelId,
        status: TicketStatus,
        updated_date: DateTime<Utc>,
        resolved_date: Option<DateTime<Utc>>,
    ) -> DeskResult<bool> {
        let result = sqlx::query(
            "UPDATE tickets SET status = ?, updated_date = ?, \
             resolved_date = COALESCE(?, resolved_date) WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(updated_date)
        .bind(resolved_date)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_ticket(&self, id: ModelId) -> DeskResult<bool> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn distinct_categories(&self) -> DeskResult<Vec<String>> {
        let rows = sqlx::query("SELECT DISTINCT category FROM tickets ORDER BY category")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| row.try_get("category"))
            .collect::<Result<_, _>>()
            .map_err(DeskError::from)
    }

    pub async fn count_tickets(&self) -> DeskResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM tickets")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get(0))
    }

    pub async fn count_tickets_by_status(&self, status: TicketStatus) -> DeskResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM tickets WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get(0))
    }

    pub async fn count_tickets_by_priority(&self, priority: Priority) -> DeskResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM tickets WHERE priority = ?")
            .bind(priority.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get(0))
    }

    pub async fn category_counts(&self) -> DeskResult<Vec<CategoryCount>> {
        let rows = sqlx::query(
            "SELECT category, COUNT(*) AS activity FROM tickets \
             GROUP BY category ORDER BY activity DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        collect_rows(&rows, |row| {
            Ok(CategoryCount {
                category: row.try_get("category")?,
                count: row.try_get("activity")?,
            })
        })
    }

    pub async fn top_customers_by_tickets(&self) -> DeskResult<Vec<CustomerActivity>> {
        let rows = sqlx::query(
            "SELECT customer_name, customer_email, COUNT(*) AS activity FROM tickets \
             GROUP BY customer_name, customer_email ORDER BY activity DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        collect_rows(&rows, customer_activity_from_row)
    }

    // ---- replies ----

    /// Appends the reply and touches the parent ticket's updated_date in
    /// one transaction: neither write is observable without the other.
    pub async fn append_reply(
        &self,
        reply: &TicketReply,
        touched_at: DateTime<Utc>,
    ) -> DeskResult<ModelId> {
        let mut tx = self.pool.begin().await?;

        let ticket = sqlx::query("SELECT id FROM tickets WHERE id = ?")
            .bind(reply.ticket_id)
            .fetch_optional(&mut *tx)
            .await?;
        if ticket.is_none() {
            return Err(DeskError::not_found("ticket", reply.ticket_id));
        }

        let row = sqlx::query(
            "INSERT INTO ticket_replies (message, author_name, author_email, created_date, \
             ticket_id) VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&reply.message)
        .bind(&reply.author_name)
        .bind(&reply.author_email)
        .bind(reply.created_date)
        .bind(reply.ticket_id)
        .fetch_one(&mut *tx)
        .await?;
        let id: ModelId = row.get(0);

        sqlx::query("UPDATE tickets SET updated_date = ? WHERE id = ?")
            .bind(touched_at)
            .bind(reply.ticket_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Replies in thread order.
    pub async fn list_replies(&self, ticket_id: ModelId) -> DeskResult<Vec<TicketReply>> {
        let rows = sqlx::query(
            "SELECT id, message, author_name, author_email, created_date, ticket_id \
             FROM ticket_replies WHERE ticket_id = ? ORDER BY created_date ASC, id ASC",
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await?;
        collect_rows(&rows, reply_from_row)
    }

    pub async fn count_replies(&self, ticket_id: ModelId) -> DeskResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM ticket_replies WHERE ticket_id = ?")
            .bind(ticket_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get(0))
    }
}

fn like_pattern(needle: &str) -> String {
    format!("%{}%", needle.to_lowercase())
}

fn collect_rows<T>(
    rows: &[SqliteRow],
    map: impl Fn(&SqliteRow) -> Result<T, sqlx::Error>,
) -> DeskResult<Vec<T>> {
    rows.iter().map(map).collect::<Result<_, _>>().map_err(DeskError::from)
}

fn order_from_row(row: &SqliteRow) -> Result<Order, sqlx::Error> {
    Ok(Order {
        id: row.try_get("id")?,
        customer_name: row.try_get("customer_name")?,
        customer_email: row.try_get("customer_email")?,
        customer_phone: row.try_get("customer_phone")?,
        delivery_address: row.try_get("delivery_address")?,
        food_items: row.try_get("food_items")?,
        total_amount: decode_decimal(row, "total_amount")?,
        currency: row.try_get("currency")?,
        status: decode_enum::<OrderStatus>(row, "status")?,
        order_date: row.try_get("order_date")?,
        special_instructions: row.try_get("special_instructions")?,
    })
}

fn ticket_from_row(row: &SqliteRow) -> Result<Ticket, sqlx::Error> {
    Ok(Ticket {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        priority: decode_enum::<Priority>(row, "priority")?,
        category: row.try_get("category")?,
        customer_name: row.try_get("customer_name")?,
        customer_email: row.try_get("customer_email")?,
        customer_phone: row.try_get("customer_phone")?,
        status: decode_enum::<TicketStatus>(row, "status")?,
        created_date: row.try_get("created_date")?,
        updated_date: row.try_get("updated_date")?,
        resolved_date: row.try_get("resolved_date")?,
        order_id: row.try_get("order_id")?,
    })
}

fn reply_from_row(row: &SqliteRow) -> Result<TicketReply, sqlx::Error> {
    Ok(TicketReply {
        id: row.try_get("id")?,
        message: row.try_get("message")?,
        author_name: row.try_get("author_name")?,
        author_email: row.try_get("author_email")?,
        created_date: row.try_get("created_date")?,
        ticket_id: row.try_get("ticket_id")?,
    })
}

fn customer_activity_from_row(row: &SqliteRow) -> Result<CustomerActivity, sqlx::Error> {
    Ok(CustomerActivity {
        customer_name: row.try_get("customer_name")?,
        customer_email: row.try_get("customer_email")?,
        count: row.try_get("activity")?,
    })
}

fn decode_decimal(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(&raw).map_err(|source| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    })
}

/// An unreadable enum string means a corrupt row; it is surfaced as a
/// decode failure, never replaced with a default.
fn decode_enum<T>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = crate::model::UnknownEnumValue>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|source: crate::model::UnknownEnumValue| {
        sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(source),
        }
    })
}
