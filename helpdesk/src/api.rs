//! JSON REST surface over the lifecycle services. Transport concerns only:
//! parsing, routing, status-code mapping and the category suggestion list
//! live here, never in the components themselves.

use crate::error::DeskError;
use crate::model::{
    ModelId, OrderDraft, OrderFilter, OrderStatus, ReplyDraft, TicketDraft, TicketFilter,
    TicketPatch, TicketStatus,
};
use crate::orders::OrderService;
use crate::replies::ReplyService;
use crate::stats::StatisticsService;
use crate::tickets::TicketService;
use actix_web::{web, HttpResponse, ResponseError};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

/// Categories offered to the new-ticket form. Purely a suggestion: the
/// ticket component stores any non-empty category string.
pub const SUGGESTED_CATEGORIES: [&str; 8] = [
    "Food Quality Issue",
    "Delivery Problem",
    "Order Incorrect",
    "Payment Issue",
    "Customer Service",
    "Technical Problem",
    "Refund Request",
    "General Inquiry",
];

const DEFAULT_RECENT_DAYS: i64 = 30;

pub struct Services {
    pub orders: OrderService,
    pub tickets: TicketService,
    pub replies: ReplyService,
    pub stats: StatisticsService,
}

impl ResponseError for DeskError {
    fn error_response(&self) -> HttpResponse {
        error!(cause = %self, "request failed");
        match self {
            DeskError::Validation { fields } => HttpResponse::BadRequest()
                .json(json!({ "error": "validation failed", "fields": fields })),
            DeskError::NotFound { entity, id } => HttpResponse::NotFound()
                .json(json!({ "error": format!("{entity} {id} not found") })),
            DeskError::PermissionDenied { .. } => {
                HttpResponse::Conflict().json(json!({ "error": self.to_string() }))
            }
            DeskError::Store(_) => HttpResponse::InternalServerError()
                .json(json!({ "error": "storage failure" })),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OrderStatusChange {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct TicketStatusChange {
    pub status: TicketStatus,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub days: Option<i64>,
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// ---- orders ----

pub async fn create_order(
    state: web::Data<Services>,
    body: web::Json<OrderDraft>,
) -> Result<HttpResponse, DeskError> {
    let order = state.orders.create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(order))
}

pub async fn list_orders(
    state: web::Data<Services>,
    filter: web::Query<OrderFilter>,
) -> Result<HttpResponse, DeskError> {
    let orders = state.orders.list(&filter).await?;
    Ok(HttpResponse::Ok().json(orders))
}

pub async fn recent_orders(
    state: web::Data<Services>,
    query: web::Query<RecentQuery>,
) -> Result<HttpResponse, DeskError> {
    let orders = state
        .orders
        .recent(query.days.unwrap_or(DEFAULT_RECENT_DAYS))
        .await?;
    Ok(HttpResponse::Ok().json(orders))
}

pub async fn get_order(
    state: web::Data<Services>,
    path: web::Path<ModelId>,
) -> Result<HttpResponse, DeskError> {
    let order = state.orders.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn update_order(
    state: web::Data<Services>,
    path: web::Path<ModelId>,
    body: web::Json<OrderDraft>,
) -> Result<HttpResponse, DeskError> {
    let order = state.orders.update(path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn delete_order(
    state: web::Data<Services>,
    path: web::Path<ModelId>,
) -> Result<HttpResponse, DeskError> {
    state.orders.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn set_order_status(
    state: web::Data<Services>,
    path: web::Path<ModelId>,
    body: web::Json<OrderStatusChange>,
) -> Result<HttpResponse, DeskError> {
    let order = state.orders.set_status(path.into_inner(), body.status).await?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn tickets_for_order(
    state: web::Data<Services>,
    path: web::Path<ModelId>,
) -> Result<HttpResponse, DeskError> {
    let tickets = state.tickets.for_order(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tickets))
}

// ---- tickets ----

pub async fn create_ticket(
    state: web::Data<Services>,
    body: web::Json<TicketDraft>,
) -> Result<HttpResponse, DeskError> {
    let ticket = state.tickets.create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(ticket))
}

pub async fn list_tickets(
    state: web::Data<Services>,
    filter: web::Query<TicketFilter>,
) -> Result<HttpResponse, DeskError> {
    let tickets = state.tickets.list(&filter).await?;
    Ok(HttpResponse::Ok().json(tickets))
}

pub async fn recent_tickets(
    state: web::Data<Services>,
    query: web::Query<RecentQuery>,
) -> Result<HttpResponse, DeskError> {
    let tickets = state
        .tickets
        .recent(query.days.unwrap_or(DEFAULT_RECENT_DAYS))
        .await?;
    Ok(HttpResponse::Ok().json(tickets))
}

pub async fn list_categories(state: web::Data<Services>) -> Result<HttpResponse, DeskError> {
    let in_use = state.tickets.categories().await?;
    Ok(HttpResponse::Ok().json(json!({
        "in_use": in_use,
        "suggested": SUGGESTED_CATEGORIES,
    })))
}

pub async fn get_ticket(
    state: web::Data<Services>,
    path: web::Path<ModelId>,
) -> Result<HttpResponse, DeskError> {
    let ticket = state.tickets.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ticket))
}

pub async fn update_ticket(
    state: web::Data<Services>,
    path: web::Path<ModelId>,
    body: web::Json<TicketPatch>,
) -> Result<HttpResponse, DeskError> {
    let ticket = state.tickets.update(path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ticket))
}

pub async fn delete_ticket(
    state: web::Data<Services>,
    path: web::Path<ModelId>,
) -> Result<HttpResponse, DeskError> {
    state.tickets.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn set_ticket_status(
    state: web::Data<Services>,
    path: web::Path<ModelId>,
    body: web::Json<TicketStatusChange>,
) -> Result<HttpResponse, DeskError> {
    let ticket = state.tickets.set_status(path.into_inner(), body.status).await?;
    Ok(HttpResponse::Ok().json(ticket))
}

pub async fn ticket_editable(
    state: web::Data<Services>,
    path: web::Path<ModelId>,
) -> Result<HttpResponse, DeskError> {
    let editable = state.tickets.can_edit(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "editable": editable })))
}

// ---- replies ----

pub async fn list_replies(
    state: web::Data<Services>,
    path: web::Path<ModelId>,
) -> Result<HttpResponse, DeskError> {
    let replies = state.replies.list(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(replies))
}

pub async fn add_reply(
    state: web::Data<Services>,
    path: web::Path<ModelId>,
    body: web::Json<ReplyDraft>,
) -> Result<HttpResponse, DeskError> {
    let reply = state.replies.add(path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(reply))
}

// ---- statistics ----

pub async fn dashboard(state: web::Data<Services>) -> Result<HttpResponse, DeskError> {
    let stats = state.stats.dashboard().await?;
    Ok(HttpResponse::Ok().json(stats))
}

pub async fn ticket_status_distribution(
    state: web::Data<Services>,
) -> Result<HttpResponse, DeskError> {
    Ok(HttpResponse::Ok().json(state.stats.ticket_status_counts().await?))
}

pub async fn ticket_priority_distribution(
    state: web::Data<Services>,
) -> Result<HttpResponse, DeskError> {
    Ok(HttpResponse::Ok().json(state.stats.ticket_priority_counts().await?))
}

pub async fn order_status_distribution(
    state: web::Data<Services>,
) -> Result<HttpResponse, DeskError> {
    Ok(HttpResponse::Ok().json(state.stats.order_status_counts().await?))
}

/// Registers every route. Literal segments are registered before `{id}`
/// captures so `/orders/recent` is not swallowed by `/orders/{id}`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/orders", web::post().to(create_order))
        .route("/orders", web::get().to(list_orders))
        .route("/orders/recent", web::get().to(recent_orders))
        .route("/orders/{id}", web::get().to(get_order))
        .route("/orders/{id}", web::put().to(update_order))
        .route("/orders/{id}", web::delete().to(delete_order))
        .route("/orders/{id}/status", web::put().to(set_order_status))
        .route("/orders/{id}/tickets", web::get().to(tickets_for_order))
        .route("/tickets", web::post().to(create_ticket))
        .route("/tickets", web::get().to(list_tickets))
        .route("/tickets/recent", web::get().to(recent_tickets))
        .route("/tickets/categories", web::get().to(list_categories))
        .route("/tickets/{id}", web::get().to(get_ticket))
        .route("/tickets/{id}", web::put().to(update_ticket))
        .route("/tickets/{id}", web::delete().to(delete_ticket))
        .route("/tickets/{id}/status", web::put().to(set_ticket_status))
        .route("/tickets/{id}/editable", web::get().to(ticket_editable))
        .route("/tickets/{id}/replies", web::get().to(list_replies))
        .route("/tickets/{id}/replies", web::post().to(add_reply))
        .route("/stats/dashboard", web::get().to(dashboard))
        .route("/stats/tickets/status", web::get().to(ticket_status_distribution))
        .route("/stats/tickets/priority", web::get().to(ticket_priority_distribution))
        .route("/stats/orders/status", web::get().to(order_status_distribution));
}
