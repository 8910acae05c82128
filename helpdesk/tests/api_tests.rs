use actix_web::{test, web, App};
use helpdesk::api::{self, Services};
use helpdesk::clock::{Clock, SystemClock};
use helpdesk::orders::OrderService;
use helpdesk::replies::ReplyService;
use helpdesk::stats::StatisticsService;
use helpdesk::store::SqliteStore;
use helpdesk::tickets::TicketService;
use serde_json::{json, Value};
use std::sync::Arc;

async fn services() -> web::Data<Services> {
    let store = SqliteStore::connect(&common::test_helpers::in_memory_database_url())
        .await
        .expect("failed to open store");
    store
        .initialize_schema()
        .await
        .expect("failed to initialize schema");
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    web::Data::new(Services {
        orders: OrderService::new(store.clone(), clock.clone()),
        tickets: TicketService::new(store.clone(), clock.clone()),
        replies: ReplyService::new(store.clone(), clock.clone()),
        stats: StatisticsService::new(store),
    })
}

fn order_body() -> Value {
    json!({
        "customer_name": "Kasun Perera",
        "customer_email": "kasun.perera@gmail.com",
        "customer_phone": "0771234567",
        "delivery_address": "No. 12, Galle Road, Colombo 03",
        "food_items": "Chicken Kottu Roti",
        "total_amount": "1500.00"
    })
}

fn ticket_body(order_id: i64) -> Value {
    json!({
        "title": "Food arrived cold",
        "description": "The kottu was cold on arrival.",
        "priority": "MEDIUM",
        "category": "Food Quality Issue",
        "customer_name": "Kasun Perera",
        "customer_email": "kasun.perera@gmail.com",
        "customer_phone": "0771234567",
        "order_id": order_id
    })
}

#[actix_web::test]
async fn health_endpoint_responds() {
    let app =
        test::init_service(App::new().app_data(services().await).configure(api::routes)).await;
    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn order_create_and_fetch() {
    let app =
        test::init_service(App::new().app_data(services().await).configure(api::routes)).await;

    let req = test::TestRequest::post()
        .uri("/orders")
        .set_json(order_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_i64().expect("order id");
    assert_eq!(created["status"], "PENDING");
    assert_eq!(created["currency"], "LKR");

    let req = test::TestRequest::get().uri(&format!("/orders/{id}")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get().uri("/orders/99999").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn invalid_order_lists_violated_fields() {
    let app =
        test::init_service(App::new().app_data(services().await).configure(api::routes)).await;

    let mut body = order_body();
    body["customer_name"] = json!("");
    body["total_amount"] = json!("-5");
    let req = test::TestRequest::post().uri("/orders").set_json(body).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let payload: Value = test::read_body_json(resp).await;
    let fields = payload["fields"].as_array().expect("fields array");
    assert!(fields.contains(&json!("customer_name")));
    assert!(fields.contains(&json!("total_amount")));
}

#[actix_web::test]
async fn resolved_ticket_rejects_full_updates_over_http() {
    let app =
        test::init_service(App::new().app_data(services().await).configure(api::routes)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/orders").set_json(order_body()).to_request(),
    )
    .await;
    let order: Value = test::read_body_json(resp).await;
    let order_id = order["id"].as_i64().unwrap();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/tickets")
            .set_json(ticket_body(order_id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let ticket: Value = test::read_body_json(resp).await;
    let ticket_id = ticket["id"].as_i64().unwrap();

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/tickets/{ticket_id}/status"))
            .set_json(json!({ "status": "RESOLVED" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let resolved: Value = test::read_body_json(resp).await;
    assert!(resolved["resolved_date"].is_string());

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/tickets/{ticket_id}/editable"))
            .to_request(),
    )
    .await;
    let editable: Value = test::read_body_json(resp).await;
    assert_eq!(editable["editable"], json!(false));

    let mut patch = ticket_body(order_id);
    patch.as_object_mut().unwrap().remove("order_id");
    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/tickets/{ticket_id}"))
            .set_json(patch)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 409);

    // replies still go through
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/tickets/{ticket_id}/replies"))
            .set_json(json!({
                "message": "Refund initiated.",
                "author_name": "Support Team",
                "author_email": "support@fooddesk.lk"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/tickets/{ticket_id}/replies"))
            .to_request(),
    )
    .await;
    let replies: Value = test::read_body_json(resp).await;
    assert_eq!(replies.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn category_listing_includes_suggestions() {
    let app =
        test::init_service(App::new().app_data(services().await).configure(api::routes)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/orders").set_json(order_body()).to_request(),
    )
    .await;
    let order: Value = test::read_body_json(resp).await;
    let order_id = order["id"].as_i64().unwrap();

    test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/tickets")
            .set_json(ticket_body(order_id))
            .to_request(),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/tickets/categories").to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let payload: Value = test::read_body_json(resp).await;
    assert_eq!(payload["suggested"].as_array().unwrap().len(), 8);
    assert_eq!(
        payload["in_use"],
        json!(["Food Quality Issue"]),
        "in-use categories reflect stored tickets"
    );
}

#[actix_web::test]
async fn dashboard_reports_totals() {
    let app =
        test::init_service(App::new().app_data(services().await).configure(api::routes)).await;

    test::call_service(
        &app,
        test::TestRequest::post().uri("/orders").set_json(order_body()).to_request(),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/stats/dashboard").to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let payload: Value = test::read_body_json(resp).await;
    assert_eq!(payload["total_orders"], json!(1));
    assert_eq!(payload["total_tickets"], json!(0));
}

#[actix_web::test]
async fn list_orders_accepts_query_filters() {
    let app =
        test::init_service(App::new().app_data(services().await).configure(api::routes)).await;

    test::call_service(
        &app,
        test::TestRequest::post().uri("/orders").set_json(order_body()).to_request(),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/orders?customer_name=kasun&status=PENDING")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let orders: Value = test::read_body_json(resp).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/orders?status=CANCELLED")
            .to_request(),
    )
    .await;
    let orders: Value = test::read_body_json(resp).await;
    assert!(orders.as_array().unwrap().is_empty());
}
