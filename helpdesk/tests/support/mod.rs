#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use helpdesk::clock::Clock;
use helpdesk::model::{OrderDraft, Priority, ReplyDraft, TicketDraft, TicketPatch};
use helpdesk::orders::OrderService;
use helpdesk::replies::ReplyService;
use helpdesk::stats::StatisticsService;
use helpdesk::store::SqliteStore;
use helpdesk::tickets::TicketService;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

/// Clock the tests move by hand, so every stamped timestamp is predictable.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(start: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(start),
        })
    }

    pub fn advance(&self, delta: Duration) {
        *self.now.lock().unwrap() += delta;
    }

    pub fn current(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub struct TestDesk {
    pub store: SqliteStore,
    pub clock: Arc<ManualClock>,
    pub orders: OrderService,
    pub tickets: TicketService,
    pub replies: ReplyService,
    pub stats: StatisticsService,
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub async fn setup() -> TestDesk {
    let store = SqliteStore::connect(&common::test_helpers::in_memory_database_url())
        .await
        .expect("failed to open store");
    store
        .initialize_schema()
        .await
        .expect("failed to initialize schema");

    let clock = ManualClock::at(start_time());
    let shared: Arc<dyn Clock> = clock.clone();
    TestDesk {
        orders: OrderService::new(store.clone(), shared.clone()),
        tickets: TicketService::new(store.clone(), shared.clone()),
        replies: ReplyService::new(store.clone(), shared.clone()),
        stats: StatisticsService::new(store.clone()),
        store,
        clock,
    }
}

pub fn order_draft(customer_name: &str) -> OrderDraft {
    OrderDraft {
        customer_name: customer_name.to_string(),
        customer_email: format!(
            "{}@gmail.com",
            customer_name.to_lowercase().replace(' ', ".")
        ),
        customer_phone: "0771234567".to_string(),
        delivery_address: "No. 12, Galle Road, Colombo 03".to_string(),
        food_items: "Chicken Kottu Roti, Watalappan".to_string(),
        total_amount: Decimal::new(150_000, 2),
        currency: None,
        status: None,
        order_date: None,
        special_instructions: None,
    }
}

pub fn ticket_draft(order_id: i64) -> TicketDraft {
    TicketDraft {
        title: "Food arrived cold".to_string(),
        description: "The kottu was cold on arrival.".to_string(),
        priority: Priority::Medium,
        category: "Food Quality Issue".to_string(),
        customer_name: "Kasun Perera".to_string(),
        customer_email: "kasun.perera@gmail.com".to_string(),
        customer_phone: "0771234567".to_string(),
        status: None,
        order_id,
    }
}

pub fn ticket_patch() -> TicketPatch {
    TicketPatch {
        title: "Food arrived cold".to_string(),
        description: "The kottu was cold on arrival, customer wants a refund.".to_string(),
        priority: Priority::High,
        category: "Refund Request".to_string(),
        customer_name: "Kasun Perera".to_string(),
        customer_email: "kasun.perera@gmail.com".to_string(),
        customer_phone: "0771234567".to_string(),
        status: None,
    }
}

pub fn reply_draft(message: &str) -> ReplyDraft {
    ReplyDraft {
        message: message.to_string(),
        author_name: "Support Team".to_string(),
        author_email: "support@fooddesk.lk".to_string(),
    }
}
