use crate::error::DeskResult;
use crate::model::{Order, OrderStatus, Priority, Ticket, TicketReply, TicketStatus};
use crate::store::SqliteStore;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tracing::info;

const ORDER_COUNT: usize = 10;
const TICKETED_ORDER_COUNT: usize = 8;

const CUSTOMER_NAMES: [&str; 16] = [
    "Kasun Perera",
    "Nimali Silva",
    "Chaminda Fernando",
    "Sanduni Jayawardena",
    "Ruwan Wickramasinghe",
    "Dilini Rajapaksa",
    "Tharaka Gunasekara",
    "Priyanka Mendis",
    "Asanka Wijeratne",
    "Chathurika Bandara",
    "Mahesh Dissanayake",
    "Samanthi Kumari",
    "Janith Rathnayake",
    "Thilini Seneviratne",
    "Dhanushka Amarasinghe",
    "Kavitha Liyanage",
];

const DISHES: [&str; 18] = [
    "Chicken Kottu Roti",
    "Fish Curry with Rice",
    "Hoppers with Egg",
    "Chicken Fried Rice",
    "Vegetable Curry",
    "Pol Sambol with Rice",
    "String Hoppers",
    "Chicken Curry",
    "Dhal Curry",
    "Parippu Curry",
    "Fish Ambul Thiyal",
    "Beef Curry",
    "Chicken Devilled",
    "Egg Hoppers",
    "Coconut Roti",
    "Kiribath",
    "Watalappan",
    "Curd with Treacle",
];

const STREETS: [&str; 6] = [
    "Galle Road, Colombo 03",
    "Kandy Road, Kadawatha",
    "Temple Road, Nugegoda",
    "Main Street, Negombo",
    "Lake Road, Kurunegala",
    "Hill Street, Dehiwala",
];

const TICKET_CATEGORIES: [&str; 8] = [
    "Food Quality Issue",
    "Delivery Problem",
    "Order Incorrect",
    "Payment Issue",
    "Customer Service",
    "Technical Problem",
    "Refund Request",
    "General Inquiry",
];

const TICKET_TITLES: [&str; 6] = [
    "Food arrived cold",
    "Order took too long",
    "Wrong items delivered",
    "Charged twice for the order",
    "Rider could not find the address",
    "Portion smaller than expected",
];

const REPLY_MESSAGES: [&str; 4] = [
    "Thank you for reporting this, we are looking into it.",
    "We have contacted the kitchen about your order.",
    "A refund has been initiated and should reach you within 3 days.",
    "Could you share a photo of the delivered items?",
];

/// Demonstration-data generator. All randomness flows from the caller's
/// seed, so a given seed always produces the same rows.
pub struct DemoDataGenerator {
    rng: StdRng,
}

impl DemoDataGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Populates an empty store with synthetic orders, tickets and replies.
    /// A store that already holds orders is left untouched. Returns whether
    /// anything was written.
    pub async fn populate_if_empty(
        &mut self,
        store: &SqliteStore,
        now: DateTime<Utc>,
    ) -> DeskResult<bool> {
        if store.count_orders().await? > 0 {
            info!("store already contains data, skipping demo seed");
            return Ok(false);
        }

        let mut order_ids = Vec::with_capacity(ORDER_COUNT);
        for _ in 0..ORDER_COUNT {
            let order = self.order(now);
            order_ids.push((store.insert_order(&order).await?, order));
        }

        for (order_id, order) in order_ids.iter().take(TICKETED_ORDER_COUNT) {
            let ticket = self.ticket(*order_id, order, now);
            let ticket_id = store.insert_ticket(&ticket).await?;
            if self.rng.gen_bool(0.5) {
                let reply = self.reply(ticket_id, &ticket);
                store.append_reply(&reply, reply.created_date).await?;
            }
        }

        info!(orders = ORDER_COUNT, "seeded demonstration data");
        Ok(true)
    }

    fn order(&mut self, now: DateTime<Utc>) -> Order {
        let name = *CUSTOMER_NAMES.choose(&mut self.rng).unwrap();
        Order {
            id: 0,
            customer_name: name.to_string(),
            customer_email: email_for(name),
            customer_phone: self.phone(),
            delivery_address: self.address(),
            food_items: self.dishes(),
            total_amount: Decimal::new(self.rng.gen_range(50_000..500_000), 2),
            currency: "LKR".to_string(),
            status: *OrderStatus::ALL.choose(&mut self.rng).unwrap(),
            order_date: now - Duration::hours(self.rng.gen_range(1..720)),
            special_instructions: if self.rng.gen_bool(0.3) {
                Some("Please ring the bell twice".to_string())
            } else {
                None
            },
        }
    }

    fn ticket(&mut self, order_id: i64, order: &Order, now: DateTime<Utc>) -> Ticket {
        let status = *TicketStatus::ALL.choose(&mut self.rng).unwrap();
        let created = now - Duration::hours(self.rng.gen_range(1..240));
        let updated = created + Duration::hours(self.rng.gen_range(0..48));
        Ticket {
            id: 0,
            title: TICKET_TITLES.choose(&mut self.rng).unwrap().to_string(),
            description: format!(
                "Customer reported a problem with the order containing {}.",
                order.food_items
            ),
            priority: *Priority::ALL.choose(&mut self.rng).unwrap(),
            category: TICKET_CATEGORIES.choose(&mut self.rng).unwrap().to_string(),
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.clone(),
            customer_phone: order.customer_phone.clone(),
            status,
            created_date: created,
            updated_date: updated,
            resolved_date: (status == TicketStatus::Resolved)
                .then(|| updated + Duration::hours(self.rng.gen_range(0..24))),
            order_id,
        }
    }

    fn reply(&mut self, ticket_id: i64, ticket: &Ticket) -> TicketReply {
        TicketReply {
            id: 0,
            message: REPLY_MESSAGES.choose(&mut self.rng).unwrap().to_string(),
            author_name: "Support Team".to_string(),
            author_email: "support@fooddesk.lk".to_string(),
            created_date: ticket.created_date + Duration::hours(1),
            ticket_id,
        }
    }

    fn phone(&mut self) -> String {
        format!("07{}{:07}", self.rng.gen_range(0..8), self.rng.gen_range(0..10_000_000))
    }

    fn address(&mut self) -> String {
        format!(
            "No. {}, {}",
            self.rng.gen_range(1..300),
            STREETS.choose(&mut self.rng).unwrap()
        )
    }

    fn dishes(&mut self) -> String {
        let count = self.rng.gen_range(1..4);
        let mut picked: Vec<&str> = DISHES
            .choose_multiple(&mut self.rng, count)
            .copied()
            .collect();
        picked.sort_unstable();
        picked.join(", ")
    }
}

fn email_for(name: &str) -> String {
    format!("{}@gmail.com", name.to_lowercase().replace(' ', "."))
}
