mod support;

use chrono::Duration;
use helpdesk::model::TicketStatus;
use helpdesk::DeskError;
use std::error::Error;
use support::{order_draft, reply_draft, setup, ticket_draft};

#[tokio::test]
async fn reply_to_missing_ticket_reports_not_found() {
    let desk = setup().await;
    let err = desk
        .replies
        .add(999, reply_draft("Anyone there?"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn reply_validation_collects_fields() -> Result<(), Box<dyn Error + Send + Sync>> {
    let desk = setup().await;
    let order = desk.orders.create(order_draft("Kasun Perera")).await?;
    let ticket = desk.tickets.create(ticket_draft(order.id)).await?;

    let mut draft = reply_draft("");
    draft.author_name = String::new();
    draft.author_email = "  ".to_string();

    let err = desk.replies.add(ticket.id, draft).await.unwrap_err();
    match err {
        DeskError::Validation { fields } => {
            for expected in ["message", "author_name", "author_email"] {
                assert!(fields.contains(&expected.to_string()), "missing {expected}");
            }
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn created_date_is_server_time() -> Result<(), Box<dyn Error + Send + Sync>> {
    let desk = setup().await;
    let order = desk.orders.create(order_draft("Kasun Perera")).await?;
    let ticket = desk.tickets.create(ticket_draft(order.id)).await?;

    desk.clock.advance(Duration::minutes(10));
    let reply = desk.replies.add(ticket.id, reply_draft("Looking into it.")).await?;
    assert_eq!(reply.created_date, desk.clock.current());
    assert_eq!(reply.ticket_id, ticket.id);
    Ok(())
}

#[tokio::test]
async fn replies_come_back_in_thread_order() -> Result<(), Box<dyn Error + Send + Sync>> {
    let desk = setup().await;
    let order = desk.orders.create(order_draft("Kasun Perera")).await?;
    let ticket = desk.tickets.create(ticket_draft(order.id)).await?;

    let first = desk.replies.add(ticket.id, reply_draft("First")).await?;
    desk.clock.advance(Duration::minutes(1));
    let second = desk.replies.add(ticket.id, reply_draft("Second")).await?;
    desk.clock.advance(Duration::minutes(1));
    let third = desk.replies.add(ticket.id, reply_draft("Third")).await?;

    let thread = desk.replies.list(ticket.id).await?;
    let ids: Vec<i64> = thread.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);
    assert!(thread.windows(2).all(|w| w[0].created_date <= w[1].created_date));

    assert_eq!(desk.replies.count(ticket.id).await?, 3);
    Ok(())
}

#[tokio::test]
async fn replies_bypass_the_edit_lock_and_touch_the_ticket(
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let desk = setup().await;
    let order = desk.orders.create(order_draft("Kasun Perera")).await?;
    let ticket = desk.tickets.create(ticket_draft(order.id)).await?;

    desk.tickets.set_status(ticket.id, TicketStatus::Resolved).await?;
    let locked = desk.tickets.get(ticket.id).await?;
    assert!(!locked.is_editable());

    desk.clock.advance(Duration::minutes(30));
    desk.replies
        .add(ticket.id, reply_draft("Closing note for the record."))
        .await?;

    let touched = desk.tickets.get(ticket.id).await?;
    assert_eq!(touched.updated_date, desk.clock.current());
    assert!(touched.updated_date > locked.updated_date);
    // the lock itself is untouched
    assert_eq!(touched.status, TicketStatus::Resolved);
    assert!(desk
        .tickets
        .update(ticket.id, support::ticket_patch())
        .await
        .is_err());
    Ok(())
}

#[tokio::test]
async fn listing_replies_of_a_missing_ticket_is_empty() -> Result<(), Box<dyn Error + Send + Sync>>
{
    let desk = setup().await;
    assert!(desk.replies.list(999).await?.is_empty());
    assert_eq!(desk.replies.count(999).await?, 0);
    Ok(())
}
