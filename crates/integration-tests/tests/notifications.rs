//! Stored orders survive failing email delivery.

#![allow(clippy::indexing_slicing)]

use pandi_dorty_core::OrderKind;
use pandi_dorty_integration_tests::{
    FailingMailServer, TestDb, christmas_sweets, days_from_today, regular_order, wedding_tasting,
};
use pandi_dorty_web::db::{OrderRepository, PhotoRepository};
use pandi_dorty_web::models::NewPhoto;
use pandi_dorty_web::services::OrderService;

#[tokio::test]
async fn test_order_is_kept_when_both_emails_fail() {
    let Some(db) = TestDb::create().await else {
        return;
    };
    let mail = FailingMailServer::start().await;
    let email = mail.email_service();
    let photo = NewPhoto::from_upload(Some("dort.png"), Some("image/png"), vec![137, 80, 78, 71])
        .expect("valid photo")
        .expect("non-empty photo");

    let submitted = OrderService::new(&db.pool, &email, 5)
        .submit(
            regular_order("Jana Novakova", days_from_today(10)),
            vec![photo],
        )
        .await
        .expect("order stored despite mail failure");
    assert_eq!(submitted.photo_count, 1);

    let stored = OrderRepository::new(&db.pool)
        .get_by_id(submitted.order.id)
        .await
        .expect("query")
        .expect("order exists");
    assert_eq!(stored.order_number, submitted.order.order_number);
    let photos = PhotoRepository::new(&db.pool)
        .list_for_orders(&[stored.id])
        .await
        .expect("photos");
    assert_eq!(photos.len(), 1);

    let requests = mail.requests();
    assert_eq!(requests.len(), 2, "admin and customer sends are both attempted");

    let admin = &requests[0];
    assert_eq!(admin["to"][0], "pandidorty@gmail.com");
    assert!(
        admin["text"]
            .as_str()
            .expect("text body")
            .contains("Přiložené fotografie: dort.png")
    );
    assert_eq!(admin["attachments"][0]["filename"], "dort.png");
    assert_eq!(admin["attachments"][0]["content"], "iVBORw==");

    let customer = &requests[1];
    assert_eq!(customer["to"][0], "jana@seznam.cz");
    assert!(customer.get("attachments").is_none());

    db.drop().await;
}

#[tokio::test]
async fn test_capacity_limited_order_is_kept_when_email_fails() {
    let Some(db) = TestDb::create().await else {
        return;
    };
    let mail = FailingMailServer::start().await;
    let email = mail.email_service();
    let service = OrderService::new(&db.pool, &email, 1);

    service
        .submit(wedding_tasting("Jana Novakova"), Vec::new())
        .await
        .expect("wedding tasting stored");
    service
        .submit(christmas_sweets("Petr Svoboda"), Vec::new())
        .await
        .expect("sweets order stored");

    let repo = OrderRepository::new(&db.pool);
    assert_eq!(
        repo.count_by_kind(OrderKind::WeddingTasting)
            .await
            .expect("count"),
        1
    );
    assert_eq!(
        repo.count_by_kind(OrderKind::ChristmasSweets)
            .await
            .expect("count"),
        1
    );
    assert_eq!(mail.requests().len(), 4);

    db.drop().await;
}
