//! Order storage, listing and milestone toggles.

#![allow(clippy::indexing_slicing)]

use pandi_dorty_core::{AdminUserId, OrderDetails, OrderKind, OrderStatus};
use pandi_dorty_integration_tests::{
    TestDb, christmas_sweets, christmas_tasting, days_from_today, disabled_email, regular_order,
    wedding_tasting,
};
use pandi_dorty_web::db::orders::{
    Milestone, OrderListQuery, SortDirection, SortField, StatusFilter,
};
use pandi_dorty_web::db::{AdminUserRepository, OrderRepository, RepositoryError};
use pandi_dorty_web::services::OrderService;
use pandi_dorty_web::services::auth::hash_password;

async fn seed_admin(db: &TestDb) -> AdminUserId {
    let email = pandi_dorty_core::Email::parse("admin@pandidorty.cz").expect("email");
    AdminUserRepository::new(&db.pool)
        .create(&email, "Admin", &hash_password("dortik-heslo").expect("hash"))
        .await
        .expect("admin")
        .id
}

#[tokio::test]
async fn test_every_kind_reads_back_as_stored() {
    let Some(db) = TestDb::create().await else {
        return;
    };
    let email = disabled_email();
    let service = OrderService::new(&db.pool, &email, 15);
    let repo = OrderRepository::new(&db.pool);

    let orders = [
        regular_order("Jana Novakova", days_from_today(10)),
        wedding_tasting("Eva Svobodova"),
        christmas_sweets("Petr Dvorak"),
        christmas_tasting("Marie Cerna", days_from_today(5)),
    ];

    for order in orders {
        let submitted = service.submit(order.clone(), Vec::new()).await.expect("submit");
        let stored = repo
            .get_by_id(submitted.order.id)
            .await
            .expect("query")
            .expect("order exists");

        assert_eq!(stored.customer, order.customer);
        assert_eq!(stored.details, order.details);
        assert_eq!(stored.total_amount, order.total_amount);
        assert_eq!(stored.status(), OrderStatus::Created);
        assert!(
            stored
                .order_number
                .as_str()
                .starts_with(order.kind().number_prefix())
        );

        let by_number = repo
            .get_by_number(stored.order_number.as_str())
            .await
            .expect("query")
            .expect("order exists");
        assert_eq!(by_number.id, stored.id);
    }

    db.drop().await;
}

#[tokio::test]
async fn test_sweets_keep_their_lines() {
    let Some(db) = TestDb::create().await else {
        return;
    };
    let email = disabled_email();
    let submitted = OrderService::new(&db.pool, &email, 15)
        .submit(christmas_sweets("Petr Dvorak"), Vec::new())
        .await
        .expect("submit");

    let OrderDetails::ChristmasSweets(sweets) = &submitted.order.details else {
        panic!("expected sweets, got {:?}", submitted.order.kind());
    };
    assert_eq!(sweets.items().len(), 2);
    assert_eq!(submitted.order.total_amount, Some(sweets.total()));

    db.drop().await;
}

#[tokio::test]
async fn test_milestones_are_idempotent() {
    let Some(db) = TestDb::create().await else {
        return;
    };
    let admin = seed_admin(&db).await;
    let email = disabled_email();
    let order = OrderService::new(&db.pool, &email, 15)
        .submit(regular_order("Jana Novakova", days_from_today(10)), Vec::new())
        .await
        .expect("submit")
        .order;
    let repo = OrderRepository::new(&db.pool);

    let paid = repo
        .set_milestone(order.id, Milestone::Paid, true, admin)
        .await
        .expect("set paid");
    assert_eq!(paid.status(), OrderStatus::Paid);
    assert_eq!(paid.updated_by, Some(admin));
    let first_paid_at = paid.paid_at.expect("paid_at set");

    let again = repo
        .set_milestone(order.id, Milestone::Paid, true, admin)
        .await
        .expect("set paid again");
    assert_eq!(again.paid_at, Some(first_paid_at));

    let delivered = repo
        .set_milestone(order.id, Milestone::Delivered, true, admin)
        .await
        .expect("set delivered");
    assert_eq!(delivered.status(), OrderStatus::Delivered);

    let cleared = repo
        .set_milestone(order.id, Milestone::Delivered, false, admin)
        .await
        .expect("clear delivered");
    assert_eq!(cleared.delivered_at, None);
    assert_eq!(cleared.status(), OrderStatus::Paid);

    let missing = repo
        .set_milestone(
            pandi_dorty_core::OrderId::new(999_999),
            Milestone::Paid,
            true,
            admin,
        )
        .await;
    assert!(matches!(missing, Err(RepositoryError::NotFound)));

    db.drop().await;
}

#[tokio::test]
async fn test_list_filters_sorts_and_pages() {
    let Some(db) = TestDb::create().await else {
        return;
    };
    let admin = seed_admin(&db).await;
    let email = disabled_email();
    let service = OrderService::new(&db.pool, &email, 15);
    let repo = OrderRepository::new(&db.pool);

    let mut ids = Vec::new();
    for (name, days) in [
        ("Jana Novakova", 20),
        ("Eva Novotna", 10),
        ("Petr Dvorak", 15),
    ] {
        let submitted = service
            .submit(regular_order(name, days_from_today(days)), Vec::new())
            .await
            .expect("submit");
        ids.push(submitted.order.id);
    }
    repo.set_milestone(ids[1], Milestone::Paid, true, admin)
        .await
        .expect("paid");

    let query = OrderListQuery {
        search: Some("nov".to_owned()),
        sort: SortField::DeliveryDate,
        direction: SortDirection::Asc,
        ..OrderListQuery::default()
    }
    .normalized();
    let (orders, total) = repo.list(&query).await.expect("list");
    assert_eq!(total, 2);
    let names: Vec<&str> = orders.iter().map(|o| o.customer.name.as_str()).collect();
    assert_eq!(names, ["Eva Novotna", "Jana Novakova"]);

    let paid_only = OrderListQuery {
        status: StatusFilter::Only(OrderStatus::Paid),
        ..OrderListQuery::default()
    };
    let (orders, total) = repo.list(&paid_only).await.expect("list");
    assert_eq!(total, 1);
    assert_eq!(orders[0].id, ids[1]);

    let second_page = OrderListQuery {
        sort: SortField::CustomerName,
        direction: SortDirection::Asc,
        page: 2,
        per_page: 1,
        ..OrderListQuery::default()
    };
    let (orders, total) = repo.list(&second_page).await.expect("list");
    assert_eq!(total, 3);
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].customer.name.as_str(), "Jana Novakova");

    let wildcard = OrderListQuery {
        search: Some("%".to_owned()),
        ..OrderListQuery::default()
    };
    let (_, total) = repo.list(&wildcard).await.expect("list");
    assert_eq!(total, 0);

    let stats = repo.stats().await.expect("stats");
    assert_eq!(stats.total, 3);
    assert_eq!(stats.created, 2);
    assert_eq!(stats.paid, 1);
    assert_eq!(stats.delivered, 0);

    assert_eq!(
        repo.count_by_kind(OrderKind::Regular).await.expect("count"),
        3
    );

    db.drop().await;
}
