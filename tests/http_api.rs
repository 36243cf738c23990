mod common;

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use common::order;
use order_board::domain::order::OrderStatus;
use order_board::handlers::orders::{CreateOrderResponse, OrderPageResponse, OrderResponse};
use order_board::infrastructure::InMemoryOrderRepository;
use order_board::{configure, ListingDefaults};
use serde_json::json;
use uuid::Uuid;

fn checkout() -> serde_json::Value {
    json!({
        "user_id": Uuid::new_v4(),
        "customer_name": "Lan Vo",
        "items": [
            {
                "product_id": Uuid::new_v4(),
                "product_name": "Purified water 19L",
                "unit_price": "45.00",
                "quantity": 2
            }
        ],
        "payment_method": "Cash on delivery",
        "delivery_fee": "10.00",
        "address": {
            "recipient_name": "Lan Vo",
            "phone": "0901234567",
            "street": "12 Nguyen Hue",
            "district": "District 1",
            "city": "Ho Chi Minh City"
        }
    })
}

macro_rules! app {
    ($repo:expr) => {
        test::init_service(
            App::new().configure(configure($repo, ListingDefaults::default())),
        )
        .await
    };
}

#[actix_web::test]
async fn created_order_can_be_read_back() {
    let app = app!(Arc::new(InMemoryOrderRepository::new()));

    let req = test::TestRequest::post()
        .uri("/orders")
        .set_json(checkout())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: CreateOrderResponse = test::read_body_json(resp).await;

    let req = test::TestRequest::get()
        .uri(&format!("/orders/{}", created.id))
        .to_request();
    let fetched: OrderResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.status, "PENDING");
    assert_eq!(fetched.subtotal, "90.00");
    assert_eq!(fetched.total, "100.00");
    assert_eq!(fetched.customer_name.as_deref(), Some("Lan Vo"));
    assert_eq!(
        fetched.formatted_address,
        "12 Nguyen Hue, District 1, Ho Chi Minh City"
    );
}

#[actix_web::test]
async fn order_without_items_is_rejected() {
    let app = app!(Arc::new(InMemoryOrderRepository::new()));
    let mut body = checkout();
    body["items"] = json!([]);

    let req = test::TestRequest::post()
        .uri("/orders")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn prices_beyond_cents_are_rejected() {
    let app = app!(Arc::new(InMemoryOrderRepository::new()));

    for (field, value) in [("unit_price", "1.005"), ("unit_price", "10000000000")] {
        let mut body = checkout();
        body["items"][0][field] = json!(value);
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{field} = {value}");
    }

    let mut body = checkout();
    body["delivery_fee"] = json!("2.499");
    let req = test::TestRequest::post()
        .uri("/orders")
        .set_json(body)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn unknown_order_is_404() {
    let app = app!(Arc::new(InMemoryOrderRepository::new()));

    let req = test::TestRequest::get()
        .uri(&format!("/orders/{}", Uuid::new_v4()))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::patch()
        .uri(&format!("/orders/{}/status", Uuid::new_v4()))
        .set_json(json!({ "status": "PROCESSING" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn status_changes_follow_the_lifecycle() {
    let repo = Arc::new(InMemoryOrderRepository::new());
    let pending = order(OrderStatus::Pending, 1);
    let id = pending.id;
    repo.insert(pending).expect("seed");
    let app = app!(repo.clone());

    let patch = |status: &str| {
        test::TestRequest::patch()
            .uri(&format!("/orders/{id}/status"))
            .set_json(json!({ "status": status }))
            .to_request()
    };

    let resp = test::call_service(&app, patch("processing")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = test::call_service(&app, patch("DELIVERED")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = test::call_service(&app, patch("PENDING")).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let resp = test::call_service(&app, patch("LOST")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri(&format!("/orders/{id}"))
        .to_request();
    let fetched: OrderResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched.status, "DELIVERED");
}

#[actix_web::test]
async fn active_listing_holds_pending_and_processing_only() {
    let repo = Arc::new(InMemoryOrderRepository::new());
    let processing = order(OrderStatus::Processing, 2);
    let pending = order(OrderStatus::Pending, 1);
    let expected = vec![pending.id, processing.id];
    for seeded in [
        processing,
        pending,
        order(OrderStatus::Shipped, 3),
        order(OrderStatus::Delivered, 4),
    ] {
        repo.insert(seeded).expect("seed");
    }
    let app = app!(repo.clone());

    let req = test::TestRequest::get().uri("/orders/active").to_request();
    let active: Vec<OrderResponse> = test::call_and_read_body_json(&app, req).await;

    assert_eq!(active.iter().map(|o| o.id).collect::<Vec<_>>(), expected);
}

#[actix_web::test]
async fn recent_orders_page_through_the_window() {
    let repo = Arc::new(InMemoryOrderRepository::new());
    let seeded: Vec<_> = (0..5)
        .map(|i| order(OrderStatus::Cancelled, 10 + i))
        .collect();
    let expected: Vec<Uuid> = seeded.iter().map(|o| o.id).collect();
    for o in seeded {
        repo.insert(o).expect("seed");
    }
    // Outside a one-day window.
    repo.insert(order(OrderStatus::Cancelled, 60 * 24 * 3))
        .expect("seed");
    let app = app!(repo.clone());

    let req = test::TestRequest::get()
        .uri("/orders/recent?status=CANCELLED&days=1&page_size=3")
        .to_request();
    let first: OrderPageResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(first.items.len(), 3);
    assert!(first.has_more);
    let cursor = first.next_cursor.clone().expect("cursor");

    let req = test::TestRequest::get()
        .uri(&format!(
            "/orders/recent?status=CANCELLED&page_size=3&cursor={cursor}"
        ))
        .to_request();
    let second: OrderPageResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(second.items.len(), 2);
    assert!(!second.has_more);

    let shown: Vec<Uuid> = first
        .items
        .iter()
        .chain(&second.items)
        .map(|o| o.id)
        .collect();
    assert_eq!(shown, expected);
}

#[actix_web::test]
async fn recent_orders_reject_active_statuses_and_bad_cursors() {
    let app = app!(Arc::new(InMemoryOrderRepository::new()));

    let req = test::TestRequest::get()
        .uri("/orders/recent?status=PENDING")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = test::TestRequest::get()
        .uri("/orders/recent?status=DELIVERED&cursor=garbage")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn delivery_person_is_assigned() {
    let repo = Arc::new(InMemoryOrderRepository::new());
    let processing = order(OrderStatus::Processing, 1);
    let id = processing.id;
    repo.insert(processing).expect("seed");
    let app = app!(repo.clone());

    let req = test::TestRequest::put()
        .uri(&format!("/orders/{id}/delivery-person"))
        .set_json(json!({ "person_id": "rider-7", "person_name": "Tuan Le" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::put()
        .uri(&format!("/orders/{id}/delivery-person"))
        .set_json(json!({ "person_id": " ", "person_name": "Tuan Le" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = test::TestRequest::get()
        .uri(&format!("/orders/{id}"))
        .to_request();
    let fetched: OrderResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched.delivery_person_id.as_deref(), Some("rider-7"));
    assert_eq!(fetched.delivery_person_name.as_deref(), Some("Tuan Le"));
}
