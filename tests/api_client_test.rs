//! Drives the real HTTP client against a fake storefront backend.
//!
//! The backend is a small actix-web app bound to an ephemeral local port and
//! spawned on the test runtime, so these tests need no external services.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use bigdecimal::BigDecimal;
use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use storefront_checkout::domain::checkout::{PaymentMethod, ShippingPolicy};
use storefront_checkout::domain::ports::CartApi;
use storefront_checkout::infrastructure::token_store::StaticToken;
use storefront_checkout::notify::{MemoryNotifier, ToastLevel};
use storefront_checkout::render::ViewState;
use storefront_checkout::{ApiClient, CartPage, CheckoutError, CheckoutPage};

const TOKEN: &str = "test-token";

// ── Fake backend ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Line {
    cart_product_id: u64,
    product_id: u64,
    product_name: String,
    quantity: u64,
    unit_price: u64,
    total_price: u64,
    choose: bool,
}

#[derive(Default)]
struct Backend {
    lines: Mutex<Vec<Line>>,
    requests: Mutex<Vec<(String, Option<String>, Value)>>,
}

impl Backend {
    fn seeded() -> Self {
        let line = |id: u64, name: &str, price: u64, choose: bool| Line {
            cart_product_id: id,
            product_id: 100 + id,
            product_name: name.to_string(),
            quantity: 1,
            unit_price: price,
            total_price: price,
            choose,
        };
        Self {
            lines: Mutex::new(vec![
                line(1, "Green tea", 100000, true),
                line(2, "Oolong", 50000, false),
            ]),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, req: &HttpRequest, body: Value) {
        let auth = req
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.requests.lock().unwrap().push((
            format!("{} {}", req.method(), req.path()),
            auth,
            body,
        ));
    }

    fn last_request(&self, prefix: &str) -> Option<(String, Option<String>, Value)> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(line, _, _)| line.starts_with(prefix))
            .cloned()
    }
}

fn authorized(req: &HttpRequest) -> bool {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {TOKEN}").as_str())
}

fn unauthenticated() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({ "message": "Unauthenticated" }))
}

async fn current_cart(req: HttpRequest, backend: web::Data<Backend>) -> HttpResponse {
    backend.record(&req, Value::Null);
    if !authorized(&req) {
        return unauthenticated();
    }
    let lines = backend.lines.lock().unwrap().clone();
    HttpResponse::Ok().json(json!({
        "code": 1000,
        "result": { "idCart": 7, "cartProducts": lines }
    }))
}

async fn selected_products(req: HttpRequest, backend: web::Data<Backend>) -> HttpResponse {
    backend.record(&req, Value::Null);
    let lines: Vec<Line> = backend
        .lines
        .lock()
        .unwrap()
        .iter()
        .filter(|l| l.choose)
        .cloned()
        .collect();
    HttpResponse::Ok().json(lines)
}

async fn update_line(
    req: HttpRequest,
    path: web::Path<(u64, u64)>,
    body: web::Json<Value>,
    backend: web::Data<Backend>,
) -> HttpResponse {
    backend.record(&req, body.0.clone());
    let (_, cart_product_id) = path.into_inner();
    let mut lines = backend.lines.lock().unwrap();
    let Some(line) = lines.iter_mut().find(|l| l.cart_product_id == cart_product_id) else {
        return HttpResponse::NotFound().json(json!({ "message": "Cart product not found" }));
    };
    if let Some(q) = body["quantity"].as_u64() {
        line.quantity = q;
        line.total_price = line.unit_price * q;
    }
    if let Some(choose) = body["choose"].as_bool() {
        line.choose = choose;
    }
    HttpResponse::Ok().json(line.clone())
}

async fn delete_line(
    req: HttpRequest,
    path: web::Path<(u64, u64)>,
    backend: web::Data<Backend>,
) -> HttpResponse {
    backend.record(&req, Value::Null);
    let (_, cart_product_id) = path.into_inner();
    backend
        .lines
        .lock()
        .unwrap()
        .retain(|l| l.cart_product_id != cart_product_id);
    HttpResponse::NoContent().finish()
}

async fn apply_discount(
    req: HttpRequest,
    body: web::Json<Value>,
    backend: web::Data<Backend>,
) -> HttpResponse {
    backend.record(&req, body.0.clone());
    match body["discountCode"].as_str() {
        Some("SALE10") => {
            let total = body["orderTotal"].as_u64().unwrap_or(0);
            HttpResponse::Ok().json(json!({ "discountAmount": total / 10 }))
        }
        _ => HttpResponse::BadRequest().json(json!({ "message": "Discount code is invalid" })),
    }
}

async fn place_order(
    req: HttpRequest,
    body: web::Json<Value>,
    backend: web::Data<Backend>,
) -> HttpResponse {
    backend.record(&req, body.0.clone());
    HttpResponse::Ok().json(json!({ "idOrder": 77 }))
}

async fn my_info(req: HttpRequest, backend: web::Data<Backend>) -> HttpResponse {
    backend.record(&req, Value::Null);
    HttpResponse::Ok().json(json!({
        "code": 1000,
        "result": {
            "id": 5,
            "username": "buyer",
            "addresses": [
                { "id": 11, "recipientName": "Pham D", "phone": "0933", "address": "4 Nguyen Hue", "isDefault": false },
                { "id": 12, "recipientName": "Pham D", "phone": "0933", "address": "9 Ly Thuong Kiet", "isDefault": true }
            ]
        }
    }))
}

async fn broken() -> HttpResponse {
    HttpResponse::BadGateway()
        .content_type("text/html")
        .body("<html>upstream down</html>")
}

async fn slow() -> HttpResponse {
    tokio::time::sleep(Duration::from_secs(3)).await;
    HttpResponse::Ok().json(json!({}))
}

/// Start the fake backend and return its base URL.
fn start_backend(backend: web::Data<Backend>) -> String {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(backend.clone())
            .route("/cart/api/current", web::get().to(current_cart))
            .route(
                "/CartProduct/{cartId}/selected-products",
                web::get().to(selected_products),
            )
            .route(
                "/CartProduct/{cartId}/{cartProductId}",
                web::put().to(update_line),
            )
            .route(
                "/CartProduct/{cartId}/{cartProductId}",
                web::delete().to(delete_line),
            )
            .route("/discounts/apply", web::post().to(apply_discount))
            .route("/order/{cartId}", web::post().to(place_order))
            .route("/users/myInfo", web::get().to(my_info))
            .route("/broken", web::get().to(broken))
            .route("/slow", web::get().to(slow))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("Failed to bind the fake backend");

    let addr = server.addrs()[0];
    tokio::spawn(server.run());
    format!("http://{}", addr)
}

fn client(base_url: &str, token: Option<&str>) -> ApiClient {
    ApiClient::new(
        base_url,
        Duration::from_secs(5),
        Arc::new(StaticToken::new(token.map(str::to_string))),
    )
    .expect("Failed to build client")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn cart_page_syncs_with_backend() {
    let backend = web::Data::new(Backend::seeded());
    let url = start_backend(backend.clone());
    let notifier = MemoryNotifier::new();

    let mut page = CartPage::load(client(&url, Some(TOKEN)), &notifier).await;
    assert_eq!(page.state().cart_id(), "7");
    assert_eq!(page.render().subtotal, "100.000 ₫");

    assert!(page.set_quantity("1", 150).await.unwrap());
    let (_, auth, body) = backend.last_request("PUT /CartProduct/7/1").unwrap();
    assert_eq!(auth.as_deref(), Some("Bearer test-token"));
    assert_eq!(body, json!({ "quantity": 99 }));
    assert_eq!(
        page.state().item("1").unwrap().total_price,
        BigDecimal::from(9_900_000)
    );

    page.toggle_selected("2", true).unwrap();
    assert_eq!(page.render().subtotal, "9.950.000 ₫");

    page.remove_item("1").await.unwrap();
    page.remove_item("2").await.unwrap();
    assert_eq!(page.render().state, ViewState::Empty);
    assert!(backend.lines.lock().unwrap().is_empty());
    assert!(notifier.drain().iter().all(|t| t.level != ToastLevel::Error));
}

#[tokio::test]
async fn anonymous_requests_carry_no_auth_header() {
    let backend = web::Data::new(Backend::seeded());
    let url = start_backend(backend.clone());
    let notifier = MemoryNotifier::new();

    let page = CartPage::load(client(&url, None), &notifier).await;
    assert_eq!(page.render().state, ViewState::Empty);
    let toast = notifier.last().unwrap();
    assert_eq!(toast.level, ToastLevel::Error);
    assert_eq!(toast.message, "Unauthenticated");

    let (_, auth, _) = backend.last_request("GET /cart/api/current").unwrap();
    assert_eq!(auth, None);
}

#[tokio::test]
async fn non_json_error_body_falls_back_to_status() {
    let url = start_backend(web::Data::new(Backend::default()));
    let err = client(&url, None)
        .call(Method::GET, "/broken", None::<&()>)
        .await
        .unwrap_err();
    match err {
        CheckoutError::Http { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "Request failed with status 502 Bad Gateway");
        }
        other => panic!("expected an HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_backend_times_out_as_network_error() {
    let url = start_backend(web::Data::new(Backend::default()));
    let impatient = ApiClient::new(
        &url,
        Duration::from_millis(200),
        Arc::new(StaticToken::anonymous()),
    )
    .unwrap();
    let err = impatient
        .call(Method::GET, "/slow", None::<&()>)
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::Network(_)), "{err:?}");
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let err = client(&format!("http://127.0.0.1:{port}"), None)
        .current_cart()
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::Network(_)), "{err:?}");
}

#[tokio::test]
async fn checkout_page_places_order() {
    let backend = web::Data::new(Backend::seeded());
    let url = start_backend(backend.clone());
    let notifier = MemoryNotifier::new();

    let mut page = CheckoutPage::load(
        client(&url, Some(TOKEN)),
        &notifier,
        "7",
        ShippingPolicy::default(),
    )
    .await;
    assert_eq!(page.state().cart.items().len(), 1);
    assert_eq!(page.state().selected_address.as_deref(), Some("12"));

    let err = page.apply_promo_code("INVALID").await.unwrap_err();
    assert_eq!(err.to_string(), "Discount code is invalid");
    assert_eq!(page.state().promo.discount, BigDecimal::from(0));
    assert!(page.render().promo_input_enabled);

    let discount = page.apply_promo_code("SALE10").await.unwrap();
    assert_eq!(discount, BigDecimal::from(10000));
    let (_, _, body) = backend.last_request("POST /discounts/apply").unwrap();
    assert_eq!(body, json!({ "discountCode": "SALE10", "orderTotal": 100000 }));

    let err = page.place_order().await.unwrap_err();
    assert_eq!(err.to_string(), "Please select a payment method");
    assert!(backend.last_request("POST /order").is_none());

    page.select_payment_method(PaymentMethod::Cod);
    page.set_note("Call before delivery");
    let confirmation = page.place_order().await.unwrap();
    assert_eq!(confirmation.order_id, "77");

    let (_, auth, body) = backend.last_request("POST /order/7").unwrap();
    assert_eq!(auth.as_deref(), Some("Bearer test-token"));
    assert_eq!(
        body,
        json!({
            "shippingAddressId": "12",
            "paymentMethod": "COD",
            "note": "Call before delivery",
            "discountCode": "SALE10",
            "shippingFee": 30000,
            "discountAmount": 10000,
            "totalAmount": 120000
        })
    );
    assert_eq!(page.render().state, ViewState::Empty);
}

#[tokio::test]
async fn checkout_deselect_is_persisted() {
    let backend = web::Data::new(Backend::seeded());
    let url = start_backend(backend.clone());
    let notifier = MemoryNotifier::new();

    let mut page = CheckoutPage::load(
        client(&url, Some(TOKEN)),
        &notifier,
        "7",
        ShippingPolicy::default(),
    )
    .await;
    page.set_item_selected("1", false).await.unwrap();

    let (_, _, body) = backend.last_request("PUT /CartProduct/7/1").unwrap();
    assert_eq!(body, json!({ "quantity": 1, "choose": false }));
    assert!(!backend.lines.lock().unwrap()[0].choose);
    let view = page.render();
    assert_eq!(view.state, ViewState::Empty);
    assert!(!view.place_order_enabled);
}
