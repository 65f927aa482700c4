use feira_api::config::ApiConfig;
use feira_core::{SupplierId, UserId};
use reqwest::StatusCode;
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod (fixtures seeded), bound to an ephemeral port.
        let app = feira_api::app::build_app(&ApiConfig::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct Client {
    http: reqwest::Client,
    actor: String,
}

impl Client {
    fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            actor: UserId::new().to_string(),
        }
    }

    async fn get(&self, url: String) -> (StatusCode, Value) {
        let res = self.http.get(url).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, url: String, body: Value) -> (StatusCode, Value) {
        let res = self
            .http
            .post(url)
            .header("x-actor-id", &self.actor)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn patch(&self, url: String, body: Value) -> (StatusCode, Value) {
        let res = self
            .http
            .patch(url)
            .header("x-actor-id", &self.actor)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn delete(&self, url: String) -> (StatusCode, Value) {
        let res = self
            .http
            .delete(url)
            .header("x-actor-id", &self.actor)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }
}

async fn open_cycle(srv: &TestServer, client: &Client) -> String {
    let (status, body) = client
        .post(srv.url("/cycles"), json!({ "supplier_id": SupplierId::new() }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

/// Save a draft built from the seeded catalog entry named `name`.
async fn draft_from_catalog(srv: &TestServer, client: &Client, cycle_id: &str, name: &str) -> Value {
    let (status, hits) = client.get(srv.url(&format!("/catalog?search={name}"))).await;
    assert_eq!(status, StatusCode::OK);
    let product_id = hits[0]["id"].as_str().unwrap().to_string();

    let (status, template) = client
        .post(srv.url(&format!("/catalog/{product_id}/template")), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(template["status"], "draft");
    assert!(template["expiry_date"].is_null());

    let (status, saved) = client
        .post(
            srv.url(&format!("/cycles/{cycle_id}/products")),
            json!({
                "reference_product_id": product_id,
                "name": template["name"],
                "unit": template["unit"],
                "price_per_unit": template["price_per_unit"],
                "expiry_date": "2024-02-01",
                "available_quantity": 20.0,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{saved}");
    saved
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn mutations_require_a_valid_actor() {
    let srv = TestServer::spawn().await;
    let http = reqwest::Client::new();

    let res = http
        .post(srv.url("/cycles"))
        .json(&json!({ "supplier_id": SupplierId::new() }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "missing_actor");

    let res = http
        .post(srv.url("/cycles"))
        .header("x-actor-id", "not-a-uuid")
        .json(&json!({ "supplier_id": SupplierId::new() }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Reads do not need an actor.
    let res = http.get(srv.url("/markets")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn cycle_lifecycle_approve_publish_and_seed_next() {
    let srv = TestServer::spawn().await;
    let client = Client::new();
    let cycle_id = open_cycle(&srv, &client).await;

    let tomato = draft_from_catalog(&srv, &client, &cycle_id, "tomate").await;
    let carrot = draft_from_catalog(&srv, &client, &cycle_id, "cenoura").await;
    assert_eq!(tomato["updated_by"], client.actor.as_str());

    // Publishing with nothing approved is refused.
    let (status, body) = client
        .post(srv.url(&format!("/cycles/{cycle_id}/publish")), json!({}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid_state");

    let tomato_id = tomato["id"].as_str().unwrap();
    let (status, approved) = client
        .patch(srv.url(&format!("/products/{tomato_id}/status")), json!({ "status": "approved" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");

    let (status, _) = client
        .patch(srv.url(&format!("/products/{tomato_id}/status")), json!({ "status": "approved" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, drafts) = client
        .get(srv.url(&format!("/cycles/{cycle_id}/products?status=draft")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(drafts.as_array().unwrap().len(), 1);
    assert_eq!(drafts[0]["id"], carrot["id"]);

    let (status, body) = client
        .post(srv.url(&format!("/cycles/{cycle_id}/publish")), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["published"], 1);

    let (status, _) = client
        .post(srv.url(&format!("/cycles/{cycle_id}/publish")), json!({}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, next) = client
        .post(srv.url(&format!("/cycles/{cycle_id}/next")), json!({ "seed": true }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(next["seeded_from"], cycle_id.as_str());
    let offers = next["offers"].as_array().unwrap();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0]["name"], tomato["name"]);
    assert_eq!(offers[0]["status"], "draft");
    assert_eq!(offers[0]["price_per_unit"], tomato["price_per_unit"]);
    assert!(offers[0]["expiry_date"].is_null());
    assert_ne!(offers[0]["id"], tomato["id"]);

    // One published cycle is followed by exactly one next cycle.
    let (status, body) = client
        .post(srv.url(&format!("/cycles/{cycle_id}/next")), json!({ "seed": true }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    let (_, published) = client.get(srv.url(&format!("/cycles/{cycle_id}"))).await;
    assert_eq!(published["next_cycle"], next["id"]);

    let (status, history) = client.get(srv.url(&format!("/cycles/{cycle_id}/history"))).await;
    assert_eq!(status, StatusCode::OK);
    let types: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["event_type"].as_str().unwrap())
        .collect();
    assert_eq!(types.first(), Some(&"cycles.cycle.opened"));
    assert_eq!(types.last(), Some(&"cycles.cycle.successor_linked"));
    assert!(types.contains(&"cycles.cycle.published"));
}

#[tokio::test]
async fn approved_offers_cannot_be_deleted_but_drafts_can() {
    let srv = TestServer::spawn().await;
    let client = Client::new();
    let cycle_id = open_cycle(&srv, &client).await;

    let tomato = draft_from_catalog(&srv, &client, &cycle_id, "tomate").await;
    let lettuce = draft_from_catalog(&srv, &client, &cycle_id, "alface").await;
    let tomato_id = tomato["id"].as_str().unwrap();
    let lettuce_id = lettuce["id"].as_str().unwrap();

    client
        .patch(srv.url(&format!("/products/{tomato_id}/status")), json!({ "status": "approved" }))
        .await;

    let (status, _) = client.delete(srv.url(&format!("/products/{tomato_id}"))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, removed) = client.delete(srv.url(&format!("/products/{lettuce_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["id"], lettuce["id"]);

    let (status, _) = client.get(srv.url(&format!("/products/{lettuce_id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stale_expected_version_is_a_conflict() {
    let srv = TestServer::spawn().await;
    let client = Client::new();
    let cycle_id = open_cycle(&srv, &client).await;
    let (_, cycle) = client.get(srv.url(&format!("/cycles/{cycle_id}"))).await;
    let seen = cycle["version"].as_u64().unwrap();

    let draft = draft_from_catalog(&srv, &client, &cycle_id, "cenoura").await;

    let (status, body) = client
        .post(
            srv.url(&format!("/cycles/{cycle_id}/products")),
            json!({
                "id": draft["id"],
                "reference_product_id": draft["reference_product_id"],
                "name": "Cenoura Baby (revisada)",
                "unit": draft["unit"],
                "expected_version": seen,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn unknown_ids_are_not_found_and_malformed_ids_are_bad_requests() {
    let srv = TestServer::spawn().await;
    let client = Client::new();

    let (status, body) = client
        .get(srv.url(&format!("/cycles/{}", SupplierId::new())))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, body) = client.get(srv.url("/cycles/nope")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_id");
}

#[tokio::test]
async fn market_validation_fee_rules_and_search() {
    let srv = TestServer::spawn().await;
    let client = Client::new();

    let (status, body) = client.post(srv.url("/markets"), json!({ "name": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, market) = client
        .post(
            srv.url("/markets"),
            json!({
                "name": "X",
                "market_type": "direct_sale",
                "administrator_id": client.actor,
                "delivery_points": ["Centro"],
                "administrative_fee": 10,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(market["administrative_fee"].is_null());
    assert_eq!(market["status"], "active");

    let market_id = market["id"].as_str().unwrap();
    let (status, updated) = client
        .patch(
            srv.url(&format!("/markets/{market_id}")),
            json!({ "market_type": "basket", "administrative_fee": 7 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["administrative_fee"], 7);

    let (status, cleared) = client
        .patch(
            srv.url(&format!("/markets/{market_id}")),
            json!({ "administrative_fee": null }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cleared["administrative_fee"].is_null());
    assert_eq!(cleared["market_type"], "basket");

    let (status, hits) = client.get(srv.url("/markets?query=centro")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = hits
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Mercado Central", "Feira Orgânica", "X"]);
}

#[tokio::test]
async fn expired_report_filters_and_exports_csv() {
    let srv = TestServer::spawn().await;
    let client = Client::new();

    let (status, report) = client
        .get(srv.url("/reports/expired?as_of=2024-01-20"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["outcome"], "matches");
    assert_eq!(report["entries"].as_array().unwrap().len(), 4);
    assert_eq!(report["total_quantity"], 40.0);
    assert_eq!(report["facets"]["products"].as_array().unwrap().len(), 4);

    let (_, weekly_donated) = client
        .get(srv.url("/reports/expired?as_of=2024-01-20&cycle=weekly&action=donated"))
        .await;
    let entries = weekly_donated["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["product"], "Cenoura Baby");

    let (_, none) = client
        .get(srv.url("/reports/expired?period=custom&from=2025-01-01"))
        .await;
    assert_eq!(none["outcome"], "no_matches");

    let (status, _) = client.get(srv.url("/reports/expired?period=yearly")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let res = reqwest::get(srv.url("/reports/expired.csv?period=custom&cycle=biweekly"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        res.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    let body = res.text().await.unwrap();
    let mut lines = body.lines();
    assert_eq!(
        lines.next(),
        Some("Produto,Quantidade,Data de Validade,Ciclo,Referência,Ação Tomada,Motivo,Valor Original")
    );
    assert_eq!(
        lines.next(),
        Some("Alface Hidropônica,8 unidades,12/01/2024,Quinzenal,Quinzena 1 - Janeiro,Descartado,Deterioração,\"R$ 22,40\"")
    );
    assert_eq!(lines.next(), None);
}

#[tokio::test]
async fn harvest_calendar_lists_twelve_months() {
    let srv = TestServer::spawn().await;
    let client = Client::new();

    let (status, calendar) = client.get(srv.url("/reports/harvest-calendar")).await;
    assert_eq!(status, StatusCode::OK);
    let months = calendar.as_array().unwrap();
    assert_eq!(months.len(), 12);
    assert_eq!(months[2]["activities"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn drafts_for_unknown_reference_products_are_not_found() {
    let srv = TestServer::spawn().await;
    let client = Client::new();
    let cycle_id = open_cycle(&srv, &client).await;

    let (status, body) = client
        .post(
            srv.url(&format!("/cycles/{cycle_id}/products")),
            json!({
                "reference_product_id": feira_catalog::ReferenceProductId::new(),
                "name": "Fantasma",
                "unit": "kg",
                "price_per_unit": 100,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");

    let (_, products) = client.get(srv.url(&format!("/cycles/{cycle_id}/products"))).await;
    assert!(products.as_array().unwrap().is_empty());
}
