//! End-to-end tests: verb views served through the ServerBuilder router

use axum_test::TestServer;
use restful::prelude::*;
use serde_json::{Value, json};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct Company {
    id: Option<i64>,
    #[validate(length(min = 1))]
    name: String,
    country: String,
}

impl_model!(Company, "company");

#[derive(Clone)]
struct Companies {
    config: Arc<ViewConfig<Company>>,
}

#[async_trait]
impl List for Companies {
    async fn list(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
        mixins::list(&mut self.config.bind(request, &args))
    }
}

#[async_trait]
impl Create for Companies {
    async fn create(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
        mixins::create(&self.config.bind(request, &args))
    }
}

#[async_trait]
impl Retrieve for Companies {
    async fn retrieve(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
        mixins::retrieve(&self.config.bind(request, &args))
    }
}

#[async_trait]
impl Update for Companies {
    async fn update(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
        mixins::update(&self.config.bind(request, &args), false)
    }

    async fn partial_update(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
        mixins::update(&self.config.bind(request, &args), true)
    }
}

#[async_trait]
impl Destroy for Companies {
    async fn destroy(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
        mixins::destroy(&self.config.bind(request, &args))
    }
}

fn seeded_session() -> InMemorySession {
    let session = InMemorySession::new();
    session.seed(
        "company",
        vec![
            json!({"id": 1, "name": "Acme", "country": "US"}),
            json!({"id": 2, "name": "Globex", "country": "US"}),
            json!({"id": 3, "name": "Initech", "country": "CA"}),
        ],
    );
    session
}

fn companies(settings: &ApiSettings) -> Companies {
    Companies {
        config: Arc::new(
            ViewConfig::<Company>::from_settings(settings)
                .named("Companies")
                .with_schema_class(ModelSchema::class())
                .with_filter(FieldFilter)
                .with_filter(SearchFilter)
                .with_filter(OrderFilter)
                .with_filter_fields(["country", "name"])
                .with_search_fields(["name"])
                .with_ordering_fields(["name", "id"]),
        ),
    }
}

fn server_with(settings: ApiSettings) -> TestServer {
    let companies = companies(&settings);
    let app = ServerBuilder::new()
        .with_session(seeded_session())
        .with_settings(settings)
        .route("/companies", ListCreateApiView::new(companies.clone()))
        .route("/companies/{id}", RetrieveUpdateDestroyApiView::new(companies.clone()))
        .route("/readonly/{id}", RetrieveApiView::new(companies))
        .build()
        .expect("Failed to build router");

    TestServer::try_new(app).expect("Failed to create test server")
}

fn server() -> TestServer {
    server_with(ApiSettings::default())
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let response = server().get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

// =============================================================================
// List, filter, search, order
// =============================================================================

mod list_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_all() {
        let response = server().get("/companies").await;
        response.assert_status_ok();

        let body: Vec<Value> = response.json();
        assert_eq!(body.len(), 3);
    }

    #[tokio::test]
    async fn test_field_filter() {
        let response = server()
            .get("/companies")
            .add_query_param("filter[country]", "CA")
            .await;
        response.assert_status_ok();

        let body: Vec<Value> = response.json();
        assert_eq!(body.len(), 1);
        assert_eq!(body[0]["name"], "Initech");
    }

    #[tokio::test]
    async fn test_field_filter_without_match() {
        let response = server()
            .get("/companies")
            .add_query_param("filter[country]", "FR")
            .await;
        response.assert_status_ok();

        let body: Vec<Value> = response.json();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_field_filters_combine() {
        let server = server();

        let response = server
            .get("/companies")
            .add_query_param("filter[country]", "US")
            .add_query_param("filter[name]", "Globex")
            .await;
        response.assert_status_ok();
        let body: Vec<Value> = response.json();
        assert_eq!(body.len(), 1);
        assert_eq!(body[0]["id"], 2);

        let response = server
            .get("/companies")
            .add_query_param("filter[country]", "CA")
            .add_query_param("filter[name]", "Globex")
            .await;
        response.assert_status_ok();
        let body: Vec<Value> = response.json();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_search_and_order() {
        let response = server()
            .get("/companies")
            .add_query_param("search", "e")
            .add_query_param("order", "-name")
            .await;
        response.assert_status_ok();

        let names: Vec<Value> = response
            .json::<Vec<Value>>()
            .into_iter()
            .map(|company| company["name"].clone())
            .collect();
        assert_eq!(names, vec![json!("Initech"), json!("Globex"), json!("Acme")]);
    }

    #[tokio::test]
    async fn test_page_number_pagination() {
        let server = server_with(ApiSettings {
            default_pagination: PaginationStyle::PageNumber,
            page_size: 2,
            ..ApiSettings::default()
        });

        let response = server.get("/companies").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["count"], 3);
        assert_eq!(body["next"], "/companies?page=2");
        assert_eq!(body["previous"], Value::Null);
        assert_eq!(body["results"].as_array().map(Vec::len), Some(2));

        let response = server.get("/companies").add_query_param("page", 2).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["next"], Value::Null);
        assert_eq!(body["previous"], "/companies");
        assert_eq!(body["results"][0]["name"], "Initech");
    }

    #[tokio::test]
    async fn test_invalid_page_is_not_found() {
        let server = server_with(ApiSettings {
            default_pagination: PaginationStyle::PageNumber,
            ..ApiSettings::default()
        });

        let response = server.get("/companies").add_query_param("page", 7).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_link_header_pagination() {
        let server = server_with(ApiSettings {
            default_pagination: PaginationStyle::LinkHeader,
            page_size: 1,
            ..ApiSettings::default()
        });

        let response = server.get("/companies").add_query_param("page", 2).await;
        response.assert_status_ok();

        let link = response.header("link");
        assert_eq!(
            link.to_str().unwrap(),
            "</companies?page=3>; rel=\"next\", </companies>; rel=\"prev\""
        );
        let body: Vec<Value> = response.json();
        assert_eq!(body.len(), 1);
    }
}

// =============================================================================
// Create, retrieve, update, destroy
// =============================================================================

mod detail_tests {
    use super::*;

    #[tokio::test]
    async fn test_create() {
        let server = server();

        let response = server
            .post("/companies")
            .json(&json!({"name": "Umbrella", "country": "UK"}))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);

        let body: Value = response.json();
        assert_eq!(body["id"], 4);

        let response = server.get("/companies/4").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["name"], "Umbrella");
    }

    #[tokio::test]
    async fn test_create_validation_error() {
        let response = server()
            .post("/companies")
            .json(&json!({"name": "", "country": "UK"}))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["details"]["fields"][0]["field"], "name");
    }

    #[tokio::test]
    async fn test_create_with_malformed_json() {
        let response = server().post("/companies").text("{not json").await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_create_without_body() {
        let response = server().post("/companies").await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_retrieve_not_found() {
        let response = server().get("/companies/99").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

        let body: Value = response.json();
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["details"]["lookup"], "id=99");
    }

    #[tokio::test]
    async fn test_put_and_patch() {
        let server = server();

        let response = server
            .put("/companies/2")
            .json(&json!({"name": "Globex Corp", "country": "DE"}))
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({"id": 2, "name": "Globex Corp", "country": "DE"})
        );

        let response = server
            .patch("/companies/2")
            .json(&json!({"country": "FR"}))
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({"id": 2, "name": "Globex Corp", "country": "FR"})
        );
    }

    #[tokio::test]
    async fn test_destroy() {
        let server = server();

        let response = server.delete("/companies/1").await;
        assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

        let response = server.get("/companies/1").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

        let body: Vec<Value> = server.get("/companies").await.json();
        assert_eq!(body.len(), 2);
    }

    #[tokio::test]
    async fn test_unbound_verb_is_405() {
        let response = server().delete("/readonly/1").await;
        assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.header("allow").to_str().unwrap(), "GET");
        assert_eq!(response.json::<Value>()["code"], "METHOD_NOT_ALLOWED");
    }
}
