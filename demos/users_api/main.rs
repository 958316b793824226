//! Users API served from generic views
//!
//! This example demonstrates:
//! - A list/create endpoint with field, search and order filters
//! - A detail endpoint looking users up by id
//! - Filtering on a joined table (`filter[company.name]=Acme`)
//! - Page-number pagination from YAML settings
//!
//! Try:
//! - `curl 'localhost:3000/users?filter[company.name]=Acme'`
//! - `curl 'localhost:3000/users?search=ali&order=-name'`
//! - `curl -X PATCH localhost:3000/users/1 -d '{"name":"Alicia"}' -H 'content-type: application/json'`

use restful::prelude::*;
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct User {
    id: Option<i64>,
    #[validate(length(min = 1, max = 64))]
    name: String,
    #[validate(email)]
    email: String,
    company_id: i64,
}

impl_model!(User, "user");

#[derive(Clone)]
struct Users {
    config: Arc<ViewConfig<User>>,
}

#[async_trait]
impl List for Users {
    async fn list(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
        mixins::list(&mut self.config.bind(request, &args))
    }
}

#[async_trait]
impl Create for Users {
    async fn create(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
        mixins::create(&self.config.bind(request, &args))
    }
}

#[async_trait]
impl Retrieve for Users {
    async fn retrieve(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
        mixins::retrieve(&self.config.bind(request, &args))
    }
}

#[async_trait]
impl Update for Users {
    async fn update(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
        mixins::update(&self.config.bind(request, &args), false)
    }

    async fn partial_update(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
        mixins::update(&self.config.bind(request, &args), true)
    }
}

#[async_trait]
impl Destroy for Users {
    async fn destroy(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
        mixins::destroy(&self.config.bind(request, &args))
    }
}

fn seed(session: &InMemorySession) {
    session.seed(
        "company",
        vec![
            json!({"id": 1, "name": "Acme"}),
            json!({"id": 2, "name": "Globex"}),
        ],
    );
    session.seed(
        "user",
        vec![
            json!({"id": 1, "name": "Alice", "email": "alice@acme.test", "company_id": 1}),
            json!({"id": 2, "name": "Bob", "email": "bob@globex.test", "company_id": 2}),
            json!({"id": 3, "name": "Carol", "email": "carol@acme.test", "company_id": 1}),
        ],
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,restful=debug".into()),
        )
        .init();

    let settings = ApiSettings::from_yaml_file("demos/users_api/settings.yaml")
        .unwrap_or_else(|e| {
            tracing::warn!("using default settings: {:#}", e);
            ApiSettings::default()
        });

    let session = InMemorySession::new();
    seed(&session);

    let users = Users {
        config: Arc::new(
            ViewConfig::<User>::from_settings(&settings)
                .named("Users")
                .with_query(|request| {
                    Ok(query::<User>(request.dbsession()).join("company", "company_id", "id"))
                })
                .with_schema_class(ModelSchema::class())
                .with_filter(FieldFilter)
                .with_filter(SearchFilter)
                .with_filter(OrderFilter)
                .with_filter_fields(["name", "email", "company.name"])
                .with_search_fields(["name", "email"])
                .with_ordering_fields(["id", "name"]),
        ),
    };

    ServerBuilder::new()
        .with_session(session)
        .with_settings(settings)
        .route("/users", ListCreateApiView::new(users.clone()))
        .route("/users/{id}", RetrieveUpdateDestroyApiView::new(users))
        .serve("127.0.0.1:3000")
        .await
}
