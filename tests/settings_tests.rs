//! Tests for loading ApiSettings from YAML and wiring them into views

use restful::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_settings(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(yaml.as_bytes())
        .expect("Failed to write settings");
    file
}

#[test]
fn test_load_settings_file() {
    let file = write_settings(
        r#"
default_pagination: link_header
page_size: 5
page_query_param: p
filter_query_param: where
"#,
    );

    let settings = ApiSettings::from_yaml_file(file.path().to_str().unwrap()).unwrap();

    assert_eq!(settings.default_pagination, PaginationStyle::LinkHeader);
    assert_eq!(settings.page_size, 5);
    assert_eq!(settings.page_query_param, "p");
    assert_eq!(settings.filter_query_param, "where");
    // unspecified keys keep their defaults
    assert_eq!(settings.max_page_size, 100);
    assert_eq!(settings.order_query_param, "order");
}

#[test]
fn test_missing_file_is_an_error() {
    let result = ApiSettings::from_yaml_file("/nonexistent/restful-settings.yaml");
    let err = result.unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to read settings file"));
}

#[test]
fn test_invalid_bounds_are_rejected() {
    let file = write_settings("page_size: 50\nmax_page_size: 10\n");
    assert!(ApiSettings::from_yaml_file(file.path().to_str().unwrap()).is_err());
}

#[test]
fn test_server_builder_reads_settings_file() {
    let file = write_settings("default_pagination: page_number\n");
    let builder = ServerBuilder::new()
        .with_session(InMemorySession::new())
        .with_settings_file(file.path().to_str().unwrap())
        .unwrap();
    assert!(builder.build().is_ok());
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Item {
    id: i64,
}

impl_model!(Item, "item");

#[test]
fn test_custom_filter_param_name() {
    let settings = Arc::new(ApiSettings::from_yaml_str("filter_query_param: where\n").unwrap());

    let session = InMemorySession::new();
    session.seed(
        "item",
        vec![serde_json::json!({"id": 1}), serde_json::json!({"id": 2})],
    );

    let config = Arc::new(
        ViewConfig::<Item>::for_model()
            .with_filter(FieldFilter)
            .with_filter_fields(["id"]),
    );
    let request = ApiRequest::new(Arc::new(session))
        .with_settings(settings)
        .with_params([("where[id]", "2"), ("filter[id]", "1")]);
    let view = config.bind(request, &ViewArgs::new());

    let items = view.filter_query(view.get_query().unwrap()).unwrap().all().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, 2);
}
