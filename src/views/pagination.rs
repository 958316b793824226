//! Pagination strategies
//!
//! A paginator slices a query into one page and remembers enough about that
//! page to wrap the serialized rows in a response envelope afterwards. One
//! paginator instance serves exactly one request.

use crate::core::error::{ViewError, ViewResult};
use crate::core::model::Model;
use crate::core::query::Query;
use crate::core::request::ApiRequest;
use axum::Json;
use axum::http::{HeaderValue, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

/// Contract for pagination strategies
///
/// Both methods fail with [`ViewError::NotImplemented`] unless the strategy
/// provides them.
pub trait Pagination<M>: Send + Sync {
    /// Return the rows of the requested page
    fn paginate_query(&mut self, query: Query<M>, request: &ApiRequest) -> ViewResult<Vec<M>> {
        let _ = (query, request);
        Err(ViewError::not_implemented("paginate_query()"))
    }

    /// Wrap serialized page data with pagination metadata
    fn get_paginated_response(&self, data: Value) -> ViewResult<Response> {
        let _ = data;
        Err(ViewError::not_implemented("get_paginated_response()"))
    }
}

/// Paginator with no behavior of its own
#[derive(Debug, Clone, Copy, Default)]
pub struct BasePagination;

impl<M> Pagination<M> for BasePagination {}

/// The page a paginator settled on
#[derive(Debug, Clone)]
struct PageWindow {
    number: usize,
    num_pages: usize,
    count: usize,
    uri: Uri,
    page_param: String,
}

impl PageWindow {
    /// Resolve the requested page and fetch its rows
    fn fetch<M: Model>(
        query: Query<M>,
        request: &ApiRequest,
        page_size: Option<usize>,
    ) -> ViewResult<(Vec<M>, Self)> {
        let settings = request.settings();

        let page_size = request
            .param(&settings.page_size_query_param)
            .and_then(|raw| raw.parse::<usize>().ok())
            .filter(|size| *size > 0)
            .map(|size| size.min(settings.max_page_size))
            .or(page_size)
            .unwrap_or(settings.page_size)
            .max(1);

        let count = query.count()?;
        let num_pages = count.div_ceil(page_size).max(1);

        let raw_page = request.param(&settings.page_query_param).unwrap_or("1");
        let number = match raw_page {
            "last" => num_pages,
            other => other.parse::<usize>().unwrap_or(0),
        };

        if number < 1 || number > num_pages {
            tracing::debug!(page = raw_page, num_pages, "invalid page requested");
            return Err(ViewError::NotFound {
                entity_type: "page".to_string(),
                lookup: Some(format!("{}={}", settings.page_query_param, raw_page)),
            });
        }

        let rows = query
            .offset((number - 1) * page_size)
            .limit(page_size)
            .all()?;

        tracing::debug!(page = number, page_size, count, "paginated query");

        Ok((
            rows,
            Self {
                number,
                num_pages,
                count,
                uri: request.uri().clone(),
                page_param: settings.page_query_param.clone(),
            },
        ))
    }

    fn next_link(&self) -> Option<String> {
        (self.number < self.num_pages)
            .then(|| with_query_param(&self.uri, &self.page_param, Some(self.number + 1)))
    }

    fn previous_link(&self) -> Option<String> {
        match self.number {
            0 | 1 => None,
            2 => Some(with_query_param(&self.uri, &self.page_param, None)),
            n => Some(with_query_param(&self.uri, &self.page_param, Some(n - 1))),
        }
    }
}

/// Rewrite `key` in the URI's query string, dropping it when `value` is None
fn with_query_param(uri: &Uri, key: &str, value: Option<usize>) -> String {
    let mut pairs: Vec<String> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty() && pair.split('=').next() != Some(key))
        .map(str::to_string)
        .collect();

    if let Some(value) = value {
        pairs.push(format!("{}={}", key, value));
    }

    if pairs.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), pairs.join("&"))
    }
}

fn not_paginated(strategy: &str) -> ViewError {
    ViewError::improperly_configured(
        strategy,
        "paginate_query() must run before get_paginated_response()",
    )
}

/// Page-number pagination
///
/// Reads `?page=` and `?page_size=` (names from the settings) and answers
/// with a `{count, next, previous, results}` envelope.
#[derive(Debug, Clone, Default)]
pub struct PageNumberPagination {
    page_size: Option<usize>,
    window: Option<PageWindow>,
}

impl PageNumberPagination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the settings' default page size
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: Some(page_size),
            window: None,
        }
    }
}

impl<M: Model> Pagination<M> for PageNumberPagination {
    fn paginate_query(&mut self, query: Query<M>, request: &ApiRequest) -> ViewResult<Vec<M>> {
        let (rows, window) = PageWindow::fetch(query, request, self.page_size)?;
        self.window = Some(window);
        Ok(rows)
    }

    fn get_paginated_response(&self, data: Value) -> ViewResult<Response> {
        let window = self
            .window
            .as_ref()
            .ok_or_else(|| not_paginated("PageNumberPagination"))?;

        Ok(Json(json!({
            "count": window.count,
            "next": window.next_link(),
            "previous": window.previous_link(),
            "results": data,
        }))
        .into_response())
    }
}

/// Link-header pagination
///
/// Slices like [`PageNumberPagination`] but returns the bare results and
/// advertises neighbouring pages in a `Link` header.
#[derive(Debug, Clone, Default)]
pub struct LinkHeaderPagination {
    page_size: Option<usize>,
    window: Option<PageWindow>,
}

impl LinkHeaderPagination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: Some(page_size),
            window: None,
        }
    }
}

impl<M: Model> Pagination<M> for LinkHeaderPagination {
    fn paginate_query(&mut self, query: Query<M>, request: &ApiRequest) -> ViewResult<Vec<M>> {
        let (rows, window) = PageWindow::fetch(query, request, self.page_size)?;
        self.window = Some(window);
        Ok(rows)
    }

    fn get_paginated_response(&self, data: Value) -> ViewResult<Response> {
        let window = self
            .window
            .as_ref()
            .ok_or_else(|| not_paginated("LinkHeaderPagination"))?;

        let links: Vec<String> = [
            window.next_link().map(|url| format!("<{}>; rel=\"next\"", url)),
            window.previous_link().map(|url| format!("<{}>; rel=\"prev\"", url)),
        ]
        .into_iter()
        .flatten()
        .collect();

        let mut response = Json(data).into_response();
        if !links.is_empty() {
            let value = HeaderValue::from_str(&links.join(", "))
                .map_err(|e| ViewError::bad_request(format!("Invalid Link header: {}", e)))?;
            response.headers_mut().insert(header::LINK, value);
        }
        Ok(response)
    }
}
