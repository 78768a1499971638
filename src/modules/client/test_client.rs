// Test HTTP Client Helpers
//
// Thin wrappers over an initialized actix-web test service that assert the
// response is 200 OK before handing it back.

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::StatusCode,
    test::{self, TestRequest},
};
use serde::Serialize;
use serde_json::Value;

/// HTTP client wrapper for in-process requests
///
/// # Example
/// ```no_run
/// use actix_web::{test, web, App, HttpResponse};
/// use fixture_harness::TestClient;
///
/// #[actix_web::test]
/// async fn test_health() {
///     let app = test::init_service(
///         App::new().route("/health", web::get().to(|| async { HttpResponse::Ok().finish() })),
///     )
///     .await;
///     let client = TestClient::new(app);
///     client.get_ok("/health").await;
/// }
/// ```
pub struct TestClient<S> {
    service: S,
}

impl<S, B> TestClient<S>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Send a request without any status assertion
    pub async fn call(&self, request: TestRequest) -> ServiceResponse<B> {
        test::call_service(&self.service, request.to_request()).await
    }

    async fn call_ok(&self, request: TestRequest) -> ServiceResponse<B> {
        let response = self.call(request).await;
        assert_status_ok(&response);
        response
    }

    pub async fn get_ok(&self, uri: &str) -> ServiceResponse<B> {
        self.call_ok(TestRequest::get().uri(uri)).await
    }

    pub async fn delete_ok(&self, uri: &str) -> ServiceResponse<B> {
        self.call_ok(TestRequest::delete().uri(uri)).await
    }

    /// Send a POST request with JSON content in the body
    pub async fn post_json_ok<T: Serialize>(&self, uri: &str, payload: &T) -> ServiceResponse<B> {
        self.call_ok(TestRequest::post().uri(uri).set_json(payload))
            .await
    }

    /// Send a PUT request with JSON content in the body
    pub async fn put_json_ok<T: Serialize>(&self, uri: &str, payload: &T) -> ServiceResponse<B> {
        self.call_ok(TestRequest::put().uri(uri).set_json(payload))
            .await
    }

    /// Send a PATCH request with JSON content in the body
    pub async fn patch_json_ok<T: Serialize>(&self, uri: &str, payload: &T) -> ServiceResponse<B> {
        self.call_ok(TestRequest::patch().uri(uri).set_json(payload))
            .await
    }
}

/// Assert HTTP response is 200 OK
///
/// # Panics
/// If status code is not 200
#[track_caller]
pub fn assert_status_ok<B>(response: &ServiceResponse<B>) {
    let status = response.status();
    assert_eq!(
        status,
        StatusCode::OK,
        "Expected 200 OK, got {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );
}

/// Read the response body as JSON
///
/// # Panics
/// If the body is not valid JSON
pub async fn read_json<B: MessageBody>(response: ServiceResponse<B>) -> Value {
    test::read_body_json(response).await
}
