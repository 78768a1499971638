use actix_web::{web, HttpMessage, HttpRequest};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::app_context::AppContext;

/// Request id stored in the synthesized request's extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// A synthetic in-flight request that code under test can rely on
///
/// Built from the `AppContext`, so app data registered there resolves
/// through `request().app_data::<T>()` exactly as in a live handler.
pub struct RequestScope {
    id: Uuid,
    request: HttpRequest,
    opened_at: DateTime<Utc>,
}

impl RequestScope {
    pub fn open(app: &AppContext) -> Self {
        let id = Uuid::new_v4();
        let request = app
            .request()
            .insert_header(("X-Request-ID", id.to_string()))
            .to_http_request();
        request.extensions_mut().insert(RequestId(id.to_string()));

        tracing::debug!(request_id = %id, uri = %request.uri(), "Request scope opened");

        Self {
            id,
            request,
            opened_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn app_data<T: 'static>(&self) -> Option<&T> {
        self.request.app_data::<T>()
    }

    pub fn data<T: ?Sized + 'static>(&self) -> Option<web::Data<T>> {
        self.request.app_data::<web::Data<T>>().cloned()
    }

    pub fn close(self) {
        let elapsed = Utc::now() - self.opened_at;
        tracing::debug!(
            request_id = %self.id,
            elapsed_ms = elapsed.num_milliseconds(),
            "Request scope closed"
        );
    }
}

/// Close `scope` if one was opened
pub fn close_scope(scope: Option<RequestScope>) {
    if let Some(scope) = scope {
        scope.close();
    }
}
