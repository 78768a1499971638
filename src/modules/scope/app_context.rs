use std::fmt;
use std::sync::Arc;

use actix_web::{test::TestRequest, web};

type Installer = Arc<dyn Fn(TestRequest) -> TestRequest + Send + Sync>;

/// Application state handed to every synthesized request
///
/// Mirrors what `App::app_data` would register in production, so code under
/// test can pull `web::Data<T>` out of the scope's request.
#[derive(Clone)]
pub struct AppContext {
    base_uri: String,
    installers: Vec<Installer>,
}

impl AppContext {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            installers: Vec::new(),
        }
    }

    /// Register shared state, reachable as `web::Data<T>`
    pub fn with_data<T: Send + Sync + 'static>(self, data: web::Data<T>) -> Self {
        self.with_app_data(data)
    }

    /// Register any clonable value, reachable as `T`
    pub fn with_app_data<T: Clone + Send + Sync + 'static>(mut self, data: T) -> Self {
        self.installers
            .push(Arc::new(move |req: TestRequest| req.app_data(data.clone())));
        self
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub(crate) fn request(&self) -> TestRequest {
        self.installers
            .iter()
            .fold(TestRequest::default().uri(&self.base_uri), |req, install| {
                install(req)
            })
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new("http://localhost")
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("base_uri", &self.base_uri)
            .field("app_data", &self.installers.len())
            .finish()
    }
}
