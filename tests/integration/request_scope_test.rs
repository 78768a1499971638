// Request scope tests
//
// The test body sees a synthetic request carrying the application's data.

#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::{http::header, web, HttpMessage};
use fixture_harness::{AppContext, RequestId, RequestScope, TeardownPolicy, TestCase};
use helpers::*;

struct Greeting(String);

#[derive(Clone)]
struct ApiVersion(u32);

struct ScopedCase;

impl TestCase for ScopedCase {}

struct UnscopedCase;

impl TestCase for UnscopedCase {
    fn create_scope(&self, _app: &AppContext) -> Option<RequestScope> {
        None
    }
}

fn app_context() -> AppContext {
    AppContext::new("http://localhost/api")
        .with_data(web::Data::new(Greeting("hello".to_string())))
        .with_app_data(ApiVersion(2))
}

#[actix_web::test]
async fn test_body_runs_inside_request_scope() -> anyhow::Result<()> {
    let db = TempDatabase::new("scope");
    let mut harness = test_harness(&db, TeardownPolicy::Dispose)?.with_app_context(app_context());

    harness
        .run(&ScopedCase, |ctx| {
            Box::pin(async move {
                let scope = ctx.scope().ok_or_else(|| anyhow::anyhow!("no request scope"))?;

                let greeting = scope
                    .data::<Greeting>()
                    .ok_or_else(|| anyhow::anyhow!("greeting not registered"))?;
                assert_eq!(greeting.0, "hello");
                assert_eq!(scope.app_data::<ApiVersion>().map(|v| v.0), Some(2));

                let request = scope.request();
                assert_eq!(request.path(), "/api");
                assert_eq!(
                    request
                        .headers()
                        .get("X-Request-ID")
                        .and_then(|v| v.to_str().ok()),
                    Some(scope.id().to_string().as_str())
                );
                assert_eq!(
                    request.extensions().get::<RequestId>(),
                    Some(&RequestId(scope.id().to_string()))
                );
                assert!(!request.headers().contains_key(header::AUTHORIZATION));
                Ok::<_, anyhow::Error>(())
            })
        })
        .await?;
    Ok(())
}

#[actix_web::test]
async fn test_each_test_gets_a_new_scope() -> anyhow::Result<()> {
    let db = TempDatabase::new("scope_ids");
    let mut harness = test_harness(&db, TeardownPolicy::Keep)?.with_app_context(app_context());

    let mut ids = Vec::new();
    for _ in 0..2 {
        let id = harness
            .run(&ScopedCase, |ctx| {
                Box::pin(async move {
                    let scope = ctx.scope().ok_or_else(|| anyhow::anyhow!("no request scope"))?;
                    Ok::<_, anyhow::Error>(scope.id())
                })
            })
            .await?;
        ids.push(id);
    }

    assert_ne!(ids[0], ids[1]);
    Ok(())
}

#[actix_web::test]
async fn test_case_can_opt_out_of_scope() -> anyhow::Result<()> {
    let db = TempDatabase::new("no_scope");
    let mut harness = test_harness(&db, TeardownPolicy::Dispose)?.with_app_context(app_context());

    let had_scope = harness
        .run(&UnscopedCase, |ctx| {
            Box::pin(async move { Ok::<_, anyhow::Error>(ctx.scope().is_some()) })
        })
        .await?;

    assert!(!had_scope);
    Ok(())
}
