use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Router};
use axum_test::TestServer;
use junction::{
    axum::setup, boxed, marker, modules, named, Binder, Bridge, Inject, InjectWith, Locator, Module, Overrides,
};
use tracing_test::traced_test;

named!(Simple = "simple");
marker!(Other);

trait HelloService {
    fn hello(&self) -> String;
}

type DynHelloService = Box<dyn HelloService + Send + Sync>;

struct Greeting(&'static str);

impl HelloService for Greeting {
    fn hello(&self) -> String {
        self.0.to_owned()
    }
}

struct HelloProvidedService(String);

/// Handler object constructed by the locator for each request
struct HelloResource {
    hello: Arc<DynHelloService>,
    named: Arc<DynHelloService>,
    annotated: Arc<DynHelloService>,
    provided: Arc<HelloProvidedService>,
}

struct HelloModule;

impl Module for HelloModule {
    fn configure(&self, binder: &mut Binder) {
        binder
            .bind::<DynHelloService>()
            .to_instance(boxed!(Greeting("Hello"); HelloService + Send + Sync));
        binder
            .bind::<DynHelloService>()
            .named("simple")
            .to_instance(boxed!(Greeting("Named Hello"); HelloService + Send + Sync));
        binder
            .bind::<DynHelloService>()
            .marked::<Other>()
            .to_instance(boxed!(Greeting("Annotated Hello"); HelloService + Send + Sync));
        binder
            .bind::<HelloProvidedService>()
            .to_provider(|Inject(hello): Inject<DynHelloService>| Ok(HelloProvidedService(format!("{} (provided)", hello.hello()))));
        binder.bind::<HelloResource>().to_class(
            |Inject(hello): Inject<DynHelloService>,
             named: InjectWith<DynHelloService, Simple>,
             annotated: InjectWith<DynHelloService, Other>,
             Inject(provided): Inject<HelloProvidedService>| {
                Ok(HelloResource {
                    hello,
                    named: named.into_inner(),
                    annotated: annotated.into_inner(),
                    provided,
                })
            },
        );
    }
}

fn router(locator: Locator) -> Router {
    async fn hello(Inject(resource): Inject<HelloResource>) -> String {
        resource.hello.hello()
    }

    async fn named(Inject(resource): Inject<HelloResource>) -> String {
        resource.named.hello()
    }

    async fn annotated(Inject(resource): Inject<HelloResource>) -> String {
        resource.annotated.hello()
    }

    async fn provided(Inject(resource): Inject<HelloResource>) -> String {
        resource.provided.0.clone()
    }

    async fn direct(named: InjectWith<DynHelloService, Simple>) -> String {
        named.hello()
    }

    setup(
        Router::new()
            .route("/hello", get(hello))
            .route("/hello/named", get(named))
            .route("/hello/annotated", get(annotated))
            .route("/hello/provided", get(provided))
            .route("/hello/direct", get(direct)),
        locator,
    )
}

#[tokio::test]
#[traced_test]
async fn test_hello_resource() {
    let bridge = Bridge::new(Locator::new());
    bridge
        .build_and_install(&modules![Overrides::new(modules![HelloModule]).with(modules![|binder: &mut Binder| {
            binder
                .bind::<DynHelloService>()
                .annotated::<Simple>()
                .to_instance(boxed!(Greeting("Named Hello overridden"); HelloService + Send + Sync));
        }])])
        .unwrap();

    let server = TestServer::builder()
        .http_transport()
        .build(router(bridge.locator().clone()))
        .unwrap();

    for (path, expected) in [
        ("/hello", "Hello"),
        ("/hello/named", "Named Hello overridden"),
        ("/hello/annotated", "Annotated Hello"),
        ("/hello/provided", "Hello (provided)"),
        ("/hello/direct", "Named Hello overridden"),
    ] {
        let response = server.get(path).await;

        response.assert_status_ok();
        response.assert_text(expected);
    }
}

#[tokio::test]
#[traced_test]
async fn test_hello_resource_after_reset() {
    let bridge = Bridge::new(Locator::new());
    bridge.build_and_install(&modules![HelloModule]).unwrap();

    let server = TestServer::builder()
        .http_transport()
        .build(router(bridge.locator().clone()))
        .unwrap();

    server.get("/hello").await.assert_status_ok();

    bridge.reset();

    let response = server.get("/hello").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.text().contains("No binding found"));
}
