//! Demo route table served by the binary.

pub mod sample;

use crate::http::response::html;
use crate::routing::{Handler, HandlerDescriptor, RouteMatch, Router};

/// Routes mounted by the demo binary.
pub fn demo_routes() -> Router {
    let mut router = Router::new();
    router
        .get("/demo", HandlerDescriptor::new(Handler::new(sample::index)).named("demo.index"))
        .post("/demo", HandlerDescriptor::new(Handler::new(sample::store)).named("demo.store"))
        .get("/demo/:id", HandlerDescriptor::new(Handler::new(sample::show)).named("demo.show"))
        .put("/demo/:id", HandlerDescriptor::new(Handler::new(sample::update)).named("demo.update"))
        .delete("/demo/:id", HandlerDescriptor::new(Handler::new(sample::destroy)).named("demo.destroy"))
        .get(
            "/demo/routes/:id",
            Handler::new(|req: RouteMatch| async move {
                let id = req.param("id").unwrap_or_default().to_string();
                Ok::<_, crate::routing::BoxError>(html(format!(
                    "<html><body>Response from closure instead of controller: id={id}</body></html>"
                )))
            }),
        );
    router
}
