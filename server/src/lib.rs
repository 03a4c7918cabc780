//! Server library module.
//!
//! Router assembly and background tasks, shared by the binary and the
//! integration tests.

pub mod sweeper;

use app::{auth::AdminAuthority, backend::HttpBackend, components::App};
use axum::extract::FromRef;
use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use leptos::context::provide_context;
use leptos::prelude::*;
use leptos_axum::{LeptosRoutes, generate_route_list, handle_server_fns_with_context};
use std::sync::Arc;
use tower_http::services::ServeDir;

#[derive(Clone)]
pub struct AppState {
    pub leptos_options: LeptosOptions,
    pub backend: Arc<HttpBackend>,
    pub authority: Arc<AdminAuthority>,
}

impl FromRef<AppState> for LeptosOptions {
    fn from_ref(state: &AppState) -> Self {
        state.leptos_options.clone()
    }
}

impl AppState {
    pub fn new(backend: HttpBackend, authority: AdminAuthority) -> Self {
        Self {
            leptos_options: LeptosOptions::builder()
                .output_name("frontend")
                .site_pkg_dir("pkg")
                .site_root("target/site")
                .build(),
            backend: Arc::new(backend),
            authority: Arc::new(authority),
        }
    }

    /// Context every server function and SSR render expects.
    fn provide(&self) {
        provide_context(Arc::clone(&self.backend));
        provide_context(Arc::clone(&self.authority));
    }
}

pub fn shell(options: LeptosOptions) -> impl IntoView {
    use leptos::hydration::{AutoReload, HydrationScripts};
    use leptos_meta::MetaTags;
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <link rel="stylesheet" href="/pkg/frontend.css"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

pub fn build_router(state: AppState) -> Router {
    let routes = generate_route_list(App);

    Router::new()
        .route(
            "/api/{*fn_name}",
            get(server_fn_handler).post(server_fn_handler),
        )
        .leptos_routes_with_context(
            &state,
            routes,
            {
                let state = state.clone();
                move || state.provide()
            },
            {
                let options = state.leptos_options.clone();
                move || shell(options.clone())
            },
        )
        .fallback(file_and_error_handler)
        .nest_service("/pkg", ServeDir::new("target/site/pkg"))
        .with_state(state)
}

async fn server_fn_handler(State(state): State<AppState>, req: Request<Body>) -> impl IntoResponse {
    handle_server_fns_with_context(move || state.provide(), req).await
}

async fn file_and_error_handler(State(state): State<AppState>, req: Request<Body>) -> Response {
    let path = req.uri().path();

    if path.starts_with("/pkg") {
        return (
            axum::http::StatusCode::NOT_FOUND,
            Html("<h1>404 Not Found</h1>"),
        )
            .into_response();
    }

    let options = state.leptos_options.clone();
    let handler = leptos_axum::render_app_to_stream_with_context(
        move || state.provide(),
        move || shell(options.clone()),
    );
    handler(req).await.into_response()
}
