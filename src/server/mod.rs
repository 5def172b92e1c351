use std::time::Duration;

use async_graphql::Schema;
use async_graphql::extensions::Tracing;
use async_graphql::http::{ALL_WEBSOCKET_PROTOCOLS, GraphiQLSource};
use async_graphql_axum::{GraphQLProtocol, GraphQLRequest, GraphQLResponse, GraphQLWebSocket};
use axum::Router;
use axum::extract::{State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Config, Transport};

pub mod gateway;
mod greetings;
mod schema;
mod store;

use gateway::SubscriptionTransport;
use schema::{MutationRoot, QueryRoot, SubscriptionRoot};

pub use store::Store;

pub type BookshelfSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

#[derive(Clone)]
struct AppState {
    schema: BookshelfSchema,
    subscriptions: SubscriptionTransport,
    graphiql: String,
}

pub fn build_schema(store: Store, greeting_interval: Duration) -> BookshelfSchema {
    Schema::build(
        QueryRoot {
            store: store.clone(),
        },
        MutationRoot { store },
        SubscriptionRoot { greeting_interval },
    )
    .extension(Tracing)
    .finish()
}

async fn graphiql(State(state): State<AppState>) -> impl IntoResponse {
    Html(state.graphiql)
}

#[axum::debug_handler]
async fn graphql_handler(State(state): State<AppState>, req: GraphQLRequest) -> GraphQLResponse {
    state.schema.execute(req.into_inner()).await.into()
}

async fn subscription_handler(
    State(state): State<AppState>,
    protocol: GraphQLProtocol,
    ws: WebSocketUpgrade,
) -> Response {
    if !state.subscriptions.is_accepting() {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    ws.protocols(ALL_WEBSOCKET_PROTOCOLS)
        .on_upgrade(move |socket| {
            let connection = GraphQLWebSocket::new(socket, state.schema, protocol).serve();
            state.subscriptions.session(connection)
        })
}

/// Mounts the schema on the HTTP path and, in dual mode, the WebSocket path.
pub fn make_app(
    schema: BookshelfSchema,
    config: &Config,
    subscriptions: SubscriptionTransport,
) -> Router {
    let mut page = GraphiQLSource::build().endpoint(&config.http_path);
    if config.transport == Transport::Dual {
        page = page.subscription_endpoint(&config.subscription_path);
    }

    let state = AppState {
        schema,
        subscriptions,
        graphiql: page.finish(),
    };

    let mut router = Router::new().route(&config.http_path, get(graphiql).post(graphql_handler));
    if config.transport == Transport::Dual {
        router = router.route(&config.subscription_path, get(subscription_handler));
    }

    router
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
