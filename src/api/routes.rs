// Responsibility
// - URL 構造を定義 (/api/*, /exception/*, /kuke-health)
// - 認可そのものは access matrix (middleware) 側。ここは配線だけ
use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

use crate::api::handlers::{exception, friends, health, messages, rooms, sign, users};

pub fn routes() -> Router<AppState> {
    let sign_routes = Router::new()
        .route("/sign/register", post(sign::register))
        .route("/sign/login", post(sign::login))
        .route("/sign/login-by-provider", post(sign::login_by_provider))
        .route("/sign/register-by-provider", post(sign::register_by_provider))
        .route("/sign/refresh-token", post(sign::refresh_token))
        .route("/sign/logout", post(sign::logout))
        .route("/sign/change-password", put(sign::change_password));

    let user_routes = Router::new()
        .route("/users/me", get(users::me))
        .route("/users", get(users::list))
        .route("/users/nickname/{nickname}", get(users::by_nickname))
        .route(
            "/users/{user_id}",
            get(users::by_id).put(users::update).delete(users::delete),
        );

    let friend_routes = Router::new()
        .route("/friends/me", get(friends::me))
        .route(
            "/friends/{friend_id}",
            post(friends::add).delete(friends::remove),
        );

    let message_routes = Router::new()
        .route("/messages", post(messages::send))
        .route("/messages/sent", get(messages::sent))
        .route("/messages/received", get(messages::received))
        .route("/messages/{message_id}", delete(messages::delete));

    let room_routes = Router::new()
        .route("/rooms", get(rooms::list).post(rooms::create))
        .route("/rooms/{room_id}", get(rooms::get));

    let api = Router::new()
        .merge(sign_routes)
        .merge(user_routes)
        .merge(friend_routes)
        .merge(message_routes)
        .merge(room_routes);

    Router::new()
        .nest("/api", api)
        .route("/exception/entrypoint", get(exception::entry_point))
        .route("/exception/accessdenied", get(exception::access_denied))
        .route("/kuke-health/health", get(health::health))
}
