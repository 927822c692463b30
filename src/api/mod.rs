/// API routes and handlers
pub mod bills;
pub mod certificates;
pub mod clients;
pub mod internships;
pub mod middleware;
pub mod projects;
pub mod session;
pub mod tasks;
pub mod users;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(session::routes())
        .merge(users::routes())
        .merge(internships::routes())
        .merge(certificates::routes())
        .merge(tasks::routes())
        .merge(projects::routes())
        .merge(clients::routes())
        .merge(bills::routes())
}
