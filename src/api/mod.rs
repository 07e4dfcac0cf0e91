pub mod admin;
pub mod movements;
pub mod owners;
pub mod payments;
pub mod rates;

use crate::middleware::AppState;
use axum::Router;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/payments", payments::routes())
        .nest("/movements", movements::routes())
        .nest("/owners", owners::routes())
        .nest("/rates", rates::routes())
        .nest("/admin", admin::routes())
}
