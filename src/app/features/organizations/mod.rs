pub mod create;
pub mod detail;
pub mod list;
pub mod tree;

use axum::Router;

use crate::app::AppState;

/// Organization routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(list::routes())
        .merge(create::routes())
        .merge(tree::routes())
        .merge(detail::routes())
}

/// Organization management is reserved to administrators.
fn require_admin(principal: &crate::app::domain::Principal) -> Result<(), crate::app::error::AppError> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(crate::app::error::AppError::Forbidden(
            "Only administrators can manage organizations".to_string(),
        ))
    }
}
