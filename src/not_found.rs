//! The 404 page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    let page = error_view(
        "Page Not Found",
        "404",
        "Sorry, that page does not exist.",
        "Check the address, or head back to the ledger.",
    );

    (StatusCode::NOT_FOUND, page).into_response()
}
