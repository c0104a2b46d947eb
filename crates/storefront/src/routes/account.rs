//! Account handlers: the session-scoped address book.

use axum::Json;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Value, json};
use tracing::instrument;

use marigold_core::{Address, AddressId};

use crate::addresses::AddressBook;
use crate::error::AppError;
use crate::middleware::AuthSession;
use crate::models::session::session_keys;

async fn load_book(auth: &AuthSession) -> Result<AddressBook, AppError> {
    Ok(auth
        .session
        .get(session_keys::ADDRESS_BOOK)
        .await?
        .unwrap_or_default())
}

async fn store_book(auth: &AuthSession, book: &AddressBook) -> Result<(), AppError> {
    auth.session
        .insert(session_keys::ADDRESS_BOOK, book)
        .await?;
    Ok(())
}

fn book_view(book: &AddressBook) -> Value {
    json!({
        "addresses": book.iter().collect::<Vec<_>>(),
        "selected": book.selected().map(|a| a.id.clone()),
    })
}

/// `GET /account/addresses`.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn addresses(auth: AuthSession) -> Result<Json<Value>, AppError> {
    let book = load_book(&auth).await?;
    Ok(Json(book_view(&book)))
}

/// `POST /account/addresses` - save a new address.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn create_address(
    auth: AuthSession,
    Json(address): Json<Address>,
) -> Result<impl IntoResponse, AppError> {
    let mut book = load_book(&auth).await?;
    let id = book.add(address)?;
    store_book(&auth, &book).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// `PUT /account/addresses/{id}`.
#[instrument(skip_all, fields(user_id = %auth.user.id, address_id = %id))]
pub async fn update_address(
    auth: AuthSession,
    Path(id): Path<AddressId>,
    Json(address): Json<Address>,
) -> Result<Json<Value>, AppError> {
    let mut book = load_book(&auth).await?;
    book.update(&id, address)?;
    store_book(&auth, &book).await?;
    Ok(Json(book_view(&book)))
}

/// `DELETE /account/addresses/{id}`.
#[instrument(skip_all, fields(user_id = %auth.user.id, address_id = %id))]
pub async fn delete_address(
    auth: AuthSession,
    Path(id): Path<AddressId>,
) -> Result<Json<Value>, AppError> {
    let mut book = load_book(&auth).await?;
    book.remove(&id)?;
    store_book(&auth, &book).await?;
    Ok(Json(book_view(&book)))
}

/// `POST /account/addresses/{id}/select` - choose the checkout address.
#[instrument(skip_all, fields(user_id = %auth.user.id, address_id = %id))]
pub async fn select_address(
    auth: AuthSession,
    Path(id): Path<AddressId>,
) -> Result<Json<Value>, AppError> {
    let mut book = load_book(&auth).await?;
    book.select(&id)?;
    store_book(&auth, &book).await?;
    Ok(Json(book_view(&book)))
}
