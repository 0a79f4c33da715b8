//! `/api/transactions`

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use super::named::IdsBody;
use super::{data, ApiJson, ApiQuery, ApiResult, AppState, AuthUser};
use crate::models::{Deleted, NewTransaction, Transaction, TransactionRow};
use crate::period::DateRange;
use crate::transactions::{self, TransactionFilter};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub account_id: Option<String>,
}

pub fn register(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/transactions", get(list).post(create))
        .route("/api/transactions/bulk-create", post(bulk_create))
        .route("/api/transactions/bulk-delete", post(bulk_delete))
        .route(
            "/api/transactions/{id}",
            get(get_one).patch(update).delete(delete),
        )
}

async fn list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Vec<TransactionRow>> {
    let filter = TransactionFilter {
        range: DateRange::resolve_today(query.from.as_deref(), query.to.as_deref())?,
        account_id: query.account_id.filter(|id| !id.is_empty()),
    };
    let conn = state.db.get()?;
    Ok(data(transactions::list(&conn, &user, &filter)?))
}

async fn get_one(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Transaction> {
    let conn = state.db.get()?;
    Ok(data(transactions::get(&conn, &user, &id)?))
}

async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<NewTransaction>,
) -> ApiResult<Transaction> {
    let conn = state.db.get()?;
    Ok(data(transactions::create(&conn, &user, &body)?))
}

async fn bulk_create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<Vec<NewTransaction>>,
) -> ApiResult<Vec<Transaction>> {
    let mut conn = state.db.get()?;
    Ok(data(transactions::bulk_create(&mut conn, &user, &body)?))
}

async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<NewTransaction>,
) -> ApiResult<Transaction> {
    let conn = state.db.get()?;
    Ok(data(transactions::update(&conn, &user, &id, &body)?))
}

async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let conn = state.db.get()?;
    Ok(data(transactions::delete(&conn, &user, &id)?))
}

async fn bulk_delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<IdsBody>,
) -> ApiResult<Vec<Deleted>> {
    let conn = state.db.get()?;
    Ok(data(transactions::bulk_delete(&conn, &user, &body.ids)?))
}
