//! `/api/accounts` and `/api/categories`.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use super::{data, ApiJson, ApiResult, AppState, AuthUser};
use crate::models::{Deleted, Named};
use crate::named::NamedKind;

#[derive(Debug, Deserialize)]
pub struct NameBody {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct IdsBody {
    pub ids: Vec<String>,
}

/// Mount the five routes for `kind` under `base`.
pub fn register(router: Router<AppState>, base: &str, kind: NamedKind) -> Router<AppState> {
    router
        .route(
            base,
            get(move |state: State<AppState>, user: AuthUser| list(kind, state, user)).post(
                move |state: State<AppState>, user: AuthUser, body: ApiJson<NameBody>| {
                    create(kind, state, user, body)
                },
            ),
        )
        .route(
            &format!("{base}/bulk-delete"),
            post(
                move |state: State<AppState>, user: AuthUser, body: ApiJson<IdsBody>| {
                    bulk_delete(kind, state, user, body)
                },
            ),
        )
        .route(
            &format!("{base}/{{id}}"),
            get(move |state: State<AppState>, user: AuthUser, id: Path<String>| {
                get_one(kind, state, user, id)
            })
            .patch(
                move |state: State<AppState>,
                      user: AuthUser,
                      id: Path<String>,
                      body: ApiJson<NameBody>| { rename(kind, state, user, id, body) },
            )
            .delete(move |state: State<AppState>, user: AuthUser, id: Path<String>| {
                delete(kind, state, user, id)
            }),
        )
}

async fn list(
    kind: NamedKind,
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Vec<Named>> {
    let conn = state.db.get()?;
    Ok(data(kind.list(&conn, &user)?))
}

async fn get_one(
    kind: NamedKind,
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Named> {
    let conn = state.db.get()?;
    Ok(data(kind.get(&conn, &user, &id)?))
}

async fn create(
    kind: NamedKind,
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<NameBody>,
) -> ApiResult<Named> {
    let conn = state.db.get()?;
    Ok(data(kind.create(&conn, &user, &body.name)?))
}

async fn rename(
    kind: NamedKind,
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<NameBody>,
) -> ApiResult<Named> {
    let conn = state.db.get()?;
    Ok(data(kind.rename(&conn, &user, &id, &body.name)?))
}

async fn delete(
    kind: NamedKind,
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let conn = state.db.get()?;
    Ok(data(kind.delete(&conn, &user, &id)?))
}

async fn bulk_delete(
    kind: NamedKind,
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<IdsBody>,
) -> ApiResult<Vec<Deleted>> {
    let conn = state.db.get()?;
    Ok(data(kind.bulk_delete(&conn, &user, &body.ids)?))
}
