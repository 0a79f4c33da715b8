use axum::extract::State;
use serde::Deserialize;

use super::{data, ApiQuery, ApiResult, AppState, AuthUser};
use crate::period::DateRange;
use crate::summary::{self, Summary};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub account_id: Option<String>,
}

/// GET /api/summary
pub async fn get_summary(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiQuery(query): ApiQuery<SummaryQuery>,
) -> ApiResult<Summary> {
    let range = DateRange::resolve_today(query.from.as_deref(), query.to.as_deref())?;
    let account_id = query.account_id.as_deref().filter(|id| !id.is_empty());
    let conn = state.db.get()?;
    Ok(data(summary::get_summary(&conn, &user, account_id, &range)?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::super::test_support::*;

    #[tokio::test]
    async fn summary_over_explicit_range() {
        let t = TestApp::new();
        let (_, acct) = t.post("/api/accounts", "alice", json!({ "name": "Checking" })).await;
        let (_, food) = t.post("/api/categories", "alice", json!({ "name": "Food" })).await;
        let acct = acct["data"]["id"].clone();
        let food = food["data"]["id"].clone();

        let batch = json!([
            { "date": "2024-03-01", "accountId": acct, "payee": "Employer", "amount": 100_000 },
            { "date": "2024-03-02", "accountId": acct, "categoryId": food, "payee": "Grocer", "amount": -40_000 },
            { "date": "2024-02-25", "accountId": acct, "payee": "Employer", "amount": 50_000 },
        ]);
        let (status, _) = t.post("/api/transactions/bulk-create", "alice", batch).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = t.get("/api/summary?from=2024-03-01&to=2024-03-03", "alice").await;
        assert_eq!(status, StatusCode::OK);
        let s = &body["data"];
        assert_eq!(s["incomeAmount"], 100_000);
        assert_eq!(s["expensesAmount"], -40_000);
        assert_eq!(s["remainingAmount"], 60_000);
        // Previous window is 2024-02-27..=2024-02-29, which is empty.
        assert_eq!(s["incomeChange"], 100);
        assert_eq!(s["categories"], json!([{ "name": "Food", "value": 40_000 }]));

        let days = s["days"].as_array().unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days[1], json!({ "date": "2024-03-02", "income": 0, "expenses": 40_000 }));
        assert_eq!(days[2]["income"], 0);
    }

    #[tokio::test]
    async fn summary_is_empty_for_new_user() {
        let t = TestApp::new();
        let (status, body) = t.get("/api/summary?from=2024-03-01&to=2024-03-07", "carol").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["remainingAmount"], 0);
        assert_eq!(body["data"]["days"].as_array().unwrap().len(), 7);
        assert!(body["data"]["categories"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn summary_rejects_inverted_range() {
        let t = TestApp::new();
        let (status, body) = t.get("/api/summary?from=2024-03-07&to=2024-03-01", "alice").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn summary_rejects_dates_at_the_calendar_limits() {
        let t = TestApp::new();
        for uri in [
            "/api/summary?to=-262143-01-10",
            "/api/summary?from=-262143-01-01&to=-262143-01-05",
            "/api/summary?from=-262143-01-01&to=%2B262142-12-31",
        ] {
            let (status, body) = t.get(uri, "alice").await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["error"].is_string());
        }
    }
}
