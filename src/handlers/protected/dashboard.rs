// handlers/protected/dashboard.rs - GET /api/dashboard/overview handler

use axum::extract::State;
use serde::Serialize;

use crate::database::models::UserSummary;
use crate::middleware::{ApiResult, ApiResponse, CurrentSession};
use crate::presentation::{stat_cards, DashboardStats, Link, StatCard, NAVIGATION, QUICK_ACTIONS};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub user: UserSummary,
    pub stats: DashboardStats,
    pub cards: Vec<StatCard>,
    pub navigation: &'static [Link],
    pub quick_actions: &'static [Link],
}

/// GET /api/dashboard/overview - Signed-in landing data
///
/// Content and view totals are not tracked by this service and are reported
/// as unknown; their cards render `"0"`.
///
/// Expected Output:
/// ```json
/// {
///   "success": true,
///   "data": {
///     "user": { "id": "uuid", "name": "Ada", "email": "ada@example.com" },
///     "stats": { "total_content": null, "total_views": null, "credits": 50, "workspaces": 1 },
///     "cards": [ { "key": "credits", "label": "Credits", "value": "50" } ],
///     "navigation": [ { "label": "Overview", "href": "/dashboard" } ],
///     "quick_actions": [ { "label": "Create content", "href": "/content/new" } ]
///   }
/// }
/// ```
pub async fn overview(State(state): State<AppState>, session: CurrentSession) -> ApiResult<OverviewResponse> {
    let user = super::load_user(&state, &session).await?;
    let workspaces = state.store.list_workspaces(user.id).await?;

    let stats = DashboardStats {
        total_content: None,
        total_views: None,
        credits: Some(i64::from(user.credits)),
        workspaces: i64::try_from(workspaces.len()).ok(),
    };

    Ok(ApiResponse::success(OverviewResponse {
        user: UserSummary::from(&user),
        cards: stat_cards(Some(&stats)),
        stats,
        navigation: NAVIGATION,
        quick_actions: QUICK_ACTIONS,
    }))
}
