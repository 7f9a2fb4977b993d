use std::collections::{HashMap, HashSet};

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::app::{
    db::{self, organizations::TreeRow},
    error::AppError,
    scope::{scope, ResourceKind},
    session::ApiAuthenticatedSession,
    AppState,
};

/// One node of the organization hierarchy.
#[derive(Debug, Serialize, PartialEq)]
pub struct TreeNode {
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(rename = "type")]
    pub org_type: String,
    pub children: Vec<TreeNode>,
}

/// Nest rows under their parents. Rows whose parent is not in the set become roots,
/// so a scoped principal gets its own organization as the root.
pub fn build_tree(rows: Vec<TreeRow>) -> Vec<TreeNode> {
    let ids: HashSet<String> = rows.iter().map(|row| row.id.clone()).collect();
    let mut by_parent: HashMap<Option<String>, Vec<TreeRow>> = HashMap::new();
    for row in rows {
        let parent = row.parent_id.clone().filter(|parent| ids.contains(parent));
        by_parent.entry(parent).or_default().push(row);
    }
    attach(None, &mut by_parent)
}

fn attach(parent: Option<String>, by_parent: &mut HashMap<Option<String>, Vec<TreeRow>>) -> Vec<TreeNode> {
    let Some(rows) = by_parent.remove(&parent) else {
        return Vec::new();
    };
    rows.into_iter()
        .map(|row| {
            let children = attach(Some(row.id.clone()), by_parent);
            TreeNode {
                id: row.id,
                name: row.name,
                code: row.code,
                org_type: row.org_type,
                children,
            }
        })
        .collect()
}

/// GET /api/organizations/tree. Active organizations only.
pub async fn organization_tree(
    ApiAuthenticatedSession(principal): ApiAuthenticatedSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<TreeNode>>, AppError> {
    let scope = scope(&principal, ResourceKind::Organization);
    let rows = db::organizations::list_active_scoped(&state.db, &scope).await?;
    Ok(Json(build_tree(rows)))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/organizations/tree", get(organization_tree))
}
