//! JSON endpoints for categories.

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
};

use crate::{
    AppState, Error,
    category::{Category, CategoryFormData, CategoryTitle, get_all_categories, get_category},
    database_id::CategoryId,
    store::TrackerStore,
};

/// The state needed by the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryEndpointState {
    pub store: TrackerStore,
}

impl FromRef<AppState> for CategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}

/// List all categories ordered by title, including those without trackers.
pub async fn get_categories_endpoint(
    State(state): State<CategoryEndpointState>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = state.store.connection()?;
    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok(Json(categories))
}

pub async fn get_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<CategoryEndpointState>,
) -> Result<Json<Category>, Error> {
    let connection = state.store.connection()?;
    let category = get_category(category_id, &connection)?;

    Ok(Json(category))
}

/// Get the category with the given title, creating it if needed.
pub async fn create_category_endpoint(
    State(state): State<CategoryEndpointState>,
    Json(form): Json<CategoryFormData>,
) -> Result<Json<Category>, Error> {
    let title = CategoryTitle::new(&form.title)?;
    let category = state.store.create_category(&title)?;

    Ok(Json(category))
}

pub async fn rename_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<CategoryEndpointState>,
    Json(form): Json<CategoryFormData>,
) -> Result<Json<Category>, Error> {
    let title = CategoryTitle::new(&form.title)?;
    let category = state.store.rename_category(category_id, &title)?;

    Ok(Json(category))
}

/// Delete a category. Its trackers are kept without a category.
pub async fn delete_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<CategoryEndpointState>,
) -> Result<StatusCode, Error> {
    state.store.delete_category(category_id)?;

    Ok(StatusCode::NO_CONTENT)
}
