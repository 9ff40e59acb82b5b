use crate::{
    database::MongoDB,
    models::{product::CATEGORIES, SupportQuery},
    utils::error::{require_field, AppError},
};
use futures::stream::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SubmitQueryRequest {
    pub name: String,
    pub email: String,
    pub category: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct QueriesResponse {
    pub success: bool,
    pub queries: Vec<SupportQuery>,
    pub count: usize,
}

fn validate(request: &SubmitQueryRequest) -> Result<(), AppError> {
    require_field(&request.name, "name")?;
    require_field(&request.email, "email")?;
    require_field(&request.category, "category")?;
    require_field(&request.message, "message")?;

    if !CATEGORIES.contains(&request.category.as_str()) {
        return Err(AppError::Validation("unknown category".to_string()));
    }

    Ok(())
}

pub async fn submit_query(
    db: &MongoDB,
    user_id: &ObjectId,
    request: &SubmitQueryRequest,
) -> Result<SupportQuery, AppError> {
    validate(request)?;

    let mut query = SupportQuery {
        id: None,
        user_id: Some(*user_id),
        name: request.name.clone(),
        email: request.email.clone(),
        category: request.category.clone(),
        message: request.message.clone(),
        created_at: Some(BsonDateTime::now()),
    };

    let collection = db.collection::<SupportQuery>("queries");
    let result = collection.insert_one(&query).await?;
    query.id = result.inserted_id.as_object_id();

    Ok(query)
}

// Admin listing, newest first
pub async fn all_queries(db: &MongoDB) -> Result<QueriesResponse, AppError> {
    let collection = db.collection::<SupportQuery>("queries");

    let options = mongodb::options::FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();

    let mut cursor = collection.find(doc! {}).with_options(options).await?;

    let mut queries = Vec::new();
    while let Some(result) = cursor.next().await {
        match result {
            Ok(query) => queries.push(query),
            Err(e) => log::error!("Error reading query: {}", e),
        }
    }

    let count = queries.len();

    Ok(QueriesResponse {
        success: true,
        queries,
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SubmitQueryRequest {
        SubmitQueryRequest {
            name: "A Customer".to_string(),
            email: "a@x.com".to_string(),
            category: "Electronics".to_string(),
            message: "Where is my order?".to_string(),
        }
    }

    #[test]
    fn test_valid_query_passes() {
        assert!(validate(&sample()).is_ok());
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let mut request = sample();
        request.category = "Spaceships".to_string();
        assert!(matches!(validate(&request), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_empty_message_is_rejected() {
        let mut request = sample();
        request.message = String::new();
        assert!(validate(&request).is_err());
    }
}
