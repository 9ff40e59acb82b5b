use crate::{
    database::MongoDB,
    models::Product,
    utils::error::{require_field, AppError},
};
use futures::stream::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::options::ReturnDocument;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Vec<String>,
    pub price: f64,
    pub category: String,
    pub image: String,
    pub stock: i64,
    pub brand: String,
    pub tags: Option<Vec<String>>,
    pub discount: Option<f64>,
    pub sku: String,
    pub rating: Option<f64>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<Vec<String>>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub stock: Option<i64>,
    pub brand: Option<String>,
    pub tags: Option<Vec<String>>,
    pub discount: Option<f64>,
    pub rating: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub success: bool,
    pub products: Vec<Product>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub success: bool,
    pub product: Product,
}

fn validate_new_product(request: &CreateProductRequest) -> Result<(), AppError> {
    require_field(&request.name, "name")?;
    require_field(&request.category, "category")?;
    require_field(&request.image, "image")?;
    require_field(&request.brand, "brand")?;
    require_field(&request.sku, "sku")?;

    if request.description.is_empty() {
        return Err(AppError::Validation(
            "description must contain at least one entry".to_string(),
        ));
    }
    if request.price < 0.0 {
        return Err(AppError::Validation("price must not be negative".to_string()));
    }
    if request.stock < 0 {
        return Err(AppError::Validation("stock must not be negative".to_string()));
    }
    if let Some(rating) = request.rating {
        if !(0.0..=5.0).contains(&rating) {
            return Err(AppError::Validation(
                "rating must be between 0 and 5".to_string(),
            ));
        }
    }
    if let Some(discount) = request.discount {
        if !(0.0..=100.0).contains(&discount) {
            return Err(AppError::Validation(
                "discount must be between 0 and 100".to_string(),
            ));
        }
    }

    Ok(())
}

pub async fn create_product(
    db: &MongoDB,
    request: &CreateProductRequest,
) -> Result<Product, AppError> {
    validate_new_product(request)?;

    let collection = db.collection::<Product>("products");

    if collection
        .find_one(doc! { "sku": &request.sku })
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "a product with this SKU already exists".to_string(),
        ));
    }

    let mut product = Product {
        id: None,
        name: request.name.clone(),
        description: request.description.clone(),
        price: request.price,
        category: request.category.clone(),
        image: request.image.clone(),
        stock: request.stock,
        brand: request.brand.clone(),
        tags: request.tags.clone().unwrap_or_default(),
        discount: request.discount.unwrap_or(0.0),
        sku: request.sku.clone(),
        rating: request.rating.unwrap_or(0.0),
        is_active: true,
        created_at: Some(BsonDateTime::now()),
        updated_at: Some(BsonDateTime::now()),
    };

    let result = collection.insert_one(&product).await?;
    product.id = result.inserted_id.as_object_id();

    log::info!("✅ Product created: {} ({})", product.name, product.sku);

    Ok(product)
}

/// Customer-facing listing: active products only, newest first.
pub async fn get_all_active(db: &MongoDB) -> Result<ProductsResponse, AppError> {
    let collection = db.collection::<Product>("products");

    let options = mongodb::options::FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();

    let mut cursor = collection
        .find(doc! { "is_active": true })
        .with_options(options)
        .await?;

    let mut products = Vec::new();
    while let Some(result) = cursor.next().await {
        match result {
            Ok(product) => products.push(product),
            Err(e) => log::error!("Error reading product: {}", e),
        }
    }

    let count = products.len();

    Ok(ProductsResponse {
        success: true,
        products,
        count,
    })
}

/// Customer-facing detail. Soft-deleted products are indistinguishable from
/// absent ones here.
pub async fn get_active_by_id(db: &MongoDB, product_id: &str) -> Result<Product, AppError> {
    let product_id = ObjectId::parse_str(product_id)
        .map_err(|_| AppError::Validation("invalid product reference".to_string()))?;

    let collection = db.collection::<Product>("products");

    collection
        .find_one(doc! { "_id": product_id, "is_active": true })
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_string()))
}

pub async fn update_product(
    db: &MongoDB,
    product_id: &str,
    request: &UpdateProductRequest,
) -> Result<Product, AppError> {
    let product_id = ObjectId::parse_str(product_id)
        .map_err(|_| AppError::Validation("invalid product reference".to_string()))?;

    let mut changes = Document::new();

    if let Some(name) = &request.name {
        require_field(name, "name")?;
        changes.insert("name", name.clone());
    }
    if let Some(description) = &request.description {
        if description.is_empty() {
            return Err(AppError::Validation(
                "description must contain at least one entry".to_string(),
            ));
        }
        changes.insert("description", description.clone());
    }
    if let Some(price) = request.price {
        if price < 0.0 {
            return Err(AppError::Validation("price must not be negative".to_string()));
        }
        changes.insert("price", price);
    }
    if let Some(category) = &request.category {
        require_field(category, "category")?;
        changes.insert("category", category.clone());
    }
    if let Some(image) = &request.image {
        changes.insert("image", image.clone());
    }
    if let Some(stock) = request.stock {
        if stock < 0 {
            return Err(AppError::Validation("stock must not be negative".to_string()));
        }
        changes.insert("stock", stock);
    }
    if let Some(brand) = &request.brand {
        changes.insert("brand", brand.clone());
    }
    if let Some(tags) = &request.tags {
        changes.insert("tags", tags.clone());
    }
    if let Some(discount) = request.discount {
        if !(0.0..=100.0).contains(&discount) {
            return Err(AppError::Validation(
                "discount must be between 0 and 100".to_string(),
            ));
        }
        changes.insert("discount", discount);
    }
    if let Some(rating) = request.rating {
        if !(0.0..=5.0).contains(&rating) {
            return Err(AppError::Validation(
                "rating must be between 0 and 5".to_string(),
            ));
        }
        changes.insert("rating", rating);
    }

    if changes.is_empty() {
        return Err(AppError::Validation("no fields to update".to_string()));
    }
    changes.insert("updated_at", BsonDateTime::now());

    let collection = db.collection::<Product>("products");

    collection
        .find_one_and_update(doc! { "_id": product_id }, doc! { "$set": changes })
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_string()))
}

/// Soft delete: the product stays in storage, hidden from customer-facing
/// endpoints.
pub async fn soft_delete(db: &MongoDB, product_id: &str) -> Result<(), AppError> {
    let product_id = ObjectId::parse_str(product_id)
        .map_err(|_| AppError::Validation("invalid product reference".to_string()))?;

    let collection = db.collection::<Product>("products");

    let result = collection
        .update_one(
            doc! { "_id": product_id },
            doc! { "$set": { "is_active": false, "updated_at": BsonDateTime::now() } },
        )
        .await?;

    if result.matched_count == 0 {
        return Err(AppError::NotFound("product".to_string()));
    }

    Ok(())
}

/// Case-insensitive substring match across the text fields; a query that
/// parses as a number additionally matches products priced at or under it.
fn build_search_filter(query: &str) -> Document {
    let mut clauses = vec![
        doc! { "name": { "$regex": query, "$options": "i" } },
        doc! { "category": { "$regex": query, "$options": "i" } },
        doc! { "description": { "$regex": query, "$options": "i" } },
        doc! { "tags": { "$regex": query, "$options": "i" } },
    ];

    if let Ok(ceiling) = query.trim().parse::<f64>() {
        clauses.push(doc! { "price": { "$lte": ceiling } });
    }

    doc! { "$or": clauses, "is_active": true }
}

pub async fn search(db: &MongoDB, query: &str) -> Result<ProductsResponse, AppError> {
    let collection = db.collection::<Product>("products");

    let options = mongodb::options::FindOptions::builder()
        .sort(doc! { "name": 1 })
        .limit(50)
        .build();

    let mut cursor = collection
        .find(build_search_filter(query))
        .with_options(options)
        .await?;

    let mut products = Vec::new();
    while let Some(result) = cursor.next().await {
        match result {
            Ok(product) => products.push(product),
            Err(e) => log::error!("Error reading product: {}", e),
        }
    }

    let count = products.len();

    Ok(ProductsResponse {
        success: true,
        products,
        count,
    })
}

/// Administrative listing, soft-deleted entries included.
pub async fn admin_list_all(db: &MongoDB) -> Result<ProductsResponse, AppError> {
    let collection = db.collection::<Product>("products");

    let options = mongodb::options::FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();

    let mut cursor = collection.find(doc! {}).with_options(options).await?;

    let mut products = Vec::new();
    while let Some(result) = cursor.next().await {
        match result {
            Ok(product) => products.push(product),
            Err(e) => log::error!("Error reading product: {}", e),
        }
    }

    let count = products.len();

    Ok(ProductsResponse {
        success: true,
        products,
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> CreateProductRequest {
        CreateProductRequest {
            name: "Wireless Mouse".to_string(),
            description: vec!["2.4GHz".to_string(), "Ergonomic".to_string()],
            price: 799.0,
            category: "Electronics".to_string(),
            image: "https://example.com/mouse.png".to_string(),
            stock: 25,
            brand: "Logi".to_string(),
            tags: Some(vec!["mouse".to_string()]),
            discount: Some(10.0),
            sku: "SKU-MOUSE-1".to_string(),
            rating: Some(4.5),
        }
    }

    #[test]
    fn test_valid_product_passes_validation() {
        assert!(validate_new_product(&sample_request()).is_ok());
    }

    #[test]
    fn test_empty_description_is_rejected() {
        let mut request = sample_request();
        request.description = Vec::new();
        assert!(matches!(
            validate_new_product(&request),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_out_of_range_rating_is_rejected() {
        let mut request = sample_request();
        request.rating = Some(5.5);
        assert!(validate_new_product(&request).is_err());

        request.rating = Some(-0.1);
        assert!(validate_new_product(&request).is_err());
    }

    #[test]
    fn test_search_filter_always_hides_inactive() {
        let filter = build_search_filter("mouse");
        assert_eq!(filter.get_bool("is_active").unwrap(), true);

        let filter = build_search_filter("500");
        assert_eq!(filter.get_bool("is_active").unwrap(), true);
    }

    #[test]
    fn test_numeric_query_adds_price_ceiling() {
        let filter = build_search_filter("500");
        let clauses = filter.get_array("$or").unwrap();
        assert_eq!(clauses.len(), 5);

        let price_clause = clauses
            .iter()
            .filter_map(|c| c.as_document())
            .find(|c| c.contains_key("price"))
            .expect("price clause present");
        assert_eq!(
            price_clause
                .get_document("price")
                .unwrap()
                .get_f64("$lte")
                .unwrap(),
            500.0
        );
    }

    #[test]
    fn test_text_query_has_no_price_clause() {
        let filter = build_search_filter("mouse");
        let clauses = filter.get_array("$or").unwrap();
        assert_eq!(clauses.len(), 4);
        assert!(clauses
            .iter()
            .filter_map(|c| c.as_document())
            .all(|c| !c.contains_key("price")));
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_soft_deleted_product_hidden_from_public_reads() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let db = MongoDB::new(&uri).await.unwrap();

        let mut request = sample_request();
        request.sku = format!("SKU-{}", uuid::Uuid::new_v4().simple());
        request.name = format!("Hidden Widget {}", uuid::Uuid::new_v4().simple());
        let product = create_product(&db, &request).await.unwrap();
        let id = product.id.unwrap().to_hex();

        soft_delete(&db, &id).await.unwrap();

        assert!(matches!(
            get_active_by_id(&db, &id).await,
            Err(AppError::NotFound(_))
        ));

        let listed = get_all_active(&db).await.unwrap();
        assert!(listed.products.iter().all(|p| p.id != product.id));

        let found = search(&db, &request.name).await.unwrap();
        assert!(found.products.iter().all(|p| p.id != product.id));

        let admin_listed = admin_list_all(&db).await.unwrap();
        assert!(admin_listed.products.iter().any(|p| p.id == product.id));
    }
}
