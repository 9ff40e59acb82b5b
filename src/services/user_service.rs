use crate::{
    database::MongoDB,
    models::{CartLine, Product, User},
    services::auth_service::UserProfile,
    utils::error::{require_field, AppError},
};
use futures::stream::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson, DateTime as BsonDateTime, Document};
use mongodb::options::ReturnDocument;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AddToCartRequest {
    pub product_id: String,
    pub quantity: Option<u32>,
}

/// A cart line populated with its product document.
#[derive(Debug, Serialize)]
pub struct CartEntry {
    pub product: Product,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub success: bool,
    pub cart: Vec<CartEntry>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub success: bool,
    pub users: Vec<UserProfile>,
    pub count: usize,
}

pub async fn get_profile(db: &MongoDB, user_id: &ObjectId) -> Result<UserProfile, AppError> {
    let collection = db.collection::<User>("users");

    let user = collection
        .find_one(doc! { "_id": user_id })
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;

    Ok(user.into())
}

pub async fn update_profile(
    db: &MongoDB,
    user_id: &ObjectId,
    request: &UpdateProfileRequest,
) -> Result<UserProfile, AppError> {
    let mut changes = Document::new();

    if let Some(name) = &request.name {
        require_field(name, "name")?;
        changes.insert("name", name.clone());
    }
    if let Some(address) = &request.address {
        require_field(address, "address")?;
        changes.insert("address", address.clone());
    }
    if let Some(phone) = &request.phone {
        require_field(phone, "phone")?;
        changes.insert("phone", phone.clone());
    }
    if let Some(gender) = &request.gender {
        require_field(gender, "gender")?;
        changes.insert("gender", gender.clone());
    }
    if let Some(picture) = &request.picture {
        changes.insert("picture", picture.clone());
    }

    if changes.is_empty() {
        return Err(AppError::Validation("no fields to update".to_string()));
    }
    changes.insert("updated_at", BsonDateTime::now());

    let collection = db.collection::<User>("users");

    let updated = collection
        .find_one_and_update(doc! { "_id": user_id }, doc! { "$set": changes })
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;

    Ok(updated.into())
}

/// Adds a line to the cart, or bumps its quantity when the product is already
/// there. Both paths are single conditional document updates so two
/// concurrent adds cannot overwrite each other.
pub async fn add_to_cart(
    db: &MongoDB,
    user_id: &ObjectId,
    request: &AddToCartRequest,
) -> Result<Vec<CartLine>, AppError> {
    let product_id = ObjectId::parse_str(&request.product_id)
        .map_err(|_| AppError::Validation("invalid product reference".to_string()))?;
    let quantity = request.quantity.unwrap_or(1);
    if quantity == 0 {
        return Err(AppError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }

    let products = db.collection::<Product>("products");
    products
        .find_one(doc! { "_id": product_id, "is_active": true })
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_string()))?;

    let users = db.collection::<User>("users");

    // Increment the matching line in place
    let incremented = users
        .update_one(
            doc! { "_id": user_id, "cart.product_id": product_id },
            doc! {
                "$inc": { "cart.$.quantity": quantity as i64 },
                "$set": { "updated_at": BsonDateTime::now() },
            },
        )
        .await?;

    if incremented.matched_count == 0 {
        let line = to_bson(&CartLine {
            product_id,
            quantity,
        })
        .map_err(|e| AppError::Database(e.to_string()))?;

        let pushed = users
            .update_one(
                doc! { "_id": user_id },
                doc! {
                    "$push": { "cart": line },
                    "$set": { "updated_at": BsonDateTime::now() },
                },
            )
            .await?;

        if pushed.matched_count == 0 {
            return Err(AppError::NotFound("user".to_string()));
        }
    }

    let user = users
        .find_one(doc! { "_id": user_id })
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;

    Ok(user.cart)
}

/// Cart lines joined with their product documents, in cart order. Lines whose
/// product has been removed from the catalog are skipped.
pub async fn get_cart(db: &MongoDB, user_id: &ObjectId) -> Result<CartResponse, AppError> {
    let users = db.collection::<User>("users");

    let user = users
        .find_one(doc! { "_id": user_id })
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;

    if user.cart.is_empty() {
        return Ok(CartResponse {
            success: true,
            cart: Vec::new(),
            count: 0,
        });
    }

    let ids: Vec<ObjectId> = user.cart.iter().map(|line| line.product_id).collect();

    let products = db.collection::<Product>("products");
    let mut cursor = products.find(doc! { "_id": { "$in": &ids } }).await?;

    let mut by_id: HashMap<ObjectId, Product> = HashMap::new();
    while let Some(result) = cursor.next().await {
        match result {
            Ok(product) => {
                if let Some(id) = product.id {
                    by_id.insert(id, product);
                }
            }
            Err(e) => log::error!("Error reading product: {}", e),
        }
    }

    let cart: Vec<CartEntry> = user
        .cart
        .into_iter()
        .filter_map(|line| {
            by_id.remove(&line.product_id).map(|product| CartEntry {
                product,
                quantity: line.quantity,
            })
        })
        .collect();

    let count = cart.len();

    Ok(CartResponse {
        success: true,
        cart,
        count,
    })
}

/// Drops a cart line with a single `$pull`. Removing a product that is not in
/// the cart is a no-op, not an error.
pub async fn remove_from_cart(
    db: &MongoDB,
    user_id: &ObjectId,
    product_id: &str,
) -> Result<Vec<CartLine>, AppError> {
    let product_id = ObjectId::parse_str(product_id)
        .map_err(|_| AppError::Validation("invalid product reference".to_string()))?;

    let users = db.collection::<User>("users");

    let updated = users
        .find_one_and_update(
            doc! { "_id": user_id },
            doc! {
                "$pull": { "cart": { "product_id": product_id } },
                "$set": { "updated_at": BsonDateTime::now() },
            },
        )
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;

    Ok(updated.cart)
}

// Admin listing, passwords never leave the service
pub async fn list_users(db: &MongoDB) -> Result<UsersResponse, AppError> {
    let collection = db.collection::<User>("users");

    let mut cursor = collection.find(doc! {}).await?;

    let mut users = Vec::new();
    while let Some(result) = cursor.next().await {
        match result {
            Ok(user) => users.push(user.into()),
            Err(e) => log::error!("Error reading user: {}", e),
        }
    }

    let count = users.len();

    Ok(UsersResponse {
        success: true,
        users,
        count,
    })
}

// Admin hard delete
pub async fn delete_user(db: &MongoDB, user_id: &str) -> Result<(), AppError> {
    let user_id = ObjectId::parse_str(user_id)
        .map_err(|_| AppError::Validation("invalid user reference".to_string()))?;

    let collection = db.collection::<User>("users");

    let result = collection.delete_one(doc! { "_id": user_id }).await?;
    if result.deleted_count == 0 {
        return Err(AppError::NotFound("user".to_string()));
    }

    Ok(())
}
