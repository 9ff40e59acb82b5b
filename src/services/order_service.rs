use crate::{
    database::MongoDB,
    models::{Order, OrderItem, OrderStatus, PaymentInfo, PaymentMethod, Product, User},
    utils::error::{require_field, AppError},
};
use futures::stream::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson, DateTime as BsonDateTime};
use mongodb::options::ReturnDocument;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct OrderItemInput {
    pub product_id: String,
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateOrderRequest {
    pub full_name: String,
    pub gender: String,
    pub phone: String,
    pub address: String,
    pub pincode: String,
    pub payment_method: String,
    /// Explicit "buy now" lines. When absent or empty the caller's persisted
    /// cart is converted instead.
    pub items: Option<Vec<OrderItemInput>>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: Order,
}

#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub success: bool,
    pub orders: Vec<Order>,
    pub count: usize,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateStatusRequest {
    pub status: String,
}

fn validate_delivery(request: &CreateOrderRequest) -> Result<PaymentMethod, AppError> {
    require_field(&request.full_name, "full_name")?;
    require_field(&request.gender, "gender")?;
    require_field(&request.phone, "phone")?;
    require_field(&request.address, "address")?;
    require_field(&request.pincode, "pincode")?;
    require_field(&request.payment_method, "payment_method")?;

    request
        .payment_method
        .parse()
        .map_err(|_| AppError::Validation("payment_method must be COD or Online".to_string()))
}

/// Structural validation of explicit "buy now" lines. Quantity defaults to 1.
fn parse_item_refs(items: &[OrderItemInput]) -> Result<Vec<(ObjectId, u32)>, AppError> {
    items
        .iter()
        .map(|item| {
            let product_id = ObjectId::parse_str(&item.product_id)
                .map_err(|_| AppError::Validation("invalid product reference".to_string()))?;
            let quantity = item.quantity.unwrap_or(1);
            if quantity == 0 {
                return Err(AppError::Validation(
                    "quantity must be at least 1".to_string(),
                ));
            }
            Ok((product_id, quantity))
        })
        .collect()
}

/// Resolves each line's unit price from the catalog in one query. Prices are
/// frozen here so the stored order keeps what was actually charged.
async fn snapshot_lines(
    db: &MongoDB,
    refs: &[(ObjectId, u32)],
) -> Result<Vec<OrderItem>, AppError> {
    let ids: Vec<ObjectId> = refs.iter().map(|(id, _)| *id).collect();

    let products = db.collection::<Product>("products");
    let mut cursor = products.find(doc! { "_id": { "$in": &ids } }).await?;

    let mut price_by_id: HashMap<ObjectId, f64> = HashMap::new();
    while let Some(result) = cursor.next().await {
        match result {
            Ok(product) => {
                if let Some(id) = product.id {
                    price_by_id.insert(id, product.price);
                }
            }
            Err(e) => log::error!("Error reading product: {}", e),
        }
    }

    refs.iter()
        .map(|(product_id, quantity)| {
            let unit_price = price_by_id
                .get(product_id)
                .copied()
                .ok_or_else(|| AppError::NotFound(format!("product {}", product_id.to_hex())))?;
            Ok(OrderItem {
                product_id: *product_id,
                quantity: *quantity,
                unit_price,
            })
        })
        .collect()
}

async fn create_order_internal(
    db: &MongoDB,
    user_id: &ObjectId,
    request: &CreateOrderRequest,
    payment: Option<PaymentInfo>,
) -> Result<Order, AppError> {
    let payment_method = validate_delivery(request)?;

    let (refs, from_cart) = match &request.items {
        Some(items) if !items.is_empty() => (parse_item_refs(items)?, false),
        _ => {
            let users = db.collection::<User>("users");
            let user = users
                .find_one(doc! { "_id": user_id })
                .await?
                .ok_or_else(|| AppError::NotFound("user".to_string()))?;

            if user.cart.is_empty() {
                return Err(AppError::Validation("cart is empty".to_string()));
            }

            let refs = user
                .cart
                .iter()
                .map(|line| (line.product_id, line.quantity))
                .collect();
            (refs, true)
        }
    };

    let items = snapshot_lines(db, &refs).await?;

    let mut order = Order {
        id: None,
        user_id: *user_id,
        items,
        full_name: request.full_name.clone(),
        gender: request.gender.clone(),
        phone: request.phone.clone(),
        address: request.address.clone(),
        pincode: request.pincode.clone(),
        payment_method,
        status: OrderStatus::Processing,
        payment,
        created_at: Some(BsonDateTime::now()),
        updated_at: Some(BsonDateTime::now()),
    };

    let orders = db.collection::<Order>("orders");
    let result = orders.insert_one(&order).await?;
    order.id = result.inserted_id.as_object_id();

    // Separate write from the insert above. A crash in between leaves the
    // cart intact alongside the created order.
    if from_cart {
        let users = db.collection::<User>("users");
        users
            .update_one(
                doc! { "_id": user_id },
                doc! { "$set": { "cart": [], "updated_at": BsonDateTime::now() } },
            )
            .await?;
    }

    log::info!(
        "✅ Order created for user {} with {} line(s)",
        user_id.to_hex(),
        order.items.len()
    );

    Ok(order)
}

/// Checkout: converts explicit items or the persisted cart into an order.
pub async fn create_order(
    db: &MongoDB,
    user_id: &ObjectId,
    request: &CreateOrderRequest,
) -> Result<Order, AppError> {
    create_order_internal(db, user_id, request, None).await
}

/// Same conversion, with the gateway confirmation attached. Called only after
/// the payment signature has been verified.
pub async fn create_paid_order(
    db: &MongoDB,
    user_id: &ObjectId,
    request: &CreateOrderRequest,
    payment_id: &str,
) -> Result<Order, AppError> {
    let payment = PaymentInfo {
        payment_id: payment_id.to_string(),
        payment_status: "Success".to_string(),
    };
    create_order_internal(db, user_id, request, Some(payment)).await
}

pub async fn my_orders(db: &MongoDB, user_id: &ObjectId) -> Result<OrdersResponse, AppError> {
    let collection = db.collection::<Order>("orders");

    let options = mongodb::options::FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();

    let mut cursor = collection
        .find(doc! { "user_id": user_id })
        .with_options(options)
        .await?;

    let mut orders = Vec::new();
    while let Some(result) = cursor.next().await {
        match result {
            Ok(order) => orders.push(order),
            Err(e) => log::error!("Error reading order: {}", e),
        }
    }

    let count = orders.len();

    Ok(OrdersResponse {
        success: true,
        orders,
        count,
    })
}

// Admin listing
pub async fn all_orders(db: &MongoDB) -> Result<OrdersResponse, AppError> {
    let collection = db.collection::<Order>("orders");

    let options = mongodb::options::FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();

    let mut cursor = collection.find(doc! {}).with_options(options).await?;

    let mut orders = Vec::new();
    while let Some(result) = cursor.next().await {
        match result {
            Ok(order) => orders.push(order),
            Err(e) => log::error!("Error reading order: {}", e),
        }
    }

    let count = orders.len();

    Ok(OrdersResponse {
        success: true,
        orders,
        count,
    })
}

// Admin status transition. The item list stays immutable.
pub async fn update_status(
    db: &MongoDB,
    order_id: &str,
    request: &UpdateStatusRequest,
) -> Result<Order, AppError> {
    let order_id = ObjectId::parse_str(order_id)
        .map_err(|_| AppError::Validation("invalid order reference".to_string()))?;

    let status: OrderStatus = request
        .status
        .parse()
        .map_err(|_| AppError::Validation("unknown order status".to_string()))?;

    let status_bson = to_bson(&status).map_err(|e| AppError::Database(e.to_string()))?;

    let collection = db.collection::<Order>("orders");

    collection
        .find_one_and_update(
            doc! { "_id": order_id },
            doc! { "$set": { "status": status_bson, "updated_at": BsonDateTime::now() } },
        )
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::NotFound("order".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delivery_request(items: Option<Vec<OrderItemInput>>) -> CreateOrderRequest {
        CreateOrderRequest {
            full_name: "A Tester".to_string(),
            gender: "female".to_string(),
            phone: "9999999999".to_string(),
            address: "1 Test Street".to_string(),
            pincode: "560001".to_string(),
            payment_method: "COD".to_string(),
            items,
        }
    }

    #[test]
    fn test_valid_delivery_fields_pass() {
        assert_eq!(
            validate_delivery(&delivery_request(None)).unwrap(),
            PaymentMethod::Cod
        );
    }

    #[test]
    fn test_each_missing_delivery_field_is_rejected() {
        let mut request = delivery_request(None);
        request.full_name = String::new();
        assert!(validate_delivery(&request).is_err());

        let mut request = delivery_request(None);
        request.phone = "  ".to_string();
        assert!(validate_delivery(&request).is_err());

        let mut request = delivery_request(None);
        request.pincode = String::new();
        assert!(validate_delivery(&request).is_err());
    }

    #[test]
    fn test_unknown_payment_method_is_rejected() {
        let mut request = delivery_request(None);
        request.payment_method = "Card".to_string();
        assert!(matches!(
            validate_delivery(&request),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_malformed_item_reference_is_rejected() {
        let items = vec![OrderItemInput {
            product_id: "not-a-reference".to_string(),
            quantity: Some(1),
        }];
        assert!(matches!(
            parse_item_refs(&items),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_item_quantity_defaults_to_one() {
        let id = ObjectId::new();
        let items = vec![OrderItemInput {
            product_id: id.to_hex(),
            quantity: None,
        }];
        let refs = parse_item_refs(&items).unwrap();
        assert_eq!(refs, vec![(id, 1)]);
    }

    #[test]
    fn test_zero_quantity_is_rejected() {
        let items = vec![OrderItemInput {
            product_id: ObjectId::new().to_hex(),
            quantity: Some(0),
        }];
        assert!(parse_item_refs(&items).is_err());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_empty_cart_checkout_creates_nothing() {
        use crate::services::auth_service::{register_user, RegisterUserRequest};

        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let db = MongoDB::new(&uri).await.unwrap();

        let user = register_user(
            &db,
            &RegisterUserRequest {
                name: "Empty Cart".to_string(),
                email: format!("{}@test.local", uuid::Uuid::new_v4().simple()),
                password: "pw1".to_string(),
                address: "1 Test Street".to_string(),
                phone: "9999999999".to_string(),
                gender: "male".to_string(),
                picture: None,
            },
        )
        .await
        .unwrap();
        let user_id = user.id.unwrap();

        let result = create_order(&db, &user_id, &delivery_request(None)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let count = db
            .collection::<Order>("orders")
            .count_documents(doc! { "user_id": user_id })
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_cart_checkout_snapshots_prices_and_clears_cart() {
        use crate::services::auth_service::{register_user, RegisterUserRequest};
        use crate::services::user_service::{add_to_cart, AddToCartRequest};

        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let db = MongoDB::new(&uri).await.unwrap();

        let user = register_user(
            &db,
            &RegisterUserRequest {
                name: "Checkout".to_string(),
                email: format!("{}@test.local", uuid::Uuid::new_v4().simple()),
                password: "pw1".to_string(),
                address: "1 Test Street".to_string(),
                phone: "9999999999".to_string(),
                gender: "female".to_string(),
                picture: None,
            },
        )
        .await
        .unwrap();
        let user_id = user.id.unwrap();

        let product = Product {
            id: None,
            name: "Snapshot Widget".to_string(),
            description: vec!["A bullet".to_string()],
            price: 250.0,
            category: "Home".to_string(),
            image: "https://example.com/w.png".to_string(),
            stock: 5,
            brand: "Test".to_string(),
            tags: Vec::new(),
            discount: 0.0,
            sku: format!("SKU-{}", uuid::Uuid::new_v4().simple()),
            rating: 0.0,
            is_active: true,
            created_at: Some(BsonDateTime::now()),
            updated_at: Some(BsonDateTime::now()),
        };
        let product_id = db
            .collection::<Product>("products")
            .insert_one(&product)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap();

        add_to_cart(
            &db,
            &user_id,
            &AddToCartRequest {
                product_id: product_id.to_hex(),
                quantity: Some(2),
            },
        )
        .await
        .unwrap();

        let order = create_order(&db, &user_id, &delivery_request(None))
            .await
            .unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].product_id, product_id);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].unit_price, 250.0);
        assert_eq!(order.status, OrderStatus::Processing);

        // Cart is reset after conversion
        let user = db
            .collection::<User>("users")
            .find_one(doc! { "_id": user_id })
            .await
            .unwrap()
            .unwrap();
        assert!(user.cart.is_empty());

        // A later price change must not rewrite order history
        db.collection::<Product>("products")
            .update_one(doc! { "_id": product_id }, doc! { "$set": { "price": 999.0 } })
            .await
            .unwrap();
        let listed = my_orders(&db, &user_id).await.unwrap();
        assert_eq!(listed.orders[0].items[0].unit_price, 250.0);
    }
}
