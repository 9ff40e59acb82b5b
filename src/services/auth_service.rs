use crate::{
    database::MongoDB,
    models::{Admin, User},
    utils::error::{require_field, AppError},
};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TOKEN_TTL_DAYS: i64 = 7;

/// Identity space of a principal. One token mechanism serves both, the role
/// tag is what separates user routes from admin routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // principal ObjectId as hex
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
}

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub phone: String,
    pub gender: String,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterAdminRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
    pub gender: String,
    pub picture: Option<String>,
    pub is_admin: bool,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: user.name,
            email: user.email,
            address: user.address,
            phone: user.phone,
            gender: user.gender,
            picture: user.picture,
            is_admin: user.is_admin,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AdminProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
}

impl From<Admin> for AdminProfile {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: admin.name,
            email: admin.email,
            phone: admin.phone,
            role: admin.role,
        }
    }
}

// Generate a signed token for a principal, 7-day expiry
pub fn generate_token(id: &ObjectId, role: Role, secret: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: id.to_hex(),
        role,
        iat: now.timestamp() as usize,
        exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| AppError::Database(format!("failed to sign token: {}", e)))
}

// Verify signature and expiry, return the decoded claims
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

// User registration
pub async fn register_user(db: &MongoDB, request: &RegisterUserRequest) -> Result<User, AppError> {
    require_field(&request.name, "name")?;
    require_field(&request.email, "email")?;
    require_field(&request.password, "password")?;
    require_field(&request.address, "address")?;
    require_field(&request.phone, "phone")?;
    require_field(&request.gender, "gender")?;

    let collection = db.collection::<User>("users");

    if collection
        .find_one(doc! { "email": &request.email })
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "a user with this email already exists".to_string(),
        ));
    }

    let hashed = hash(&request.password, DEFAULT_COST)?;

    let mut new_user = User {
        id: None,
        name: request.name.clone(),
        email: request.email.clone(),
        password: hashed,
        address: request.address.clone(),
        phone: request.phone.clone(),
        gender: request.gender.clone(),
        picture: request.picture.clone(),
        cart: Vec::new(),
        is_admin: false,
        created_at: Some(BsonDateTime::now()),
        updated_at: Some(BsonDateTime::now()),
    };

    let result = collection.insert_one(&new_user).await?;
    new_user.id = result.inserted_id.as_object_id();

    log::info!("✅ User registered: {}", new_user.email);

    Ok(new_user)
}

// User login: wrong email and wrong password are indistinguishable on purpose
pub async fn login_user(db: &MongoDB, request: &LoginRequest) -> Result<User, AppError> {
    let collection = db.collection::<User>("users");

    let user = collection
        .find_one(doc! { "email": &request.email })
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid credentials".to_string()))?;

    let valid = verify(&request.password, &user.password)?;
    if !valid {
        return Err(AppError::Unauthorized("invalid credentials".to_string()));
    }

    Ok(user)
}

// Admin registration
pub async fn register_admin(
    db: &MongoDB,
    request: &RegisterAdminRequest,
) -> Result<Admin, AppError> {
    require_field(&request.name, "name")?;
    require_field(&request.email, "email")?;
    require_field(&request.password, "password")?;
    require_field(&request.phone, "phone")?;

    let collection = db.collection::<Admin>("admins");

    if collection
        .find_one(doc! { "email": &request.email })
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "an admin with this email already exists".to_string(),
        ));
    }

    let hashed = hash(&request.password, DEFAULT_COST)?;

    let mut new_admin = Admin {
        id: None,
        name: request.name.clone(),
        email: request.email.clone(),
        password: hashed,
        phone: request.phone.clone(),
        role: "admin".to_string(),
        created_at: Some(BsonDateTime::now()),
        updated_at: Some(BsonDateTime::now()),
    };

    let result = collection.insert_one(&new_admin).await?;
    new_admin.id = result.inserted_id.as_object_id();

    log::info!("✅ Admin registered: {}", new_admin.email);

    Ok(new_admin)
}

// Admin login
pub async fn login_admin(db: &MongoDB, request: &LoginRequest) -> Result<Admin, AppError> {
    let collection = db.collection::<Admin>("admins");

    let admin = collection
        .find_one(doc! { "email": &request.email })
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid credentials".to_string()))?;

    let valid = verify(&request.password, &admin.password)?;
    if !valid {
        return Err(AppError::Unauthorized("invalid credentials".to_string()));
    }

    Ok(admin)
}

// Fetch own admin record
pub async fn get_admin_profile(db: &MongoDB, admin_id: &ObjectId) -> Result<AdminProfile, AppError> {
    let collection = db.collection::<Admin>("admins");

    let admin = collection
        .find_one(doc! { "_id": admin_id })
        .await?
        .ok_or_else(|| AppError::NotFound("admin".to_string()))?;

    Ok(admin.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn test_password_hash_round_trip() {
        let hashed = hash("pw1", DEFAULT_COST).unwrap();
        assert!(verify("pw1", &hashed).unwrap());
        assert!(!verify("pw2", &hashed).unwrap());
        assert!(!verify("", &hashed).unwrap());
    }

    #[test]
    fn test_token_round_trip_preserves_principal() {
        let id = ObjectId::new();
        let token = generate_token(&id, Role::User, SECRET).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, id.to_hex());
        assert_eq!(claims.role, Role::User);
    }

    #[test]
    fn test_admin_role_survives_round_trip() {
        let id = ObjectId::new();
        let token = generate_token(&id, Role::Admin, SECRET).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let token = generate_token(&ObjectId::new(), Role::User, SECRET).unwrap();
        let mut tampered = token.into_bytes();
        let last = tampered.len() - 1;
        tampered[last] = if tampered[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();
        assert!(verify_token(&tampered, SECRET).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = generate_token(&ObjectId::new(), Role::User, SECRET).unwrap();
        assert!(verify_token(&token, "another-secret").is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let now = Utc::now();
        let claims = Claims {
            sub: ObjectId::new().to_hex(),
            role: Role::User,
            iat: (now - Duration::days(8)).timestamp() as usize,
            exp: (now - Duration::days(1)).timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_ref()),
        )
        .unwrap();
        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_duplicate_email_is_a_conflict() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let db = MongoDB::new(&uri).await.unwrap();

        let request = RegisterUserRequest {
            name: "A".to_string(),
            email: format!("{}@test.local", Uuid::new_v4().simple()),
            password: "pw1".to_string(),
            address: "1 Test Street".to_string(),
            phone: "9999999999".to_string(),
            gender: "female".to_string(),
            picture: None,
        };

        register_user(&db, &request).await.unwrap();
        let second = register_user(&db, &request).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));

        let count = db
            .collection::<User>("users")
            .count_documents(doc! { "email": &request.email })
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_wrong_password_is_unauthorized() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let db = MongoDB::new(&uri).await.unwrap();

        let email = format!("{}@test.local", Uuid::new_v4().simple());
        let request = RegisterUserRequest {
            name: "A".to_string(),
            email: email.clone(),
            password: "pw1".to_string(),
            address: "1 Test Street".to_string(),
            phone: "9999999999".to_string(),
            gender: "female".to_string(),
            picture: None,
        };
        register_user(&db, &request).await.unwrap();

        let attempt = login_user(
            &db,
            &LoginRequest {
                email,
                password: "wrong".to_string(),
            },
        )
        .await;
        assert!(matches!(attempt, Err(AppError::Unauthorized(_))));
    }
}
