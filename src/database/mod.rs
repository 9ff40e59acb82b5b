use mongodb::{Client, Collection, Database};
use std::error::Error;

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = uri
            .split('/')
            .last()
            .and_then(|s| s.split('?').next())
            .unwrap_or("Storefront");

        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { client, db };

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the request path relies on: unique email/SKU for
    /// duplicate rejection, user_id on orders for the "my orders" listing.
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        let unique = IndexOptions::builder().unique(true).build();

        let users = self.database().collection::<mongodb::bson::Document>("users");
        let users_email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(unique.clone())
            .build();
        match users.create_index(users_email_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(email) unique"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let admins = self.database().collection::<mongodb::bson::Document>("admins");
        let admins_email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(unique.clone())
            .build();
        match admins.create_index(admins_email_index).await {
            Ok(_) => log::info!("   ✅ Index created: admins(email) unique"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let products = self.database().collection::<mongodb::bson::Document>("products");
        let products_sku_index = IndexModel::builder()
            .keys(doc! { "sku": 1 })
            .options(unique)
            .build();
        match products.create_index(products_sku_index).await {
            Ok(_) => log::info!("   ✅ Index created: products(sku) unique"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let orders = self.database().collection::<mongodb::bson::Document>("orders");
        let orders_user_index = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .build();
        match orders.create_index(orders_user_index).await {
            Ok(_) => log::info!("   ✅ Index created: orders(user_id)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_connection_and_indexes() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let db = MongoDB::new(&uri).await;
        assert!(db.is_ok());
    }
}
