use std::env;

/// Runtime configuration, resolved once at startup. Secrets have no
/// hard-coded fallback: a missing value aborts the boot.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub razorpay_key_id: String,
    pub razorpay_key_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT").unwrap_or_else(|_| "3001".to_string()),
            database_url: require("DATABASE_URL")?,
            jwt_secret: require("JWT_SECRET")?,
            razorpay_key_id: require("RAZORPAY_KEY_ID")?,
            razorpay_key_secret: require("RAZORPAY_KEY_SECRET")?,
        })
    }
}

fn require(name: &str) -> Result<String, String> {
    env::var(name).map_err(|_| format!("{} must be set", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_names_the_missing_variable() {
        env::remove_var("STOREFRONT_TEST_MISSING");
        let err = require("STOREFRONT_TEST_MISSING").unwrap_err();
        assert_eq!(err, "STOREFRONT_TEST_MISSING must be set");
    }

    #[test]
    fn test_require_reads_present_variable() {
        env::set_var("STOREFRONT_TEST_PRESENT", "value");
        assert_eq!(require("STOREFRONT_TEST_PRESENT").unwrap(), "value");
        env::remove_var("STOREFRONT_TEST_PRESENT");
    }
}
