pub mod admin;
pub mod health;
pub mod orders;
pub mod payment;
pub mod products;
pub mod swagger;
pub mod users;
