// Core services
pub mod products;
