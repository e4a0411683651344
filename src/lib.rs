pub mod addresses;
pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod enrichment;
pub mod files;
pub mod models;
pub mod payments;
pub mod products;
pub mod response;
pub mod router;
pub mod state;
pub mod support;
pub mod transactions;
pub mod users;
pub mod validations;
pub mod views;
pub mod withdrawals;
