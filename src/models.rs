pub mod auth;
pub mod category;
pub mod customer;
pub mod dashboard;
pub mod reservation;
pub mod vehicle;
