// src/handlers.rs

pub mod auth;
pub mod catalog;
pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod exports;
pub mod reservations;
pub mod vehicles;
