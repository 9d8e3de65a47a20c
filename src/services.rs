// src/services.rs

pub mod auth;
pub mod customer_service;
pub mod dashboard_service;
pub mod document_service;
pub mod export_service;
pub mod fleet_service;
pub mod reservation_service;
pub mod storage;
pub mod sweep_service;
