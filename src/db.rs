pub mod category_repo;
pub use category_repo::CategoryRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod reservation_repo;
pub use reservation_repo::ReservationRepository;
pub mod vehicle_repo;
pub use vehicle_repo::VehicleRepository;
