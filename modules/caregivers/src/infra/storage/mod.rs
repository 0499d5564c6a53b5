pub mod entities;
pub mod mapper;
pub mod migrations;
pub mod repo;

pub use migrations::Migrator;
pub use repo::SeaOrmCaregiversRepository;
