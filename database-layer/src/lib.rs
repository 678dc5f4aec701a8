//! Persistence layer for the Kingdom Hospital backend
//!
//! This crate owns everything below the service layer:
//! - the PostgreSQL schema and its `sqlx` migrations
//! - one async repository trait per entity, with PostgreSQL and in-memory backends
//! - record types shared with the HTTP layer
//! - the CSV catalogue and demo-data seeder
//!
//! # Store constraints
//!
//! Every natural key has a named unique constraint and every reference a
//! named foreign key. Both backends report violations as
//! [`DatabaseError::UniqueViolation`] or [`DatabaseError::ForeignKeyViolation`]
//! carrying the constraint name, so callers can treat the store as the final
//! authority even when a pre-flight check raced with another writer.
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use database_layer::{DatabasePool, PoolSettings, Repositories, seed};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = DatabasePool::new("postgresql://localhost/hospital", &PoolSettings::default()).await?;
//!     db.migrate().await?;
//!
//!     let repos = Repositories::postgres(&db);
//!     seed::run(&repos, &seed::SeedOptions::default()).await?;
//!
//!     for doctor in repos.doctors.list().await? {
//!         println!("{} {}", doctor.last_name, doctor.first_name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod error;
pub mod models;
pub mod query;
pub mod repository;
pub mod seed;

pub use connection::{DatabasePool, PoolSettings, MIGRATOR};
pub use error::{DatabaseError, DatabaseResult};
pub use models::*;
pub use query::FilteredQuery;
pub use repository::memory::InMemoryStore;
pub use repository::{
    ConsultationRepository, DoctorRepository, MedicamentRepository, OrdonnanceLigneRepository,
    OrdonnanceRepository, PatientRepository, Repositories, SpecialtyRepository,
};
