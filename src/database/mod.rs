pub mod manager;
pub mod models;
pub mod repository;
pub mod seeder;

pub use manager::{DatabaseError, DatabaseManager};
pub use repository::Repository;
