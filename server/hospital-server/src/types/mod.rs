pub mod filters;
pub mod requests;

pub use filters::{DoctorVisitQuery, VisitQuery};
pub use requests::*;
