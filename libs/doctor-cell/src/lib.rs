pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{CreateDoctorRequest, Doctor, DoctorError, DoctorSummary};
pub use services::availability::{canonical_slot, AvailabilityStore};
pub use services::doctor::DoctorService;
