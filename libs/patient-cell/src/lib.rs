pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{CreatePatientRequest, Patient, PatientError, PatientRecord};
pub use services::patient::PatientService;
