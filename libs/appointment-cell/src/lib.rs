pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    Appointment, AppointmentDetail, AppointmentError, AppointmentFilter, AppointmentStatus,
    AppointmentSummary, CreateAppointmentRequest,
};
pub use services::booking::BookingService;
