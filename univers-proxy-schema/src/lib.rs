pub mod agrega;
pub mod envelope;

pub use agrega::{CreateLead, LeadStatus, LeadValidationError, UpdateLeadStatus};
pub use envelope::{ErrorEnvelope, ErrorResponseBody};
