pub mod leave_request;
pub mod person;
pub mod progress_report;
pub mod role;
pub mod task;
