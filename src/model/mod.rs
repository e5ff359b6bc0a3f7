pub mod attendance;
pub mod department;
pub mod employee;
pub mod job_title;
pub mod leave_request;
pub mod project;
pub mod role;
pub mod stored_object;
pub mod task;
pub mod ticket;
