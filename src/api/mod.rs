pub mod attendance;
pub mod employee;
pub mod events;
pub mod leave_request;
pub mod org;
pub mod project;
pub mod storage;
pub mod task;
pub mod ticket;
