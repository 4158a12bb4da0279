pub mod request;
pub mod response;

pub use request::{CreateTaskRequest, UpdateTaskRequest};
pub use response::{MessageResponse, TaskResponse};
