pub mod execution;
pub mod notification;
