//! # Blogicum Shared
//!
//! Request forms, view documents and error documents exchanged over HTTP.

pub mod dto;
pub mod forms;
pub mod response;

pub use forms::FieldErrors;
pub use response::ErrorResponse;
