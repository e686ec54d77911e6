pub mod parameter_error_handler;
pub mod password;
pub mod random_code;
pub mod validate;

pub use parameter_error_handler::{form_error_handler, path_error_handler, query_error_handler};
