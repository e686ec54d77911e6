pub mod auth;
pub mod common;
pub mod courses;
pub mod dashboard;
pub mod enrollments;
pub mod users;

pub use common::flash::{FlashLevel, FlashMessage};
