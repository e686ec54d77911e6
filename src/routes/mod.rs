pub mod assets;

pub mod auth;

pub mod courses;

pub mod dashboard;

pub mod enrollments;

pub mod grading;

pub use assets::configure_asset_routes;
pub use auth::configure_auth_routes;
pub use courses::configure_course_routes;
pub use dashboard::configure_dashboard_routes;
pub use enrollments::configure_enrollment_routes;
pub use grading::configure_grading_routes;
