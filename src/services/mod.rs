pub mod actor;
pub mod auth;
pub mod courses;
pub mod dashboard;
pub mod enrollments;
pub mod grading;

pub use actor::{Actor, RoleScope};
pub use auth::AuthService;
pub use courses::CourseService;
pub use dashboard::DashboardService;
pub use enrollments::EnrollmentService;
pub use grading::GradingService;
