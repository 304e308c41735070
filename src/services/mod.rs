pub mod audit;
pub mod auth;
pub mod lessons;
pub mod system;
pub mod users;
pub mod videos;

pub use audit::SecurityMonitor;
pub use auth::AuthService;
pub use lessons::LessonService;
pub use system::SystemService;
pub use users::UserService;
pub use videos::VideoService;
