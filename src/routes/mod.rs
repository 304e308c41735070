pub mod auth;

pub mod users;

pub mod lessons;

pub mod system;

pub mod videos;

pub use auth::configure_auth_routes;
pub use lessons::configure_lesson_routes;
pub use system::configure_system_routes;
pub use users::configure_user_routes;
pub use videos::configure_video_routes;
