//! 业务数据模型

pub mod audit;
pub mod auth;
pub mod common;
pub mod lessons;
pub mod system;
pub mod users;

pub use common::{ApiResponse, ErrorCode, PaginatedResponse, PaginationInfo, PaginationQuery};
pub use system::AppStartTime;
