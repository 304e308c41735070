//! Lesson Hub - 课程成果上传与管理后端服务
//!
//! 基于 Actix Web 构建，教师按班级上传课程文件，管理员统一查看。
//!
//! # 架构
//! - `blob`: 对象存储（本地目录 / 内存）
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `middlewares`: 认证授权与限流中间件
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层（上传编排、审计）
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 校验、清洗、限流等工具函数

pub mod blob;
pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub mod test_utils;
