//! CourseDesk - 课程与成绩管理平台
//!
//! 基于 Actix Web 与服务端渲染模板构建的选课、评分系统，
//! 按管理员、教师、学生三种角色提供不同的视图与操作。
//!
//! # 架构
//! - `cache`: 缓存层（Moka），保存会话数据
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `middlewares`: 会话、登录校验、角色校验与限流中间件
//! - `models`: 数据模型定义
//! - `routes`: 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数
//! - `views`: Handlebars 页面渲染

pub mod cache;
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
pub mod views;
