//! # DI Abstractions
//!
//! 依赖注入抽象层，定义解析环境、依赖提供者与注入声明的核心接口。
//!
//! ## 核心接口
//!
//! - [`Environment`] - 解析环境接口（存在性检查 / 派生子环境 / 按键构造）
//! - [`DependencyProvider`] - 依赖提供者能力接口
//! - [`Injectable`] - 可注入组件的显式声明接口

pub mod environment;
pub mod injectable;
pub mod provider;

pub use environment::*;
pub use injectable::*;
pub use provider::*;
