//! # DI Common
//!
//! 上下文作用域依赖注入的公共词汇表。
//!
//! ## 核心类型
//!
//! - [`BindingKey`] - 由类型信息和限定符组成的绑定键
//! - [`Qualifier`] - 绑定限定符（默认 / 占位 / 上下文标签）
//! - [`ContextTag`] - 标识组件图变体的上下文标签
//! - [`Lifetime`] - 组件生命周期
//! - [`RegistrationError`] / [`DependencyError`] - 错误分类
//!
//! ## 设计原则
//!
//! - 键不可变且可哈希，唯一性为 (类型, 限定符)
//! - 配置错误在注册期快速失败，而不是推迟到首次使用
//! - 所有失败都不可重试：没有部分装配的上下文会产生可用的提供者

pub mod errors;
pub mod key;
pub mod lifetime;

pub use errors::*;
pub use key::*;
pub use lifetime::*;
