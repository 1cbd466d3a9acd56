//! # DI Contextual
//!
//! 上下文作用域依赖解析层，解决"菱形/机器人腿"问题：同一实现
//! 类型在不同上下文下多次实例化时，带占位限定符的依赖按上下文
//! 重写到各自的具体绑定，而占位机制之外的依赖（如进程级单例）
//! 仍由公共父环境共享。
//!
//! ## 数据流向
//!
//! - 装配期：扫描器 → 映射器 → 解析器 → 提供者
//! - 请求期：调用方 → 提供者 → 子环境 → 实例
//!
//! ## 核心组件
//!
//! - [`scan`] / [`DependencySet`] - 注入点扫描器
//! - [`map_placeholders`] / [`EdgeMap`] - 占位限定符映射器
//! - [`ContextualResolver`] - 上下文解析器（恰好一次物化子环境）
//! - [`ScopedProvider`] - 对外暴露的作用域提供者

pub mod mapper;
pub mod provider;
pub mod resolver;
pub mod scanner;

pub use mapper::*;
pub use provider::*;
pub use resolver::*;
pub use scanner::*;
