//! 错误类型定义

use thiserror::Error;

/// 注册期配置错误类型
///
/// 在扫描/注册阶段抛出，对启动是致命的，不会重试。
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("组件注入计划无效: {type_name}, 原因: {message}")]
    InvalidPlan { type_name: String, message: String },

    #[error("注入点重复声明: {type_name} 中的成员 {member}")]
    DuplicateInjectionPoint { type_name: String, member: String },

    #[error("占位键 {source_key} 的重写目标冲突: 已有 {existing}, 新增 {conflicting}")]
    ConflictingEdgeTargets {
        source_key: String,
        existing: String,
        conflicting: String,
    },

    #[error("绑定键重复注册: {key}")]
    DuplicateBinding { key: String },
}

/// 依赖解析错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("没有可用绑定: {key}")]
    BindingNotFound { key: String },

    #[error("组件构造失败: {type_name}, 原因: {source}")]
    ConstructionFailed {
        type_name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("解析结果类型不匹配: {key}, 期望 {expected}")]
    TypeMismatch { key: String, expected: String },

    #[error("上下文解析器尚未物化: {key} (上下文: {context})")]
    ResolverNotReady { key: String, context: String },

    #[error("上下文解析器物化已失败, 不可重试: {key} (上下文: {context})")]
    ResolverFailed { key: String, context: String },
}

impl DependencyError {
    /// 创建缺失绑定错误
    pub fn binding_not_found(key: impl ToString) -> Self {
        Self::BindingNotFound {
            key: key.to_string(),
        }
    }

    /// 创建构造失败错误
    pub fn construction_failed(
        type_name: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConstructionFailed {
            type_name: type_name.into(),
            source: Box::new(source),
        }
    }
}

/// 注入基础设施统一错误类型
#[derive(Error, Debug)]
pub enum InjectionError {
    #[error("注册错误: {source}")]
    Registration {
        #[from]
        source: RegistrationError,
    },

    #[error("依赖解析错误: {source}")]
    Dependency {
        #[from]
        source: DependencyError,
    },
}

/// 结果类型别名
pub type RegistrationResult<T> = Result<T, RegistrationError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type InjectionResult<T> = Result<T, InjectionError>;
