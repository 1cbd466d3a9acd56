//! 解析环境抽象接口
//!
//! 环境是从绑定键到具体绑定的解析作用域，可从父环境派生。
//! 派生时的覆盖可以把一个键委托给经由父环境解析的另一个键。

use crate::provider::DependencyProvider;
use di_common::{BindingKey, DependencyError, DependencyResult, Lifetime};
use std::any::Any;
use std::sync::Arc;

/// 派生子环境时的绑定覆盖
#[derive(Clone)]
pub enum BindingOverride {
    /// 以提供者绑定一个键
    Provider {
        /// 绑定键
        key: BindingKey,
        /// 依赖提供者
        provider: Arc<dyn DependencyProvider>,
        /// 生命周期
        lifetime: Lifetime,
    },
    /// 将一个键委托到另一个键
    Alias {
        /// 绑定键
        key: BindingKey,
        /// 委托目标键
        target: BindingKey,
    },
}

/// 解析环境 trait
pub trait Environment: Send + Sync + std::fmt::Debug {
    /// 非抛错的绑定存在性检查，沿父链查找
    fn lookup_existing(&self, key: &BindingKey) -> bool;

    /// 派生子环境，将给定覆盖叠加在本环境之上
    fn derive(self: Arc<Self>, overrides: Vec<BindingOverride>) -> Arc<dyn Environment>;

    /// 按键构造实例，遵循绑定注册时配置的生命周期
    fn construct(&self, key: &BindingKey) -> DependencyResult<Arc<dyn Any + Send + Sync>>;
}

/// 环境扩展方法
pub trait EnvironmentExt {
    /// 按键构造并向下转型为具体类型
    fn construct_as<T: Send + Sync + 'static>(&self, key: &BindingKey) -> DependencyResult<Arc<T>>;
}

impl<E: Environment + ?Sized> EnvironmentExt for E {
    fn construct_as<T: Send + Sync + 'static>(&self, key: &BindingKey) -> DependencyResult<Arc<T>> {
        self.construct(key)?
            .downcast::<T>()
            .map_err(|_| DependencyError::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<T>().to_string(),
            })
    }
}
