//! 依赖提供者能力接口
//!
//! 把工厂适配为依赖感知的提供者。声明的依赖集合在包装时检查
//! 一次：集合为空走零依赖快速路径，否则走依赖解析路径。两种
//! 路径是同一能力接口下的两个具体变体，而不是运行时分支。

use crate::environment::Environment;
use crate::injectable::{Injectable, InjectionPlan, ResolvedDependencies};
use di_common::{BindingKey, DependencyResult, TypeInfo};
use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// 依赖提供者 trait
///
/// 环境中一个绑定的构造单元。提供者同时上报其声明的依赖键
/// 集合，供整图校验在运行前发现缺失绑定。
pub trait DependencyProvider: Send + Sync {
    /// 在给定环境中提供一个实例
    fn provide(&self, env: &dyn Environment) -> DependencyResult<Arc<dyn Any + Send + Sync>>;

    /// 声明的依赖键集合
    fn dependencies(&self) -> &[BindingKey];

    /// 提供的类型信息
    fn provided_type(&self) -> &TypeInfo;
}

/// 无依赖工厂提供者
///
/// 零依赖快速路径，构造时忽略解析环境。
pub struct FactoryProvider<T> {
    type_info: TypeInfo,
    factory: Box<dyn Fn() -> DependencyResult<T> + Send + Sync>,
}

impl<T: Send + Sync + 'static> FactoryProvider<T> {
    /// 包装一个无依赖工厂
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> DependencyResult<T> + Send + Sync + 'static,
    {
        Self {
            type_info: TypeInfo::of::<T>(),
            factory: Box::new(factory),
        }
    }
}

impl<T: Send + Sync + 'static> DependencyProvider for FactoryProvider<T> {
    fn provide(&self, _env: &dyn Environment) -> DependencyResult<Arc<dyn Any + Send + Sync>> {
        let value = (self.factory)()?;
        Ok(Arc::new(value))
    }

    fn dependencies(&self) -> &[BindingKey] {
        &[]
    }

    fn provided_type(&self) -> &TypeInfo {
        &self.type_info
    }
}

/// 依赖感知提供者
///
/// 按注入计划在环境中解析全部声明键，再组装实例。
pub struct InjectingProvider<T: Injectable> {
    plan: InjectionPlan,
    /// 去重后的声明键，保持声明顺序
    keys: Vec<BindingKey>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Injectable> InjectingProvider<T> {
    /// 由注入计划创建提供者
    pub fn new(plan: InjectionPlan) -> Self {
        let mut keys: Vec<BindingKey> = Vec::with_capacity(plan.points().len());
        for point in plan.points() {
            if !keys.contains(&point.key) {
                keys.push(point.key.clone());
            }
        }

        Self {
            plan,
            keys,
            _marker: PhantomData,
        }
    }
}

impl<T: Injectable> DependencyProvider for InjectingProvider<T> {
    fn provide(&self, env: &dyn Environment) -> DependencyResult<Arc<dyn Any + Send + Sync>> {
        let mut resolved = ResolvedDependencies::new();
        for key in &self.keys {
            resolved.insert(key.clone(), env.construct(key)?);
        }

        let value = T::assemble(&resolved)?;
        Ok(Arc::new(value))
    }

    fn dependencies(&self) -> &[BindingKey] {
        &self.keys
    }

    fn provided_type(&self) -> &TypeInfo {
        self.plan.type_info()
    }
}

/// 将可注入类型适配为依赖提供者
///
/// 对声明依赖集合检查一次：为空则使用零依赖快速路径，
/// 否则使用依赖解析路径。
pub fn provider_for<T: Injectable>() -> Arc<dyn DependencyProvider> {
    let plan = T::injection_plan();
    if plan.is_empty() {
        debug!("包装零依赖提供者: {}", plan.type_info());
        Arc::new(FactoryProvider::new(|| {
            T::assemble(&ResolvedDependencies::new())
        }))
    } else {
        debug!("包装依赖感知提供者: {} ({} 个注入点)", plan.type_info(), plan.points().len());
        Arc::new(InjectingProvider::<T>::new(plan))
    }
}
