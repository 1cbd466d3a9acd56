//! 作用域提供者
//!
//! 对外暴露的 (组件类型, 上下文标签) 构造句柄。除解析器引用外
//! 无状态，每个注册对应一个实例。

use crate::resolver::{ContextualResolver, ResolverState};
use di_abstractions::{DependencyProvider, Environment, EnvironmentExt, Injectable};
use di_common::{BindingKey, ContextTag, DependencyResult, TypeInfo};
use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

/// 作用域提供者
///
/// [`Self::get`] 把构造委托给解析器已就绪的子环境，底层构造
/// 失败原样向上传播，不包装也不吞掉。重写后的依赖键集合作为
/// 元数据上报，供整图校验在运行前发现缺失绑定。
pub struct ScopedProvider<T> {
    resolver: Arc<ContextualResolver>,
    /// 重写后的依赖键，注册时计算一次
    rewritten: Vec<BindingKey>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ScopedProvider<T> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            rewritten: self.rewritten.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Injectable> ScopedProvider<T> {
    /// 由解析器创建提供者句柄
    pub fn new(resolver: Arc<ContextualResolver>) -> Self {
        let rewritten = resolver.rewritten_keys();
        Self {
            resolver,
            rewritten,
            _marker: PhantomData,
        }
    }

    /// 构造一个完整装配的实例
    pub fn get(&self) -> DependencyResult<Arc<T>> {
        let child = self.resolver.child()?;
        child.construct_as::<T>(self.resolver.key())
    }

    /// 上下文标签
    pub fn context(&self) -> &ContextTag {
        self.resolver.context()
    }

    /// 解析器当前状态
    pub fn state(&self) -> ResolverState {
        self.resolver.state()
    }

    /// 底层解析器
    pub fn resolver(&self) -> &Arc<ContextualResolver> {
        &self.resolver
    }
}

impl<T: Injectable> DependencyProvider for ScopedProvider<T> {
    /// 注册表把本提供者安装为 (类型, 标签) 键的绑定。
    /// 构造始终走解析器的子环境，忽略传入的环境。
    fn provide(&self, _env: &dyn Environment) -> DependencyResult<Arc<dyn Any + Send + Sync>> {
        let child = self.resolver.child()?;
        child.construct(self.resolver.key())
    }

    fn dependencies(&self) -> &[BindingKey] {
        &self.rewritten
    }

    fn provided_type(&self) -> &TypeInfo {
        self.resolver.key().type_info()
    }
}
