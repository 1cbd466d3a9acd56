//! # DI Implementation
//!
//! 提供承载上下文解析层的具体绑定注册表与解析环境实现。
//!
//! 装配遵循显式的两阶段协议：[`RegistryBuilder`] 累积全部绑定
//! 与上下文注册，[`RegistryBuilder::build`] 是唯一的图终结点，
//! 冻结绑定表并驱动所有待定的上下文解析器完成物化。终结之后
//! 绑定表不可变，并发解析无需额外同步。

use di_abstractions::{
    provider_for, BindingOverride, DependencyProvider, Environment, FactoryProvider, Injectable,
};
use di_common::{
    BindingKey, ContextTag, DependencyError, DependencyResult, InjectionResult, Lifetime,
    RegistrationError, RegistrationResult,
};
use di_contextual::{ContextualResolver, ScopedProvider};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 绑定来源
enum BindingSource {
    /// 预先提供的单例实例
    Instance(Arc<dyn Any + Send + Sync>),
    /// 依赖提供者
    Provider(Arc<dyn DependencyProvider>),
    /// 委托到另一个键
    Alias(BindingKey),
}

/// 一条绑定注册信息
struct BindingEntry {
    source: BindingSource,
    lifetime: Lifetime,
    /// 单例缓存，恰好一次创建
    singleton: OnceCell<Arc<dyn Any + Send + Sync>>,
}

impl BindingEntry {
    fn new(source: BindingSource, lifetime: Lifetime) -> Self {
        Self {
            source,
            lifetime,
            singleton: OnceCell::new(),
        }
    }
}

/// 绑定注册表
///
/// [`Environment`] 的具体实现。解析先查本环境再沿父链回退；
/// 绑定由其所属环境构造，因而父环境中的单例被所有子环境按
/// 引用共享，而子环境中的覆盖绑定互不可见。
pub struct BindingRegistry {
    parent: Option<Arc<dyn Environment>>,
    bindings: HashMap<BindingKey, BindingEntry>,
}

impl BindingRegistry {
    /// 已注册的绑定数量（不含父环境）
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    fn construct_local(&self, entry: &BindingEntry) -> DependencyResult<Arc<dyn Any + Send + Sync>> {
        match &entry.source {
            BindingSource::Instance(value) => Ok(Arc::clone(value)),
            BindingSource::Alias(target) => self.construct(target),
            BindingSource::Provider(provider) => match entry.lifetime {
                Lifetime::Singleton => entry
                    .singleton
                    .get_or_try_init(|| provider.provide(self))
                    .map(Arc::clone),
                Lifetime::Transient => provider.provide(self),
            },
        }
    }
}

impl fmt::Debug for BindingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingRegistry")
            .field("bindings", &self.bindings.keys().collect::<Vec<_>>())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

impl Environment for BindingRegistry {
    fn lookup_existing(&self, key: &BindingKey) -> bool {
        if self.bindings.contains_key(key) {
            return true;
        }
        self.parent
            .as_ref()
            .map_or(false, |parent| parent.lookup_existing(key))
    }

    fn derive(self: Arc<Self>, overrides: Vec<BindingOverride>) -> Arc<dyn Environment> {
        let mut bindings = HashMap::with_capacity(overrides.len());
        for binding_override in overrides {
            let (key, entry) = match binding_override {
                BindingOverride::Provider {
                    key,
                    provider,
                    lifetime,
                } => (key, BindingEntry::new(BindingSource::Provider(provider), lifetime)),
                BindingOverride::Alias { key, target } => {
                    (key, BindingEntry::new(BindingSource::Alias(target), Lifetime::Transient))
                }
            };
            if bindings.insert(key.clone(), entry).is_some() {
                warn!("派生覆盖中的重复键, 后写覆盖先写: {}", key);
            }
        }

        debug!("派生子环境, 覆盖绑定 {} 条", bindings.len());
        let parent: Arc<dyn Environment> = self;
        Arc::new(Self {
            parent: Some(parent),
            bindings,
        })
    }

    fn construct(&self, key: &BindingKey) -> DependencyResult<Arc<dyn Any + Send + Sync>> {
        if let Some(entry) = self.bindings.get(key) {
            self.construct_local(entry)
        } else if let Some(parent) = &self.parent {
            parent.construct(key)
        } else {
            Err(DependencyError::binding_not_found(key))
        }
    }
}

/// 待终结的上下文注册
struct PendingContextual {
    resolver: Arc<ContextualResolver>,
}

/// 注册表构建器
///
/// 两阶段协议的第一阶段。所有 `bind_*` 方法在注册期立即暴露
/// 配置错误；[`Self::build`] 冻结绑定表并物化全部待定的上下文
/// 解析器，任何重写键缺失绑定都会让构建失败，不会产生任何可用
/// 的提供者。
pub struct RegistryBuilder {
    bindings: HashMap<BindingKey, BindingEntry>,
    pending: Vec<PendingContextual>,
}

impl RegistryBuilder {
    /// 创建空构建器
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            pending: Vec::new(),
        }
    }

    fn insert(&mut self, key: BindingKey, entry: BindingEntry) -> RegistrationResult<()> {
        if self.bindings.contains_key(&key) {
            return Err(RegistrationError::DuplicateBinding {
                key: key.to_string(),
            });
        }
        self.bindings.insert(key, entry);
        Ok(())
    }

    /// 以默认键注册进程级单例实例
    pub fn bind_instance<T: Send + Sync + 'static>(
        &mut self,
        instance: T,
    ) -> RegistrationResult<&mut Self> {
        self.bind_instance_with_key(BindingKey::of::<T>(), instance)
    }

    /// 以显式键注册进程级单例实例
    pub fn bind_instance_with_key<T: Send + Sync + 'static>(
        &mut self,
        key: BindingKey,
        instance: T,
    ) -> RegistrationResult<&mut Self> {
        info!("注册单例实例: {}", key);
        self.insert(
            key,
            BindingEntry::new(BindingSource::Instance(Arc::new(instance)), Lifetime::Singleton),
        )?;
        Ok(self)
    }

    /// 以无依赖工厂注册绑定
    pub fn bind_factory<T, F>(
        &mut self,
        key: BindingKey,
        lifetime: Lifetime,
        factory: F,
    ) -> RegistrationResult<&mut Self>
    where
        T: Send + Sync + 'static,
        F: Fn() -> DependencyResult<T> + Send + Sync + 'static,
    {
        info!("注册工厂绑定: {} ({:?})", key, lifetime);
        self.insert(
            key,
            BindingEntry::new(
                BindingSource::Provider(Arc::new(FactoryProvider::new(factory))),
                lifetime,
            ),
        )?;
        Ok(self)
    }

    /// 按注入计划注册可注入组件
    pub fn bind_injectable<T: Injectable>(
        &mut self,
        lifetime: Lifetime,
    ) -> RegistrationResult<&mut Self> {
        let key = BindingKey::of::<T>();
        info!("注册可注入组件: {} ({:?})", key, lifetime);
        self.insert(
            key,
            BindingEntry::new(BindingSource::Provider(provider_for::<T>()), lifetime),
        )?;
        Ok(self)
    }

    /// 注册上下文组件（默认瞬时生命周期）
    pub fn bind_contextual<T: Injectable>(
        &mut self,
        tag: ContextTag,
    ) -> RegistrationResult<ScopedProvider<T>> {
        self.bind_contextual_in(tag, Lifetime::Transient)
    }

    /// 注册上下文组件并指定生命周期
    ///
    /// 扫描与占位映射立即执行，配置错误当场暴露。返回的句柄在
    /// [`Self::build`] 终结图之前处于未就绪状态；同时把提供者
    /// 安装为 (类型, 标签) 键的绑定，供其他组件按标签键依赖。
    pub fn bind_contextual_in<T: Injectable>(
        &mut self,
        tag: ContextTag,
        lifetime: Lifetime,
    ) -> RegistrationResult<ScopedProvider<T>> {
        let resolver = Arc::new(ContextualResolver::for_component::<T>(tag.clone(), lifetime)?);
        let handle = ScopedProvider::<T>::new(Arc::clone(&resolver));

        let tagged = BindingKey::tagged::<T>(tag.clone());
        info!("注册上下文组件: {} (上下文: {})", tagged, tag);
        self.insert(
            tagged,
            BindingEntry::new(
                BindingSource::Provider(Arc::new(handle.clone())),
                Lifetime::Transient,
            ),
        )?;

        self.pending.push(PendingContextual { resolver });
        Ok(handle)
    }

    /// 终结图并构建注册表
    pub fn build(self) -> InjectionResult<Arc<BindingRegistry>> {
        let registry = Arc::new(BindingRegistry {
            parent: None,
            bindings: self.bindings,
        });
        info!(
            "绑定表冻结完成: {} 条绑定, {} 个待物化的上下文解析器",
            registry.binding_count(),
            self.pending.len()
        );

        let env: Arc<dyn Environment> = Arc::clone(&registry) as Arc<dyn Environment>;
        for pending in &self.pending {
            pending.resolver.materialize(Arc::clone(&env))?;
        }

        Ok(registry)
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("bindings", &self.bindings.keys().collect::<Vec<_>>())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
