//! 上下文解析器
//!
//! 持有占位重写映射，并在父环境可用时恰好一次地物化派生的子
//! 解析环境。物化之后解析器不再发生任何变更。

use crate::mapper::{map_placeholders, EdgeMap};
use crate::scanner::scan;
use di_abstractions::{provider_for, BindingOverride, DependencyProvider, Environment, Injectable};
use di_common::{
    BindingKey, ContextTag, DependencyError, DependencyResult, Lifetime, RegistrationResult,
};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

const STATE_UNINITIALIZED: u8 = 0;
const STATE_MATERIALIZING: u8 = 1;
const STATE_READY: u8 = 2;
const STATE_FAILED: u8 = 3;

/// 解析器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    /// 未初始化 - 尚未获得父环境
    Uninitialized,
    /// 物化中 - 正在构建子环境
    Materializing,
    /// 就绪 - 子环境已构建完成（终态）
    Ready,
    /// 已失败 - 物化失败（终态，不可重试）
    Failed,
}

/// 上下文解析器
///
/// 在注册期创建：扫描与占位映射在构造时同步完成，配置错误
/// 当场暴露。图终结期由注册表显式驱动 [`Self::materialize`]，
/// 恰好一次地构建子环境：
///
/// 1. 把实现类型绑定为可直接构造；
/// 2. 对每条边 (源, 目标)，先断言父环境中已存在目标键的绑定，
///    缺失则在产生任何实例之前报缺失绑定错误；
/// 3. 在子环境中把源键委托到目标键。
pub struct ContextualResolver {
    /// 实现类型在子环境中的绑定键
    key: BindingKey,
    provider: Arc<dyn DependencyProvider>,
    lifetime: Lifetime,
    tag: ContextTag,
    edges: EdgeMap,
    child: OnceCell<Arc<dyn Environment>>,
    state: AtomicU8,
    materialize_lock: Mutex<()>,
}

impl ContextualResolver {
    /// 为可注入类型与上下文标签创建解析器
    pub fn for_component<T: Injectable>(
        tag: ContextTag,
        lifetime: Lifetime,
    ) -> RegistrationResult<Self> {
        let deps = scan::<T>()?;
        let edges = map_placeholders(&deps, &tag)?;
        debug!(
            "创建上下文解析器: {} (上下文: {}, 重写边 {} 条)",
            deps.type_info(),
            tag,
            edges.len()
        );

        Ok(Self {
            key: BindingKey::of::<T>(),
            provider: provider_for::<T>(),
            lifetime,
            tag,
            edges,
            child: OnceCell::new(),
            state: AtomicU8::new(STATE_UNINITIALIZED),
            materialize_lock: Mutex::new(()),
        })
    }

    /// 实现类型的绑定键
    pub fn key(&self) -> &BindingKey {
        &self.key
    }

    /// 上下文标签
    pub fn context(&self) -> &ContextTag {
        &self.tag
    }

    /// 重写后的依赖键集合（声明顺序）
    pub fn rewritten_keys(&self) -> Vec<BindingKey> {
        self.edges.rewritten_keys()
    }

    /// 当前状态
    pub fn state(&self) -> ResolverState {
        match self.state.load(Ordering::Acquire) {
            STATE_READY => ResolverState::Ready,
            STATE_MATERIALIZING => ResolverState::Materializing,
            STATE_FAILED => ResolverState::Failed,
            _ => ResolverState::Uninitialized,
        }
    }

    /// 物化子解析环境
    ///
    /// 恰好一次：并发触发时仅首个调用方执行构建，其余调用方
    /// 等待并观察到同一个子环境。任何重写键在父环境中缺失绑定
    /// 都会让物化失败；失败是终态，后续的物化尝试直接报错，
    /// 不会重试。
    pub fn materialize(&self, parent: Arc<dyn Environment>) -> DependencyResult<()> {
        if self.child.get().is_some() {
            return Ok(());
        }
        if self.state.load(Ordering::Acquire) == STATE_FAILED {
            return Err(self.failed_error());
        }

        let _guard = self.materialize_lock.lock();
        if self.child.get().is_some() {
            // 竞争线程已完成物化
            return Ok(());
        }
        if self.state.load(Ordering::Acquire) == STATE_FAILED {
            return Err(self.failed_error());
        }

        self.state.store(STATE_MATERIALIZING, Ordering::Release);
        match self.build_child(parent) {
            Ok(child) => {
                // 锁内恰好设置一次
                let _ = self.child.set(child);
                self.state.store(STATE_READY, Ordering::Release);
                info!("子环境物化完成: {} (上下文: {})", self.key, self.tag);
                Ok(())
            }
            Err(e) => {
                self.state.store(STATE_FAILED, Ordering::Release);
                Err(e)
            }
        }
    }

    fn failed_error(&self) -> DependencyError {
        DependencyError::ResolverFailed {
            key: self.key.to_string(),
            context: self.tag.to_string(),
        }
    }

    /// 校验全部重写键后派生子环境
    fn build_child(&self, parent: Arc<dyn Environment>) -> DependencyResult<Arc<dyn Environment>> {
        // 在产生任何实例之前校验每个重写键在父环境中可解析
        for (_, target) in self.edges.iter() {
            if !parent.lookup_existing(target) {
                return Err(DependencyError::binding_not_found(target));
            }
        }

        let mut overrides = Vec::with_capacity(self.edges.len() + 1);
        overrides.push(BindingOverride::Provider {
            key: self.key.clone(),
            provider: Arc::clone(&self.provider),
            lifetime: self.lifetime,
        });
        for (source, target) in self.edges.iter() {
            overrides.push(BindingOverride::Alias {
                key: source.clone(),
                target: target.clone(),
            });
        }

        Ok(parent.derive(overrides))
    }

    /// 已物化的子环境
    ///
    /// 在未初始化状态下查询属于装配顺序缺陷：注册表没有在首次
    /// 使用前提供父环境。物化失败后查询报终态失败错误。两类
    /// 错误都致命且不可重试。
    pub fn child(&self) -> DependencyResult<&Arc<dyn Environment>> {
        self.child.get().ok_or_else(|| {
            if self.state.load(Ordering::Acquire) == STATE_FAILED {
                self.failed_error()
            } else {
                DependencyError::ResolverNotReady {
                    key: self.key.to_string(),
                    context: self.tag.to_string(),
                }
            }
        })
    }
}
