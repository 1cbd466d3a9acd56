//! 占位限定符映射器
//!
//! 把依赖声明集合中带占位限定符的键重写为指定上下文标签下的
//! 键。映射在注册期一次性计算，之后不再变更；不带占位限定符
//! 的声明被忽略，落回常规注册表解析并在所有上下文间共享。

use crate::scanner::DependencySet;
use di_common::{BindingKey, ContextTag, RegistrationError, RegistrationResult};
use std::collections::HashMap;

/// 依赖边映射
///
/// 从占位限定键（源）到重写后带上下文标签键（目标）的不可变
/// 映射。重写后的键集合同时作为向上汇报的声明依赖面，供整图
/// 校验在运行前发现缺失绑定。
#[derive(Debug, Clone, Default)]
pub struct EdgeMap {
    edges: HashMap<BindingKey, BindingKey>,
    /// 源键的声明顺序
    order: Vec<BindingKey>,
}

impl EdgeMap {
    /// 创建空映射
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入一条边
    ///
    /// 完全相同的重复边直接合并；同一源键出现不同目标键是配置错误。
    pub fn insert(&mut self, source: BindingKey, target: BindingKey) -> RegistrationResult<()> {
        if let Some(existing) = self.edges.get(&source) {
            if existing != &target {
                return Err(RegistrationError::ConflictingEdgeTargets {
                    source_key: source.to_string(),
                    existing: existing.to_string(),
                    conflicting: target.to_string(),
                });
            }
            return Ok(());
        }

        self.order.push(source.clone());
        self.edges.insert(source, target);
        Ok(())
    }

    /// 边的数量
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 按声明顺序遍历全部 (源键, 目标键)
    pub fn iter(&self) -> impl Iterator<Item = (&BindingKey, &BindingKey)> {
        self.order.iter().map(move |source| (source, &self.edges[source]))
    }

    /// 重写后的键集合（声明顺序）
    pub fn rewritten_keys(&self) -> Vec<BindingKey> {
        self.order.iter().map(|source| self.edges[source].clone()).collect()
    }
}

/// 为指定上下文标签计算占位依赖的重写映射
pub fn map_placeholders(deps: &DependencySet, tag: &ContextTag) -> RegistrationResult<EdgeMap> {
    let mut edges = EdgeMap::new();
    for key in deps.keys() {
        if key.is_placeholder() {
            edges.insert(key.clone(), key.retag(tag))?;
        }
    }
    Ok(edges)
}
