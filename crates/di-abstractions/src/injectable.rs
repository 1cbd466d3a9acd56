//! 注入声明描述符
//!
//! 以显式描述符替代运行时反射：实现类型通过 [`InjectionPlan`]
//! 列出其构造路径上的全部依赖声明，映射器与提供者只在该描述符
//! 之上工作，不做任何运行时元数据扫描。

use di_common::{BindingKey, DependencyError, DependencyResult, TypeInfo};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 注入点
///
/// 构造路径上的一个依赖声明：成员名称加声明的绑定键。
#[derive(Debug, Clone)]
pub struct InjectionPoint {
    /// 成员名称
    pub member: &'static str,
    /// 声明的绑定键
    pub key: BindingKey,
}

/// 注入计划
///
/// 实现类型的完整依赖声明集合，按声明顺序排列。
/// 计划一经构建不可变更。
#[derive(Debug, Clone)]
pub struct InjectionPlan {
    type_info: TypeInfo,
    points: Vec<InjectionPoint>,
}

impl InjectionPlan {
    /// 为指定类型创建注入计划构建器
    pub fn for_type<T: 'static>() -> InjectionPlanBuilder {
        InjectionPlanBuilder {
            type_info: TypeInfo::of::<T>(),
            points: Vec::new(),
        }
    }

    /// 计划所属的类型信息
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 全部注入点（声明顺序）
    pub fn points(&self) -> &[InjectionPoint] {
        &self.points
    }

    /// 是否没有任何依赖声明
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// 注入计划构建器
#[derive(Debug)]
pub struct InjectionPlanBuilder {
    type_info: TypeInfo,
    points: Vec<InjectionPoint>,
}

impl InjectionPlanBuilder {
    /// 添加依赖声明
    pub fn with_dependency(mut self, member: &'static str, key: BindingKey) -> Self {
        self.points.push(InjectionPoint { member, key });
        self
    }

    /// 完成构建
    pub fn build(self) -> InjectionPlan {
        InjectionPlan {
            type_info: self.type_info,
            points: self.points,
        }
    }
}

/// 已解析依赖集合
///
/// 以声明键为索引存放解析结果，供 [`Injectable::assemble`] 取用。
#[derive(Default)]
pub struct ResolvedDependencies {
    values: HashMap<BindingKey, Arc<dyn Any + Send + Sync>>,
}

impl ResolvedDependencies {
    /// 创建空集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 存入一个解析结果
    pub fn insert(&mut self, key: BindingKey, value: Arc<dyn Any + Send + Sync>) {
        self.values.insert(key, value);
    }

    /// 按声明键取出指定类型的依赖
    pub fn get<T: Send + Sync + 'static>(&self, key: &BindingKey) -> DependencyResult<Arc<T>> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| DependencyError::binding_not_found(key))?;

        Arc::clone(value)
            .downcast::<T>()
            .map_err(|_| DependencyError::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<T>().to_string(),
            })
    }

    /// 已存入的解析结果数量
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for ResolvedDependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedDependencies")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// 可注入组件 trait
///
/// 支持上下文注入的组件必须实现此 trait，显式声明其构造路径上的
/// 全部依赖。声明必须是确定性且无副作用的。
pub trait Injectable: Send + Sync + 'static {
    /// 返回本类型的注入计划
    fn injection_plan() -> InjectionPlan;

    /// 使用已解析的依赖组装组件实例
    fn assemble(deps: &ResolvedDependencies) -> DependencyResult<Self>
    where
        Self: Sized;
}
