//! 注入点扫描器
//!
//! 基于显式注入计划发现实现类型的依赖声明集合。扫描是确定性
//! 且无副作用的；计划本身的结构问题在注册期立即报错，而不是
//! 推迟到首次使用。

use di_abstractions::{Injectable, InjectionPlan};
use di_common::{BindingKey, RegistrationError, RegistrationResult, TypeInfo};
use std::collections::HashSet;

/// 依赖声明集合
///
/// 扫描产物：按声明顺序去重后的绑定键集合，不可变。
#[derive(Debug, Clone)]
pub struct DependencySet {
    type_info: TypeInfo,
    keys: Vec<BindingKey>,
}

impl DependencySet {
    /// 所属实现类型的类型信息
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 声明的绑定键（声明顺序，重复键已合并）
    pub fn keys(&self) -> &[BindingKey] {
        &self.keys
    }
}

/// 扫描可注入类型的依赖声明
///
/// 同一键出现在多个注入点时合并为一条声明。
pub fn scan<T: Injectable>() -> RegistrationResult<DependencySet> {
    let plan = T::injection_plan();
    validate_plan::<T>(&plan)?;

    let mut keys: Vec<BindingKey> = Vec::with_capacity(plan.points().len());
    for point in plan.points() {
        if !keys.contains(&point.key) {
            keys.push(point.key.clone());
        }
    }

    Ok(DependencySet {
        type_info: plan.type_info().clone(),
        keys,
    })
}

/// 校验注入计划的结构合法性
fn validate_plan<T: Injectable>(plan: &InjectionPlan) -> RegistrationResult<()> {
    let expected = TypeInfo::of::<T>();
    if plan.type_info() != &expected {
        return Err(RegistrationError::InvalidPlan {
            type_name: expected.full_path.to_string(),
            message: format!("注入计划声明的类型为 {}", plan.type_info().full_path),
        });
    }

    let mut members = HashSet::new();
    for point in plan.points() {
        if point.member.is_empty() {
            return Err(RegistrationError::InvalidPlan {
                type_name: expected.full_path.to_string(),
                message: "注入点成员名称为空".to_string(),
            });
        }
        if !members.insert(point.member) {
            return Err(RegistrationError::DuplicateInjectionPoint {
                type_name: expected.full_path.to_string(),
                member: point.member.to_string(),
            });
        }
    }

    Ok(())
}
