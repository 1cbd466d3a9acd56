//! 绑定键定义
//!
//! 提供类型信息、限定符与绑定键的不可变表示

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

/// 类型信息
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 类型名称（不含模块路径）
    pub name: &'static str,
    /// 类型ID
    pub id: TypeId,
    /// 完整类型路径
    pub full_path: &'static str,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: 'static>() -> Self {
        let full_path = std::any::type_name::<T>();
        Self {
            name: full_path.rsplit("::").next().unwrap_or(full_path),
            id: TypeId::of::<T>(),
            full_path,
        }
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// 上下文标签
///
/// 标识组件图的一个变体（实例化上下文）。标签由注册方显式提供，
/// 从不推断。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextTag(Arc<str>);

impl ContextTag {
    /// 创建新的上下文标签
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// 标签名称
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContextTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// 绑定限定符
///
/// 区分同一类型的多个绑定。[`Qualifier::Placeholder`] 是唯一的
/// 占位限定符，表示"使用当前上下文标签解析"而非固定绑定。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Qualifier {
    /// 默认绑定（无限定符）
    Default,
    /// 占位限定符
    Placeholder,
    /// 上下文标签限定符
    Tag(ContextTag),
}

/// 绑定键
///
/// 由类型信息和限定符组成，唯一标识一个可解析的绑定。
/// 键是不可变且可哈希的，唯一性为 (类型, 限定符)。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingKey {
    type_info: TypeInfo,
    qualifier: Qualifier,
}

impl BindingKey {
    /// 创建无限定符的绑定键
    pub fn of<T: 'static>() -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            qualifier: Qualifier::Default,
        }
    }

    /// 创建占位限定的绑定键
    pub fn placeholder<T: 'static>() -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            qualifier: Qualifier::Placeholder,
        }
    }

    /// 创建上下文标签限定的绑定键
    pub fn tagged<T: 'static>(tag: ContextTag) -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            qualifier: Qualifier::Tag(tag),
        }
    }

    /// 类型信息
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 限定符
    pub fn qualifier(&self) -> &Qualifier {
        &self.qualifier
    }

    /// 是否带占位限定符
    pub fn is_placeholder(&self) -> bool {
        self.qualifier == Qualifier::Placeholder
    }

    /// 将键重写为指定上下文标签下的键，类型保持不变
    pub fn retag(&self, tag: &ContextTag) -> Self {
        Self {
            type_info: self.type_info.clone(),
            qualifier: Qualifier::Tag(tag.clone()),
        }
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Qualifier::Default => write!(f, "{}", self.type_info),
            Qualifier::Placeholder => write!(f, "{}@placeholder", self.type_info),
            Qualifier::Tag(tag) => write!(f, "{}@{}", self.type_info, tag),
        }
    }
}
