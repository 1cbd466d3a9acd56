//! 组件生命周期类型

/// 组件生命周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// 单例模式 - 在所属环境内恰好创建一个实例，被所有子环境按引用共享
    Singleton,
    /// 瞬时模式 - 每次解析都创建新实例
    Transient,
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::Transient
    }
}
