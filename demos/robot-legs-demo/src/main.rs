//! # "机器人腿"问题演示
//!
//! 同一个 `Leg` 实现类型在 left/right 两个上下文下各实例化一次：
//! 占位限定的 `Foot` 依赖按上下文重写到各自的具体绑定，
//! 而共享的 `Chassis` 单例在两条腿之间按引用共享。

use di_abstractions::{Injectable, InjectionPlan, ResolvedDependencies};
use di_common::{BindingKey, ContextTag, DependencyResult};
use di_impl::RegistryBuilder;
use std::sync::Arc;
use tracing::info;

/// 脚部组件，每个上下文一个具体绑定
#[derive(Debug)]
struct Foot {
    side: &'static str,
}

/// 底盘组件，进程级单例
#[derive(Debug)]
struct Chassis {
    serial: u32,
}

/// 腿部组件: 占位限定的脚 + 共享底盘
#[derive(Debug)]
struct Leg {
    foot: Arc<Foot>,
    chassis: Arc<Chassis>,
}

impl Injectable for Leg {
    fn injection_plan() -> InjectionPlan {
        InjectionPlan::for_type::<Leg>()
            .with_dependency("foot", BindingKey::placeholder::<Foot>())
            .with_dependency("chassis", BindingKey::of::<Chassis>())
            .build()
    }

    fn assemble(deps: &ResolvedDependencies) -> DependencyResult<Self> {
        Ok(Self {
            foot: deps.get(&BindingKey::placeholder::<Foot>())?,
            chassis: deps.get(&BindingKey::of::<Chassis>())?,
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志
    tracing_subscriber::fmt().with_env_filter("info").init();

    info!("🚀 机器人腿演示程序启动");

    let left = ContextTag::new("left");
    let right = ContextTag::new("right");

    // 第一阶段: 注册全部绑定与上下文组件
    let mut builder = RegistryBuilder::new();
    builder.bind_instance_with_key(
        BindingKey::tagged::<Foot>(left.clone()),
        Foot { side: "left" },
    )?;
    builder.bind_instance_with_key(
        BindingKey::tagged::<Foot>(right.clone()),
        Foot { side: "right" },
    )?;
    builder.bind_instance(Chassis { serial: 42 })?;

    let left_leg = builder.bind_contextual::<Leg>(left)?;
    let right_leg = builder.bind_contextual::<Leg>(right)?;

    // 第二阶段: 终结图, 物化全部上下文解析器
    let _registry = builder.build()?;

    let l = left_leg.get()?;
    let r = right_leg.get()?;

    info!("左腿的脚: {} (底盘序列号 {})", l.foot.side, l.chassis.serial);
    info!("右腿的脚: {} (底盘序列号 {})", r.foot.side, r.chassis.serial);
    info!("底盘按引用共享: {}", Arc::ptr_eq(&l.chassis, &r.chassis));

    info!("✨ 两条腿各自拿到了上下文专属的脚, 底盘仍是同一个单例!");

    Ok(())
}
