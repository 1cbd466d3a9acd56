//! 上下文解析层的集成测试
//!
//! 覆盖上下文隔离、单例共享、缺失绑定快速失败、幂等物化、
//! 非占位依赖直通与装配顺序缺陷等关键性质。

use di_abstractions::{DependencyProvider, Environment};
use di_common::{BindingKey, ContextTag, DependencyError, InjectionError, Lifetime};
use di_contextual::{ContextualResolver, ResolverState, ScopedProvider};
use di_contextual_integration_tests::{Counter, Pair, PassThrough, Standalone, Value};
use di_impl::RegistryBuilder;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

/// 构建标准的双上下文场景: alpha/beta 各绑定一个取值实例，
/// 计数器为进程级单例
fn two_context_builder() -> (RegistryBuilder, ScopedProvider<Pair>, ScopedProvider<Pair>) {
    let mut builder = RegistryBuilder::new();

    builder
        .bind_instance_with_key(
            BindingKey::tagged::<Value>(ContextTag::new("alpha")),
            Value::new("alpha"),
        )
        .unwrap();
    builder
        .bind_instance_with_key(
            BindingKey::tagged::<Value>(ContextTag::new("beta")),
            Value::new("beta"),
        )
        .unwrap();
    builder.bind_instance(Counter::default()).unwrap();

    let pair_alpha = builder.bind_contextual::<Pair>(ContextTag::new("alpha")).unwrap();
    let pair_beta = builder.bind_contextual::<Pair>(ContextTag::new("beta")).unwrap();

    (builder, pair_alpha, pair_beta)
}

#[test]
fn test_context_isolation_and_shared_singleton() {
    let (builder, pair_alpha, pair_beta) = two_context_builder();
    let _registry = builder.build().unwrap();

    let a = pair_alpha.get().unwrap();
    let b = pair_beta.get().unwrap();

    // 上下文隔离: 占位依赖按各自上下文重写
    assert_eq!(a.value.text, "alpha");
    assert_eq!(b.value.text, "beta");
    assert!(!Arc::ptr_eq(&a.value, &b.value));

    // 单例共享: 非占位依赖来自公共父环境, 跨上下文同一实例
    assert!(Arc::ptr_eq(&a.shared, &b.shared));
    a.shared.increment();
    assert_eq!(b.shared.current(), 1);
}

#[test]
fn test_transient_context_values_are_not_shared() {
    let mut builder = RegistryBuilder::new();

    builder
        .bind_factory(
            BindingKey::tagged::<Value>(ContextTag::new("alpha")),
            Lifetime::Transient,
            || Ok(Value::new("alpha")),
        )
        .unwrap();
    builder
        .bind_factory(
            BindingKey::tagged::<Value>(ContextTag::new("beta")),
            Lifetime::Transient,
            || Ok(Value::new("beta")),
        )
        .unwrap();
    builder.bind_instance(Counter::default()).unwrap();

    let pair_alpha = builder.bind_contextual::<Pair>(ContextTag::new("alpha")).unwrap();
    let pair_beta = builder.bind_contextual::<Pair>(ContextTag::new("beta")).unwrap();
    let _registry = builder.build().unwrap();

    let a = pair_alpha.get().unwrap();
    let b = pair_beta.get().unwrap();

    assert!(!Arc::ptr_eq(&a.value, &b.value));

    // 瞬时绑定下同一上下文的两次构造也互不相同
    let a2 = pair_alpha.get().unwrap();
    assert!(!Arc::ptr_eq(&a.value, &a2.value));
}

#[test]
fn test_fail_fast_on_missing_rewritten_binding() {
    let mut builder = RegistryBuilder::new();
    builder.bind_instance(Counter::default()).unwrap();

    // gamma 上下文没有为 Value 提供绑定
    let handle = builder.bind_contextual::<Pair>(ContextTag::new("gamma")).unwrap();

    let expected_key = BindingKey::tagged::<Value>(ContextTag::new("gamma"));
    let err = builder.build().unwrap_err();
    match err {
        InjectionError::Dependency {
            source: DependencyError::BindingNotFound { key },
        } => assert_eq!(key, expected_key.to_string()),
        other => panic!("意外的错误类型: {other}"),
    }

    // 失败的图不会产生任何可用的提供者
    assert_eq!(handle.state(), ResolverState::Failed);
    assert!(matches!(
        handle.get().unwrap_err(),
        DependencyError::ResolverFailed { .. }
    ));
}

#[test]
fn test_failed_materialization_is_terminal() {
    let mut builder = RegistryBuilder::new();
    builder.bind_instance(Counter::default()).unwrap();
    let empty_env: Arc<dyn Environment> = builder.build().unwrap();

    let resolver = Arc::new(
        ContextualResolver::for_component::<Pair>(ContextTag::new("alpha"), Lifetime::Transient)
            .unwrap(),
    );

    // 首次物化因缺失重写键绑定而失败
    let err = resolver.materialize(Arc::clone(&empty_env)).unwrap_err();
    assert!(matches!(err, DependencyError::BindingNotFound { .. }));
    assert_eq!(resolver.state(), ResolverState::Failed);

    // 即使之后父环境补齐了绑定, 失败也是终态, 不会重试
    let mut builder = RegistryBuilder::new();
    builder
        .bind_instance_with_key(
            BindingKey::tagged::<Value>(ContextTag::new("alpha")),
            Value::new("alpha"),
        )
        .unwrap();
    builder.bind_instance(Counter::default()).unwrap();
    let complete_env: Arc<dyn Environment> = builder.build().unwrap();

    assert!(matches!(
        resolver.materialize(complete_env).unwrap_err(),
        DependencyError::ResolverFailed { .. }
    ));
    assert!(matches!(
        resolver.child().unwrap_err(),
        DependencyError::ResolverFailed { .. }
    ));
}

#[test]
fn test_wiring_order_error_before_finalization() {
    let mut builder = RegistryBuilder::new();
    builder
        .bind_instance_with_key(
            BindingKey::tagged::<Value>(ContextTag::new("alpha")),
            Value::new("alpha"),
        )
        .unwrap();
    builder.bind_instance(Counter::default()).unwrap();

    let handle = builder.bind_contextual::<Pair>(ContextTag::new("alpha")).unwrap();

    // 图尚未终结: 查询未就绪的句柄是装配顺序缺陷
    assert_eq!(handle.state(), ResolverState::Uninitialized);
    let err = handle.get().unwrap_err();
    match err {
        DependencyError::ResolverNotReady { key, context } => {
            assert_eq!(key, BindingKey::of::<Pair>().to_string());
            assert_eq!(context, "alpha");
        }
        other => panic!("意外的错误类型: {other}"),
    }

    // 终结之后同一个句柄直接可用
    let _registry = builder.build().unwrap();
    assert_eq!(handle.state(), ResolverState::Ready);
    assert_eq!(handle.get().unwrap().value.text, "alpha");
}

#[test]
fn test_idempotent_materialization() {
    let mut builder = RegistryBuilder::new();
    builder
        .bind_instance_with_key(
            BindingKey::tagged::<Value>(ContextTag::new("alpha")),
            Value::new("alpha"),
        )
        .unwrap();
    builder.bind_instance(Counter::default()).unwrap();
    let registry = builder.build().unwrap();
    let env: Arc<dyn Environment> = registry;

    let resolver = Arc::new(
        ContextualResolver::for_component::<Pair>(ContextTag::new("alpha"), Lifetime::Transient)
            .unwrap(),
    );

    // 重复触发物化是幂等的
    resolver.materialize(Arc::clone(&env)).unwrap();
    let first = Arc::clone(resolver.child().unwrap());
    resolver.materialize(Arc::clone(&env)).unwrap();
    let second = Arc::clone(resolver.child().unwrap());
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(resolver.state(), ResolverState::Ready);
}

#[test]
fn test_concurrent_materialization_yields_single_child() {
    let mut builder = RegistryBuilder::new();
    builder
        .bind_instance_with_key(
            BindingKey::tagged::<Value>(ContextTag::new("alpha")),
            Value::new("alpha"),
        )
        .unwrap();
    builder.bind_instance(Counter::default()).unwrap();
    let registry = builder.build().unwrap();
    let env: Arc<dyn Environment> = registry;

    let resolver = Arc::new(
        ContextualResolver::for_component::<Pair>(ContextTag::new("alpha"), Lifetime::Transient)
            .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            let env = Arc::clone(&env);
            thread::spawn(move || {
                resolver.materialize(env).unwrap();
                Arc::clone(resolver.child().unwrap())
            })
        })
        .collect();

    let children: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for child in &children[1..] {
        assert!(Arc::ptr_eq(&children[0], child));
    }
}

#[test]
fn test_non_placeholder_dependency_passes_through() {
    let mut builder = RegistryBuilder::new();
    let constructed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&constructed);

    builder
        .bind_factory(BindingKey::of::<Counter>(), Lifetime::Singleton, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Counter::default())
        })
        .unwrap();

    let left = builder.bind_contextual::<PassThrough>(ContextTag::new("left")).unwrap();
    let right = builder.bind_contextual::<PassThrough>(ContextTag::new("right")).unwrap();
    let _registry = builder.build().unwrap();

    let l = left.get().unwrap();
    let r = right.get().unwrap();

    // 不带占位限定符的依赖与上下文标签无关: 单例只构造一次
    assert!(Arc::ptr_eq(&l.shared, &r.shared));
    assert_eq!(constructed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_declared_dependency_metadata_reports_rewritten_keys() {
    let (builder, pair_alpha, _pair_beta) = two_context_builder();
    let _registry = builder.build().unwrap();

    // 上报的声明依赖面是重写后的键集合
    assert_eq!(
        pair_alpha.dependencies(),
        &[BindingKey::tagged::<Value>(ContextTag::new("alpha"))]
    );
}

#[test]
fn test_contextual_component_resolvable_by_tagged_key() {
    use di_abstractions::EnvironmentExt;

    let (builder, _pair_alpha, _pair_beta) = two_context_builder();
    let registry = builder.build().unwrap();

    // 其他组件可以按 (类型, 标签) 键依赖上下文组件
    let pair = registry
        .construct_as::<Pair>(&BindingKey::tagged::<Pair>(ContextTag::new("beta")))
        .unwrap();
    assert_eq!(pair.value.text, "beta");
}

#[test]
fn test_singleton_scoped_contextual_component() {
    let mut builder = RegistryBuilder::new();
    builder
        .bind_instance_with_key(
            BindingKey::tagged::<Value>(ContextTag::new("alpha")),
            Value::new("alpha"),
        )
        .unwrap();
    builder.bind_instance(Counter::default()).unwrap();

    // 实现类型本身由注册方指定为单例作用域
    let handle = builder
        .bind_contextual_in::<Pair>(ContextTag::new("alpha"), Lifetime::Singleton)
        .unwrap();
    let _registry = builder.build().unwrap();

    let first = handle.get().unwrap();
    let second = handle.get().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_zero_dependency_component_under_context() {
    let mut builder = RegistryBuilder::new();
    let handle = builder.bind_contextual::<Standalone>(ContextTag::new("alpha")).unwrap();
    let _registry = builder.build().unwrap();

    // 零依赖组件没有重写边, 物化只绑定实现类型本身
    assert!(handle.dependencies().is_empty());
    handle.get().unwrap();
}

#[test]
fn test_same_tag_same_rewritten_key_for_all_components() {
    let mut builder = RegistryBuilder::new();
    builder
        .bind_instance_with_key(
            BindingKey::tagged::<Value>(ContextTag::new("alpha")),
            Value::new("alpha"),
        )
        .unwrap();
    builder.bind_instance(Counter::default()).unwrap();

    let pair = builder.bind_contextual::<Pair>(ContextTag::new("alpha")).unwrap();
    let _registry = builder.build().unwrap();

    // 固定上下文下, 每个占位依赖都重写到同一个键
    let expected = BindingKey::tagged::<Value>(ContextTag::new("alpha"));
    assert!(pair.dependencies().iter().all(|key| key == &expected));
}
