//! 宿主 → 建链 → 模拟 → 写关键帧 全流程

use secondary_motion::math::Vector3;
use secondary_motion::{
    bake_selection, MemoryScene, SceneQuery, SecondaryMotionError, SimulationParams, WriteMode,
};

const EPS: f64 = 1e-6;

/// 测试层级 + PARENT 在 1..10 帧沿 x 移动 5 个单位后停住
fn animated_hierarchy() -> MemoryScene {
    let mut scene = MemoryScene::vertical_test_hierarchy();
    scene.set_key("PARENT", 1, Vector3::ZERO);
    scene.set_key("PARENT", 10, Vector3::new(5.0, 0.0, 0.0));
    scene
}

#[test]
fn test_bake_vertical_hierarchy() {
    let scene = animated_hierarchy();
    let mut sink = MemoryScene::new();
    let params = SimulationParams::default();

    let report = bake_selection(&scene, &mut sink, scene.selection(), &params, WriteMode::World).unwrap();
    assert_eq!(report.chains.len(), 1);
    assert_eq!(report.keys_written, 4 * 50);

    // 写入帧递增
    let frames: Vec<i32> = sink.written_keys().iter().map(|k| k.frame).collect();
    assert!(frames.windows(2).all(|w| w[0] <= w[1]));

    // 每个 (物体, 帧) 恰好一次，且距离约束成立
    let names = ["SELECT_THIS", "test01", "test02", "test03"];
    let keyed: Vec<Vec<(i32, Vector3)>> = names.iter().map(|n| sink.written_for(n)).collect();
    for (i, keys) in keyed.iter().enumerate() {
        assert_eq!(keys.len(), 50);
        for (j, (frame, position)) in keys.iter().enumerate() {
            assert_eq!(*frame, 1 + j as i32);
            assert!(position.is_finite());

            let driver = if i == 0 {
                scene.world_position("PARENT", *frame).unwrap()
            } else {
                keyed[i - 1][j].1
            };
            assert!(((*position - driver).length() - 2.0).abs() < EPS);
        }
    }

    // 根在移动时链条落后于根
    let (_, mid) = keyed[0][5];
    let parent_mid = scene.world_position("PARENT", 6).unwrap();
    assert!(mid.x < parent_mid.x);
}

#[test]
fn test_offset_from_rest_mode() {
    let scene = animated_hierarchy();
    let params = SimulationParams::with_frames(1, 20);

    let mut world = MemoryScene::new();
    let report = bake_selection(&scene, &mut world, scene.selection(), &params, WriteMode::World).unwrap();

    let mut offsets = MemoryScene::new();
    bake_selection(&scene, &mut offsets, scene.selection(), &params, WriteMode::OffsetFromRest).unwrap();

    let rest = Vector3::new(0.0, 4.0, 0.0);
    for ((f0, w), (f1, o)) in world.written_for("test01").iter().zip(offsets.written_for("test01")) {
        assert_eq!(*f0, f1);
        assert!((*w - rest - o).length() < 1e-12);
    }
    assert_eq!(report.chains[0].tracks[1].rest_position, rest);
}

#[test]
fn test_degenerate_chain_writes_nothing() {
    let mut scene = animated_hierarchy();
    scene.set_key("test02", 1, Vector3::new(0.0, 4.0, 0.0));

    let mut sink = MemoryScene::new();
    let result = bake_selection(
        &scene,
        &mut sink,
        &["SELECT_THIS".to_string()],
        &SimulationParams::default(),
        WriteMode::World,
    );
    assert!(matches!(result, Err(SecondaryMotionError::DegenerateChain(_))));
    assert!(sink.written_keys().is_empty());
}

#[test]
fn test_persistent_singularity_aborts_without_writes() {
    let mut scene = MemoryScene::new();
    scene.add_transform("P", None, Vector3::ZERO);
    scene.add_transform("C", Some("P"), Vector3::new(0.0, 2.0, 0.0));
    // 根每帧正好跳到跟随者当前位置
    scene.set_key("P", 1, Vector3::ZERO);
    scene.set_key("P", 2, Vector3::new(0.0, 2.0, 0.0));
    scene.set_key("P", 3, Vector3::new(0.0, 4.0, 0.0));

    let params = SimulationParams {
        stiffness: 0.0,
        damping: 0.0,
        ..SimulationParams::with_frames(1, 3)
    };
    let mut sink = MemoryScene::new();
    let result = bake_selection(&scene, &mut sink, &["C".to_string()], &params, WriteMode::World);
    assert!(matches!(
        result,
        Err(SecondaryMotionError::ConstraintSingularity { link: 0, frame: 3 })
    ));
    assert!(sink.written_keys().is_empty());
}

#[test]
fn test_independent_chains() {
    let mut scene = MemoryScene::new();
    scene.add_transform("A", None, Vector3::ZERO);
    scene.add_transform("a1", Some("A"), Vector3::new(0.0, 1.0, 0.0));
    scene.add_transform("a2", Some("a1"), Vector3::new(0.0, 2.0, 0.0));
    scene.add_transform("B", None, Vector3::new(10.0, 0.0, 0.0));
    scene.add_transform("b1", Some("B"), Vector3::new(10.0, 0.0, 3.0));
    scene.set_key("A", 1, Vector3::ZERO);
    scene.set_key("A", 8, Vector3::new(0.0, 0.0, 4.0));
    scene.set_key("B", 1, Vector3::new(10.0, 0.0, 0.0));
    scene.set_key("B", 5, Vector3::new(7.0, 1.0, 0.0));

    let params = SimulationParams::with_frames(1, 30);
    let both = ["a1".to_string(), "b1".to_string()];

    let mut sink = MemoryScene::new();
    let report = bake_selection(&scene, &mut sink, &both, &params, WriteMode::World).unwrap();
    assert_eq!(report.chains.len(), 2);
    assert_eq!(report.keys_written, 3 * 30);

    // 与单独烘焙的结果一致
    let mut only_a = MemoryScene::new();
    bake_selection(&scene, &mut only_a, &both[..1], &params, WriteMode::World).unwrap();
    let mut only_b = MemoryScene::new();
    bake_selection(&scene, &mut only_b, &both[1..], &params, WriteMode::World).unwrap();

    assert_eq!(sink.written_for("a2"), only_a.written_for("a2"));
    assert_eq!(sink.written_for("b1"), only_b.written_for("b1"));
}

#[test]
fn test_overlapping_selection_rejected() {
    let scene = animated_hierarchy();
    let mut sink = MemoryScene::new();
    let result = bake_selection(
        &scene,
        &mut sink,
        &["SELECT_THIS".to_string(), "test02".to_string()],
        &SimulationParams::default(),
        WriteMode::World,
    );
    assert!(matches!(result, Err(SecondaryMotionError::DegenerateChain(_))));
    assert!(sink.written_keys().is_empty());
}

#[test]
fn test_invalid_params_rejected_before_sampling() {
    let scene = animated_hierarchy();
    let mut sink = MemoryScene::new();
    let params = SimulationParams { mass: -1.0, ..Default::default() };
    let result = bake_selection(&scene, &mut sink, scene.selection(), &params, WriteMode::World);
    assert!(matches!(result, Err(SecondaryMotionError::InvalidParams(_))));
}

#[test]
fn test_bake_at_end_of_frame_range() {
    let scene = MemoryScene::vertical_test_hierarchy();
    let mut sink = MemoryScene::new();
    let params = SimulationParams::with_frames(i32::MAX - 1, i32::MAX);

    let report = bake_selection(&scene, &mut sink, scene.selection(), &params, WriteMode::World).unwrap();
    assert_eq!(report.keys_written, 4 * 2);

    // 根不动：链保持静止
    let rest = Vector3::new(0.0, 8.0, 0.0);
    assert_eq!(sink.written_for("test03"), vec![(i32::MAX - 1, rest), (i32::MAX, rest)]);
}
