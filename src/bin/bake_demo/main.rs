//! 烘焙演示
//!
//! 构建测试层级，让 PARENT 左右摆动，烘焙跟随运动并打印关键帧。
//! 运行：RUST_LOG=info cargo run --features demo --bin bake_demo

use secondary_motion::math::Vector3;
use secondary_motion::{bake_selection, MemoryScene, SimulationParams, WriteMode};

fn main() {
    env_logger::init();

    let mut scene = MemoryScene::vertical_test_hierarchy();
    scene.set_key("PARENT", 1, Vector3::ZERO);
    scene.set_key("PARENT", 10, Vector3::new(4.0, 0.0, 0.0));
    scene.set_key("PARENT", 20, Vector3::new(-4.0, 0.0, 0.0));
    scene.set_key("PARENT", 30, Vector3::ZERO);

    let params = SimulationParams::default();
    let selection = scene.selection().to_vec();
    let mut sink = MemoryScene::new();

    match bake_selection(&scene, &mut sink, &selection, &params, WriteMode::World) {
        Ok(report) => {
            for key in sink.written_keys() {
                println!(
                    "{:>12} frame {:>3}: ({:>8.4}, {:>8.4}, {:>8.4})",
                    key.object, key.frame, key.position.x, key.position.y, key.position.z
                );
            }
            log::info!("写入 {} 个关键帧", report.keys_written);
        }
        Err(e) => {
            log::error!("烘焙失败: {}", e);
            std::process::exit(1);
        }
    }
}
