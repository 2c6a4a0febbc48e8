//! 二次运动（跟随运动）模拟
//!
//! 根物体（父级）的动画驱动一条层级链，链上每个节点通过
//! 固定距离的阻尼弹簧挂在前一个节点上：
//! - chain: 链节点与整条链（起始帧快照）
//! - physics: 参数、Spring-Verlet 积分、距离约束、逐帧驱动
//! - animation: 驱动轨道与烘焙结果
//! - host: 宿主协作接口与烘焙流程

pub mod math;
pub mod chain;
pub mod physics;
pub mod animation;
pub mod host;
pub mod scene;

pub use chain::{Chain, ChainLink};
pub use physics::{run, ChainSimulation, SimulationParams};
pub use animation::{BakedMotion, DriverTrack, LinkTrack};
pub use host::{bake_selection, BakeReport, KeyframeSink, SceneQuery, WriteMode};
pub use scene::MemoryScene;

use thiserror::Error;

/// 错误类型
#[derive(Debug, Clone, Error)]
pub enum SecondaryMotionError {
    #[error("No object is selected")]
    NoSelection,

    #[error("{object} has no parent")]
    NoParent { object: String },

    #[error("Degenerate chain: {0}")]
    DegenerateChain(String),

    #[error("Constraint singularity on link {link} at frame {frame}")]
    ConstraintSingularity { link: usize, frame: i32 },

    #[error("Non-finite position on link {link} at frame {frame}")]
    NonFinitePosition { link: usize, frame: i32 },

    #[error("Invalid simulation params: {0}")]
    InvalidParams(String),

    #[error("Cannot sample position of {object} at frame {frame}")]
    MissingSample { object: String, frame: i32 },

    #[error("Driver track covers frames {track_start}..={track_end}, requested {start}..={end}")]
    TrackRange {
        track_start: i32,
        track_end: i32,
        start: i32,
        end: i32,
    },

    #[error("Host error: {0}")]
    Host(String),
}

pub type Result<T> = std::result::Result<T, SecondaryMotionError>;
