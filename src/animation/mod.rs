//! 动画数据
//!
//! - DriverTrack: 根物体在整个帧范围内的预采样轨道
//! - BakedMotion: 模拟结果，每个节点一条按帧索引的位置序列

mod driver_track;
mod baked_motion;

pub use driver_track::DriverTrack;
pub(crate) use driver_track::{frame_at, frame_index, frame_span, interpolate_keyframes};
pub use baked_motion::{BakedMotion, LinkTrack};
