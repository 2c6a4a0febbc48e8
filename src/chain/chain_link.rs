//! 链节点 - 参考 BoneLink 的静态/动态数据划分
//!
//! 每个 ChainLink 是链上的一个跟随点，它的驱动者是根（index 0）
//! 或者前一个节点。

use crate::math::Vector3;

/// 链节点
///
/// - 静态数据：起始帧采样得到的静止状态，整个模拟期间不变
/// - 动态数据：Verlet 所需的上一帧/当前帧位置，每帧由驱动器更新
#[derive(Clone, Debug)]
pub struct ChainLink {
    // ========================================
    // 静态数据（构建后不变）
    // ========================================

    /// 宿主中的物体名称
    pub name: String,

    /// 链内索引（0 = 根下方第一个节点）
    pub index: usize,

    /// 起始帧世界位置
    pub rest_position: Vector3,

    /// 起始帧 驱动者 → 本节点 的位移
    pub rest_displacement: Vector3,

    /// |rest_displacement|，恒大于 0
    pub rest_distance: f64,

    // ========================================
    // 动态数据（每帧更新）
    // ========================================

    /// 上一帧位置
    pub previous_position: Vector3,

    /// 当前帧位置
    pub current_position: Vector3,

    /// 最近一次有效的 驱动者 → 本节点 单位方向（奇异恢复用）
    pub(crate) last_direction: Vector3,

    /// 连续奇异帧计数
    pub(crate) singular_frames: u32,
}

impl ChainLink {
    /// 由静止状态创建，初速度为零
    pub(crate) fn new(
        name: String,
        index: usize,
        rest_position: Vector3,
        rest_displacement: Vector3,
        rest_distance: f64,
    ) -> Self {
        Self {
            name,
            index,
            rest_position,
            rest_displacement,
            rest_distance,
            previous_position: rest_position,
            current_position: rest_position,
            last_direction: rest_displacement / rest_distance,
            singular_frames: 0,
        }
    }

    /// 隐式速度（每帧位移）
    #[inline]
    pub fn velocity(&self) -> Vector3 {
        self.current_position - self.previous_position
    }

    /// 推进历史：current → previous，next → current
    #[inline]
    pub fn advance(&mut self, next: Vector3) {
        self.previous_position = self.current_position;
        self.current_position = next;
    }
}
