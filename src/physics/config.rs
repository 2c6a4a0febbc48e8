//! 模拟参数
//!
//! 所有参数扁平化，由调用方显式传入驱动器，不存在全局状态。

use crate::animation::frame_span;
use crate::math::{is_finite_vec, Vector3};
use crate::{Result, SecondaryMotionError};

/// 模拟参数（扁平化，不嵌套）
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    // ========== 弹簧 ==========
    /// 弹簧刚度 k，越大越硬，默认 0.1
    pub stiffness: f64,
    /// Verlet 速度保留系数，默认 0.8
    /// 有效范围 (0, 1]，0 表示没有惯性；>= 1 放大能量、< 0 使速度反向，
    /// 两者都只警告，由调用方负责
    pub damping: f64,
    /// 质量，默认 1.0
    pub mass: f64,

    // ========== 时间 ==========
    /// 每帧时间步长，默认 1.0
    pub time_step: f64,
    /// 起始帧（含），默认 1
    pub start_frame: i32,
    /// 结束帧（含），默认 50
    pub end_frame: i32,

    // ========== 外力 ==========
    /// 恒定外力（例如重力 * 质量），默认零
    pub external_force: Vector3,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            // 低刚度 + 0.8 阻尼是显式积分稳定的区间
            stiffness: 0.1,
            damping: 0.8,
            mass: 1.0,

            time_step: 1.0,
            start_frame: 1,
            end_frame: 50,

            external_force: Vector3::ZERO,
        }
    }
}

impl SimulationParams {
    /// 指定帧范围，其他取默认值
    pub fn with_frames(start_frame: i32, end_frame: i32) -> Self {
        Self {
            start_frame,
            end_frame,
            ..Self::default()
        }
    }

    /// 帧数（含两端）
    #[inline]
    pub fn frame_count(&self) -> usize {
        frame_span(self.start_frame, self.end_frame)
    }

    /// 帧序列 start..=end
    #[inline]
    pub fn frames(&self) -> std::ops::RangeInclusive<i32> {
        self.start_frame..=self.end_frame
    }

    /// 校验参数，只在模拟开始前调用一次
    pub fn validate(&self) -> Result<()> {
        if !self.stiffness.is_finite() || self.stiffness < 0.0 {
            return Err(SecondaryMotionError::InvalidParams(format!(
                "stiffness must be >= 0, got {}",
                self.stiffness
            )));
        }
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(SecondaryMotionError::InvalidParams(format!(
                "mass must be > 0, got {}",
                self.mass
            )));
        }
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(SecondaryMotionError::InvalidParams(format!(
                "time step must be > 0, got {}",
                self.time_step
            )));
        }
        if !self.damping.is_finite() {
            return Err(SecondaryMotionError::InvalidParams(format!(
                "damping must be finite, got {}",
                self.damping
            )));
        }
        if !is_finite_vec(self.external_force) {
            return Err(SecondaryMotionError::InvalidParams(
                "external force must be finite".to_string(),
            ));
        }
        if self.end_frame < self.start_frame {
            return Err(SecondaryMotionError::InvalidParams(format!(
                "end frame {} is before start frame {}",
                self.end_frame, self.start_frame
            )));
        }

        if self.damping >= 1.0 {
            log::warn!("[Verlet] damping={} >= 1，每帧能量会被放大", self.damping);
        } else if self.damping < 0.0 {
            log::warn!("[Verlet] damping={} < 0，速度每帧反向", self.damping);
        }

        Ok(())
    }
}
