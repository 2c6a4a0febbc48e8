//! 驱动轨道
//!
//! 根物体的运动由外部制作、不参与模拟，所以在模拟开始前一次性采样
//! 整个帧范围，构建后不可变。

use std::collections::BTreeMap;

use crate::math::{is_finite_vec, Vector3};
use crate::{Result, SecondaryMotionError};

/// 根物体位置轨道（每帧一个位置，从 start_frame 开始连续）
#[derive(Debug, Clone, PartialEq)]
pub struct DriverTrack {
    start_frame: i32,
    positions: Vec<Vector3>,
}

impl DriverTrack {
    /// 直接由连续位置构建，positions[0] 对应 start_frame
    pub fn new(start_frame: i32, positions: Vec<Vector3>) -> Self {
        Self { start_frame, positions }
    }

    /// 固定不动的轨道
    pub fn stationary(position: Vector3, start_frame: i32, end_frame: i32) -> Self {
        Self::new(start_frame, vec![position; frame_span(start_frame, end_frame)])
    }

    /// 逐帧调用采样函数构建（宿主每帧采样一次）
    pub fn sample<F>(start_frame: i32, end_frame: i32, mut sampler: F) -> Result<Self>
    where
        F: FnMut(i32) -> Result<Vector3>,
    {
        let mut positions = Vec::with_capacity(frame_span(start_frame, end_frame));
        for frame in start_frame..=end_frame {
            let position = sampler(frame)?;
            if !is_finite_vec(position) {
                return Err(SecondaryMotionError::NonFinitePosition { link: 0, frame });
            }
            positions.push(position);
        }
        Ok(Self::new(start_frame, positions))
    }

    /// 从稀疏关键帧采样
    ///
    /// 两关键帧之间线性插值；第一帧之前保持第一帧，最后一帧之后保持最后一帧。
    /// 没有关键帧时返回 None。
    pub fn from_keyframes(
        keyframes: &BTreeMap<i32, Vector3>,
        start_frame: i32,
        end_frame: i32,
    ) -> Option<Self> {
        if keyframes.is_empty() {
            return None;
        }
        let positions = (start_frame..=end_frame)
            .map(|frame| interpolate_keyframes(keyframes, frame))
            .collect::<Option<Vec<_>>>()?;
        Some(Self::new(start_frame, positions))
    }

    #[inline]
    pub fn start_frame(&self) -> i32 {
        self.start_frame
    }

    /// 最后一帧（空轨道时为 start_frame - 1，超出 i32 范围时截断）
    #[inline]
    pub fn end_frame(&self) -> i32 {
        let end = i64::from(self.start_frame) + self.positions.len() as i64 - 1;
        end.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// 指定帧位置
    #[inline]
    pub fn position(&self, frame: i32) -> Option<Vector3> {
        self.positions.get(frame_index(self.start_frame, frame)?).copied()
    }

    #[inline]
    pub fn positions(&self) -> &[Vector3] {
        &self.positions
    }

    /// 检查轨道是否覆盖 start..=end
    pub fn ensure_covers(&self, start_frame: i32, end_frame: i32) -> Result<()> {
        let covered = start_frame >= self.start_frame
            && frame_index(self.start_frame, end_frame).is_some_and(|i| i < self.positions.len());
        if !covered {
            return Err(SecondaryMotionError::TrackRange {
                track_start: self.start_frame,
                track_end: self.end_frame(),
                start: start_frame,
                end: end_frame,
            });
        }
        Ok(())
    }
}

/// start..=end 的帧数，按 i64 计算避免溢出
#[inline]
pub(crate) fn frame_span(start_frame: i32, end_frame: i32) -> usize {
    (i64::from(end_frame) - i64::from(start_frame) + 1).max(0) as usize
}

/// frame 相对 start_frame 的下标，早于 start_frame 时为 None
#[inline]
pub(crate) fn frame_index(start_frame: i32, frame: i32) -> Option<usize> {
    usize::try_from(i64::from(frame) - i64::from(start_frame)).ok()
}

/// start_frame 之后第 index 帧的帧号，超出 i32 时为 None
#[inline]
pub(crate) fn frame_at(start_frame: i32, index: usize) -> Option<i32> {
    let offset = i64::try_from(index).ok()?;
    i32::try_from(i64::from(start_frame).checked_add(offset)?).ok()
}

/// 关键帧线性插值（两端保持）
pub(crate) fn interpolate_keyframes(keyframes: &BTreeMap<i32, Vector3>, frame: i32) -> Option<Vector3> {
    let prev = keyframes.range(..=frame).next_back();
    let next = keyframes.range(frame..).next();
    match (prev, next) {
        (Some((&f0, &p0)), Some((&f1, &p1))) => {
            if f1 == f0 {
                Some(p0)
            } else {
                let t = (f64::from(frame) - f64::from(f0)) / (f64::from(f1) - f64::from(f0));
                Some(p0.lerp(p1, t))
            }
        }
        (Some((_, &p)), None) | (None, Some((_, &p))) => Some(p),
        (None, None) => None,
    }
}
