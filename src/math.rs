//! 三维向量工具
//!
//! 宿主坐标是双精度，这里统一使用 glam 的 DVec3。

use glam::DVec3;

/// 世界空间位置 / 位移
pub type Vector3 = DVec3;

/// 长度判零阈值（段长、投影距离）
pub const LENGTH_EPSILON: f64 = 1e-9;

/// 长度是否近似为零
#[inline]
pub fn is_near_zero(length: f64) -> bool {
    length.abs() < LENGTH_EPSILON
}

/// 三个分量都是有限值
#[inline]
pub fn is_finite_vec(v: Vector3) -> bool {
    v.is_finite()
}

/// 两点距离
#[inline]
pub fn distance(a: Vector3, b: Vector3) -> f64 {
    (b - a).length()
}

/// 单位方向，长度近零时返回 None
#[inline]
pub fn direction(from: Vector3, to: Vector3) -> Option<Vector3> {
    let delta = to - from;
    let len = delta.length();
    if is_near_zero(len) || !len.is_finite() {
        None
    } else {
        Some(delta / len)
    }
}
