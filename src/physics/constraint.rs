//! 距离约束投影
//!
//! 把积分后的候选位置缩放回以驱动者为球心、半径为静止距离的球面上。
//! 单次修正，不迭代松弛；多节点链中每个节点使用驱动者已修正的位置。

use crate::chain::ChainLink;
use crate::math::{is_near_zero, Vector3};
use crate::{Result, SecondaryMotionError};

/// 投影到固定距离
///
/// delta = candidate - driver
/// constrained = delta * (rest_distance / |delta|) + driver
///
/// |delta| 近零时方向未定义，返回 None。
#[inline]
pub fn project(candidate: Vector3, driver_position: Vector3, rest_distance: f64) -> Option<Vector3> {
    let delta = candidate - driver_position;
    let current_distance = delta.length();
    if is_near_zero(current_distance) || !current_distance.is_finite() {
        return None;
    }
    let ratio = rest_distance / current_distance;
    Some(delta * ratio + driver_position)
}

/// 带奇异恢复的距离约束
///
/// 第一帧奇异：沿上一次有效方向放到静止距离处，继续模拟；
/// 紧接着的下一帧仍奇异：返回 ConstraintSingularity。
pub struct DistanceConstraint;

impl DistanceConstraint {
    /// 连续奇异帧上限（超过即失败）
    pub const MAX_RECOVERY_FRAMES: u32 = 1;

    /// 约束节点，更新节点的恢复状态（不改动位置历史）
    pub fn apply(
        link: &mut ChainLink,
        candidate: Vector3,
        driver_position: Vector3,
        frame: i32,
    ) -> Result<Vector3> {
        // 距离溢出说明积分已经发散，不当作奇异处理
        if !(candidate - driver_position).length().is_finite() {
            return Err(SecondaryMotionError::NonFinitePosition {
                link: link.index,
                frame,
            });
        }

        match project(candidate, driver_position, link.rest_distance) {
            Some(constrained) => {
                link.singular_frames = 0;
                if let Some(dir) = (constrained - driver_position).try_normalize() {
                    link.last_direction = dir;
                }
                Ok(constrained)
            }
            None => {
                link.singular_frames += 1;
                if link.singular_frames > Self::MAX_RECOVERY_FRAMES {
                    return Err(SecondaryMotionError::ConstraintSingularity {
                        link: link.index,
                        frame,
                    });
                }
                log::warn!(
                    "[Constraint] 节点 {} 在第 {} 帧与驱动者重合，沿上一次方向恢复",
                    link.name,
                    frame
                );
                Ok(driver_position + link.last_direction * link.rest_distance)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Chain;

    #[test]
    fn test_project_restores_distance() {
        let driver = Vector3::new(1.0, 1.0, 1.0);
        let candidate = Vector3::new(4.0, 5.0, 1.0);
        let constrained = project(candidate, driver, 2.0).unwrap();
        assert!(((constrained - driver).length() - 2.0).abs() < 1e-12);
        // 方向保持不变
        let expected = driver + Vector3::new(0.6, 0.8, 0.0) * 2.0;
        assert!((constrained - expected).length() < 1e-12);
    }

    #[test]
    fn test_project_singular() {
        let p = Vector3::new(3.0, 3.0, 3.0);
        assert!(project(p, p, 1.0).is_none());
    }

    #[test]
    fn test_recovery_then_escalation() {
        let mut chain = Chain::build(&[Vector3::ZERO, Vector3::new(0.0, 2.0, 0.0)]).unwrap();
        let link = &mut chain.links_mut()[0];

        // 第一次奇异：沿静止方向恢复
        let recovered = DistanceConstraint::apply(link, Vector3::ZERO, Vector3::ZERO, 1).unwrap();
        assert!((recovered - Vector3::new(0.0, 2.0, 0.0)).length() < 1e-12);

        // 连续第二次：失败
        let err = DistanceConstraint::apply(link, Vector3::ZERO, Vector3::ZERO, 2).unwrap_err();
        assert!(matches!(
            err,
            SecondaryMotionError::ConstraintSingularity { link: 0, frame: 2 }
        ));
    }

    #[test]
    fn test_overflow_is_not_singular() {
        let mut chain = Chain::build(&[Vector3::ZERO, Vector3::new(0.0, 2.0, 0.0)]).unwrap();
        let link = &mut chain.links_mut()[0];
        let err = DistanceConstraint::apply(link, Vector3::new(1e200, 1e200, 0.0), Vector3::ZERO, 7).unwrap_err();
        assert!(matches!(
            err,
            SecondaryMotionError::NonFinitePosition { link: 0, frame: 7 }
        ));
    }

    #[test]
    fn test_recovery_uses_last_valid_direction() {
        let mut chain = Chain::build(&[Vector3::ZERO, Vector3::new(0.0, 2.0, 0.0)]).unwrap();
        let link = &mut chain.links_mut()[0];

        DistanceConstraint::apply(link, Vector3::new(5.0, 0.0, 0.0), Vector3::ZERO, 1).unwrap();
        let recovered = DistanceConstraint::apply(link, Vector3::ZERO, Vector3::ZERO, 2).unwrap();
        assert!((recovered - Vector3::new(2.0, 0.0, 0.0)).length() < 1e-12);

        // 正常帧清零计数
        DistanceConstraint::apply(link, Vector3::new(0.0, 0.0, 3.0), Vector3::ZERO, 3).unwrap();
        assert!(DistanceConstraint::apply(link, Vector3::ZERO, Vector3::ZERO, 4).is_ok());
    }
}
