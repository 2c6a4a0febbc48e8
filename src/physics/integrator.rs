//! Spring-Verlet 积分器
//!
//! 单步显式积分，不限速、不分子步。只在小刚度、小步长、
//! damping < 1 时稳定，大刚度发散属于参数问题。

use crate::chain::ChainLink;
use crate::math::Vector3;

use super::config::SimulationParams;

/// 弹簧加速度（向量形式胡克定律，各轴独立）
///
/// x = (link - driver) - rest_displacement
/// a = (-k * x + F_ext) / m
#[inline]
pub fn spring_acceleration(link: &ChainLink, driver_position: Vector3, params: &SimulationParams) -> Vector3 {
    let displacement = link.current_position - driver_position;
    let extension = displacement - link.rest_displacement;
    (-params.stiffness * extension + params.external_force) / params.mass
}

/// 推进一个节点一步，返回未约束的候选位置
///
/// next = current + damping * (current - previous) + a * dt²
///
/// 纯函数，历史更新由驱动器负责。
#[inline]
pub fn integrate(link: &ChainLink, driver_position: Vector3, params: &SimulationParams) -> Vector3 {
    let acceleration = spring_acceleration(link, driver_position, params);
    let dt = params.time_step;
    link.current_position
        + params.damping * (link.current_position - link.previous_position)
        + acceleration * dt * dt
}
