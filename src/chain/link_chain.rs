//! 链管理器 - 参考 BoneSet 的层次结构管理
//!
//! 输入是起始帧采样到的世界位置：先是根（父级），然后是从选中物体
//! 到最末端后代的每个成员。相邻两项构成一对 (驱动者, 跟随者)。

use std::collections::HashSet;

use crate::math::{is_finite_vec, is_near_zero, Vector3};
use crate::{Result, SecondaryMotionError};

use super::chain_link::ChainLink;

/// 跟随链，一次模拟独占
#[derive(Clone, Debug)]
pub struct Chain {
    /// 根物体名称
    pub root_name: String,
    /// 根物体起始帧位置
    pub root_rest_position: Vector3,
    /// 跟随节点（根 → 叶）
    links: Vec<ChainLink>,
}

impl Chain {
    /// 从位置列表构建，名称自动生成
    pub fn build(positions: &[Vector3]) -> Result<Self> {
        let names: Vec<String> = (0..positions.len())
            .map(|i| if i == 0 { "root".to_string() } else { format!("link_{}", i - 1) })
            .collect();
        Self::build_named(&names, positions)
    }

    /// 从 (名称, 位置) 列表构建，names[0] / positions[0] 是根
    ///
    /// 失败（DegenerateChain）：
    /// - 少于 2 项（没有跟随者）
    /// - 名称重复（层级里有环）
    /// - 位置非有限值
    /// - 相邻两点重合（弹簧方向未定义）
    pub fn build_named(names: &[String], positions: &[Vector3]) -> Result<Self> {
        if names.len() != positions.len() {
            return Err(SecondaryMotionError::DegenerateChain(format!(
                "{} names for {} positions",
                names.len(),
                positions.len()
            )));
        }
        if positions.len() < 2 {
            return Err(SecondaryMotionError::DegenerateChain(
                "chain needs a parent and at least one follower".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in names {
            if !seen.insert(name.as_str()) {
                return Err(SecondaryMotionError::DegenerateChain(format!(
                    "{} appears twice in the hierarchy",
                    name
                )));
            }
        }

        if let Some((i, _)) = positions.iter().enumerate().find(|(_, p)| !is_finite_vec(**p)) {
            return Err(SecondaryMotionError::DegenerateChain(format!(
                "rest position of {} is not finite",
                names[i]
            )));
        }

        let mut links = Vec::with_capacity(positions.len() - 1);
        for (index, pair) in positions.windows(2).enumerate() {
            let (driver, follower) = (pair[0], pair[1]);
            let rest_displacement = follower - driver;
            let rest_distance = rest_displacement.length();
            if is_near_zero(rest_distance) {
                return Err(SecondaryMotionError::DegenerateChain(format!(
                    "{} coincides with {} at the start frame",
                    names[index + 1],
                    names[index]
                )));
            }
            links.push(ChainLink::new(
                names[index + 1].clone(),
                index,
                follower,
                rest_displacement,
                rest_distance,
            ));
        }

        log::info!(
            "[Chain] 构建完成: 根={}, {} 个跟随节点",
            names[0],
            links.len()
        );

        Ok(Self {
            root_name: names[0].clone(),
            root_rest_position: positions[0],
            links,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    #[inline]
    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    /// 只给驱动器推进历史用，静止状态构建后不可改
    #[inline]
    pub(crate) fn links_mut(&mut self) -> &mut [ChainLink] {
        &mut self.links
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&ChainLink> {
        self.links.get(index)
    }

    /// 节点 i 在本帧的驱动者位置
    ///
    /// i == 0 时是根轨道在该帧的位置，否则是前一个节点本帧约束后的位置。
    /// corrected 是本帧已经算完的节点（0..i）的结果；还没算到时退回
    /// 前一个节点的当前位置。
    pub fn driver_position(&self, index: usize, root_position: Vector3, corrected: &[Vector3]) -> Vector3 {
        if index == 0 {
            root_position
        } else {
            corrected
                .get(index - 1)
                .copied()
                .unwrap_or(self.links[index - 1].current_position)
        }
    }
}
