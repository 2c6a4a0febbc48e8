//! 宿主协作接口
//!
//! 选择查询、逐帧采样、关键帧写入由宿主（动画软件）负责，这里只定义
//! 两个窄接口，并实现 选择 → 建链 → 采样根轨道 → 模拟 → 写关键帧 的流程。
//!
//! 建链或模拟的任何失败都发生在写入之前，宿主不会留下半烘焙的链。

use std::collections::HashSet;

use rayon::prelude::*;

use crate::animation::{BakedMotion, DriverTrack};
use crate::chain::Chain;
use crate::math::Vector3;
use crate::physics::{run, SimulationParams};
use crate::{Result, SecondaryMotionError};

/// 场景查询（层级 + 位置采样）
pub trait SceneQuery {
    /// 父物体
    fn parent_of(&self, object: &str) -> Option<String>;

    /// 直接子物体中的变换节点（形状等非变换节点不算）
    fn transform_children(&self, object: &str) -> Vec<String>;

    /// 世界空间位置
    fn world_position(&self, object: &str, frame: i32) -> Option<Vector3>;
}

/// 关键帧写入（只写）
///
/// bake_selection 按帧递增写入，同一帧内先按选择顺序、再按链顺序。
/// 写入返回错误时立即停止并把错误原样返回：之前已写入的关键帧不会被撤销，
/// 需要整体回滚的宿主应在自己的撤销块里调用 bake_selection。
pub trait KeyframeSink {
    fn set_position_key(&mut self, object: &str, frame: i32, position: Vector3) -> Result<()>;
}

/// 写入模式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// 写世界位置
    #[default]
    World,
    /// 写相对起始帧位置的偏移（冻结变换的物体）
    OffsetFromRest,
}

/// 烘焙结果汇总
#[derive(Debug, Clone)]
pub struct BakeReport {
    /// 每个选中物体一条链
    pub chains: Vec<BakedMotion>,
    /// 写入的关键帧数
    pub keys_written: usize,
}

/// 采样某帧位置，失败转成 MissingSample
fn sample<S: SceneQuery + ?Sized>(scene: &S, object: &str, frame: i32) -> Result<Vector3> {
    scene
        .world_position(object, frame)
        .ok_or_else(|| SecondaryMotionError::MissingSample {
            object: object.to_string(),
            frame,
        })
}

/// 从选中物体建链：父物体为根，随后是选中物体和它的变换后代
///
/// 只支持串联链：任何一个成员有多个变换子物体时返回 DegenerateChain。
pub fn build_chain<S: SceneQuery + ?Sized>(scene: &S, selected: &str, start_frame: i32) -> Result<Chain> {
    let parent = scene
        .parent_of(selected)
        .ok_or_else(|| SecondaryMotionError::NoParent {
            object: selected.to_string(),
        })?;

    let mut names = vec![parent, selected.to_string()];
    let mut current = selected.to_string();
    loop {
        let mut children = scene.transform_children(&current);
        if children.len() > 1 {
            return Err(SecondaryMotionError::DegenerateChain(format!(
                "{} has {} transform children, only serial chains are supported",
                current,
                children.len()
            )));
        }
        let Some(child) = children.pop() else {
            break;
        };
        // 层级有环时停在重复的名字上，交给 Chain::build_named 报错
        let repeated = names.contains(&child);
        names.push(child.clone());
        if repeated {
            break;
        }
        current = child;
    }

    let positions = names
        .iter()
        .map(|name| sample(scene, name, start_frame))
        .collect::<Result<Vec<_>>>()?;

    Chain::build_named(&names, &positions)
}

/// 预采样根物体在整个帧范围的轨道
pub fn sample_driver_track<S: SceneQuery + ?Sized>(
    scene: &S,
    root: &str,
    params: &SimulationParams,
) -> Result<DriverTrack> {
    DriverTrack::sample(params.start_frame, params.end_frame, |frame| sample(scene, root, frame))
}

/// 烘焙所有选中物体
///
/// 每个选中物体独立成链，彼此不共享状态，并行模拟；全部成功后才按帧递增写入。
pub fn bake_selection<S, K>(
    scene: &S,
    sink: &mut K,
    selection: &[String],
    params: &SimulationParams,
    mode: WriteMode,
) -> Result<BakeReport>
where
    S: SceneQuery + ?Sized,
    K: KeyframeSink + ?Sized,
{
    if selection.is_empty() {
        return Err(SecondaryMotionError::NoSelection);
    }
    params.validate()?;

    // 建链和采样都要访问宿主，串行完成
    let mut claimed = HashSet::new();
    let mut jobs = Vec::with_capacity(selection.len());
    for selected in selection {
        let chain = build_chain(scene, selected, params.start_frame)?;
        for link in chain.links() {
            if !claimed.insert(link.name.clone()) {
                return Err(SecondaryMotionError::DegenerateChain(format!(
                    "{} belongs to more than one selected chain",
                    link.name
                )));
            }
        }
        let track = sample_driver_track(scene, &chain.root_name, params)?;
        jobs.push((chain, track));
    }

    let chains = jobs
        .into_par_iter()
        .map(|(chain, track)| run(chain, &track, params))
        .collect::<Result<Vec<_>>>()?;

    // 帧递增写入；同一帧内所有链写完才进入下一帧
    let mut keys_written = 0;
    for index in 0..params.frame_count() {
        for baked in &chains {
            for (track, frame, position) in baked.frame_keys(index) {
                let value = match mode {
                    WriteMode::World => position,
                    WriteMode::OffsetFromRest => track.offset_from_rest(position),
                };
                if let Err(err) = sink.set_position_key(&track.name, frame, value) {
                    log::error!(
                        "[Bake] 写入 {} 第 {} 帧失败，已写入 {} 个关键帧: {}",
                        track.name,
                        frame,
                        keys_written,
                        err
                    );
                    return Err(err);
                }
                keys_written += 1;
            }
        }
    }

    log::info!(
        "[Bake] 完成: {} 条链, {} 个关键帧, 帧 {}..={}",
        chains.len(),
        keys_written,
        params.start_frame,
        params.end_frame
    );

    Ok(BakeReport { chains, keys_written })
}
