//! 链模拟驱动器
//!
//! 流程：new（校验参数 + 轨道范围）→ 每帧 [根位置 → 逐节点 积分 → 约束 → 提交]
//! → finish 输出 BakedMotion。
//!
//! 一帧内所有节点都成功后才提交输出和位置历史；任一节点失败，本帧不提交，
//! 模拟进入失败状态，之后的 step 都返回同一个错误。
//!
//! 帧之间、同一帧内节点之间都是依赖链，只能串行；多条链之间没有共享状态。

use crate::animation::{frame_at, BakedMotion, DriverTrack, LinkTrack};
use crate::chain::Chain;
use crate::math::{is_finite_vec, Vector3};
use crate::{Result, SecondaryMotionError};

use super::config::SimulationParams;
use super::constraint::DistanceConstraint;
use super::integrator::integrate;

/// 单条链的一次模拟（独占 Chain）
pub struct ChainSimulation<'a> {
    chain: Chain,
    track: &'a DriverTrack,
    params: SimulationParams,
    /// 已完成的帧数
    frames_done: usize,
    /// 失败后保留的错误
    failed: Option<SecondaryMotionError>,
    /// 本帧约束后的位置（全部成功后提交）
    scratch: Vec<Vector3>,
    /// 输出缓冲（每节点一条）
    outputs: Vec<LinkTrack>,
}

impl<'a> ChainSimulation<'a> {
    /// 创建模拟，参数非法或轨道不覆盖帧范围时失败
    pub fn new(chain: Chain, track: &'a DriverTrack, params: SimulationParams) -> Result<Self> {
        params.validate()?;
        track.ensure_covers(params.start_frame, params.end_frame)?;

        let frame_count = params.frame_count();
        let outputs = chain
            .links()
            .iter()
            .map(|link| LinkTrack {
                link_index: link.index,
                name: link.name.clone(),
                rest_position: link.rest_position,
                positions: Vec::with_capacity(frame_count),
            })
            .collect();

        Ok(Self {
            frames_done: 0,
            failed: None,
            scratch: Vec::with_capacity(chain.len()),
            chain,
            track,
            params,
            outputs,
        })
    }

    #[inline]
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    #[inline]
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// 是否已模拟完 end_frame
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.frames_done >= self.params.frame_count()
    }

    /// 模拟下一帧，返回该帧编号；已结束返回 None
    pub fn step(&mut self) -> Result<Option<i32>> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        if self.is_finished() {
            return Ok(None);
        }

        let result = match frame_at(self.params.start_frame, self.frames_done) {
            Some(frame) => self.solve_frame(frame).map(|()| frame),
            None => Err(SecondaryMotionError::InvalidParams(format!(
                "frame {} after {} is out of range",
                self.frames_done, self.params.start_frame
            ))),
        };

        match result {
            Ok(frame) => {
                self.commit();
                log::debug!("[Verlet] 第 {} 帧完成", frame);
                Ok(Some(frame))
            }
            Err(err) => {
                log::error!("[Verlet] 模拟失败: {}", err);
                self.failed = Some(err.clone());
                Err(err)
            }
        }
    }

    /// 计算一帧所有节点约束后的位置，写入 scratch，不动位置历史
    fn solve_frame(&mut self, frame: i32) -> Result<()> {
        let root_position = self.track.position(frame).ok_or(SecondaryMotionError::TrackRange {
            track_start: self.track.start_frame(),
            track_end: self.track.end_frame(),
            start: frame,
            end: frame,
        })?;

        self.scratch.clear();
        for i in 0..self.chain.len() {
            // scratch[i-1] 是驱动者本帧约束后的位置
            let driver = self.chain.driver_position(i, root_position, &self.scratch);
            let link = &mut self.chain.links_mut()[i];

            let candidate = integrate(link, driver, &self.params);
            if !is_finite_vec(candidate) {
                return Err(SecondaryMotionError::NonFinitePosition { link: i, frame });
            }

            let constrained = DistanceConstraint::apply(link, candidate, driver, frame)?;
            if !is_finite_vec(constrained) {
                return Err(SecondaryMotionError::NonFinitePosition { link: i, frame });
            }

            self.scratch.push(constrained);
        }
        Ok(())
    }

    /// 提交 scratch：写输出、推进历史
    fn commit(&mut self) {
        for ((link, output), &next) in self
            .chain
            .links_mut()
            .iter_mut()
            .zip(self.outputs.iter_mut())
            .zip(self.scratch.iter())
        {
            output.positions.push(next);
            link.advance(next);
        }
        self.frames_done += 1;
    }

    /// 跑完剩余帧，输出烘焙结果，Chain 随之丢弃
    pub fn finish(mut self) -> Result<BakedMotion> {
        while self.step()?.is_some() {}

        log::info!(
            "[Verlet] 模拟完成: 根={}, {} 个节点, 帧 {}..={}",
            self.chain.root_name,
            self.chain.len(),
            self.params.start_frame,
            self.params.end_frame
        );

        Ok(BakedMotion {
            root_name: self.chain.root_name.clone(),
            start_frame: self.params.start_frame,
            time_step: self.params.time_step,
            tracks: self.outputs,
        })
    }
}

/// 一次性跑完整个帧范围
///
/// 任一帧失败则整体失败，不返回部分结果。
pub fn run(chain: Chain, track: &DriverTrack, params: &SimulationParams) -> Result<BakedMotion> {
    ChainSimulation::new(chain, track, params.clone())?.finish()
}
