//! 烘焙结果
//!
//! 驱动器输出：每个链节点一条位置序列，按帧索引，交给宿主写关键帧。

use crate::math::Vector3;

use super::driver_track::{frame_at, frame_index};

/// 单个节点的烘焙轨道
#[derive(Debug, Clone, PartialEq)]
pub struct LinkTrack {
    /// 链内索引
    pub link_index: usize,
    /// 宿主物体名称
    pub name: String,
    /// 起始帧位置（冻结变换偏移用）
    pub rest_position: Vector3,
    /// positions[i] 对应 start_frame + i
    pub positions: Vec<Vector3>,
}

impl LinkTrack {
    /// 相对静止位置的偏移（冻结变换的物体需要写这个）
    #[inline]
    pub fn offset_from_rest(&self, position: Vector3) -> Vector3 {
        position - self.rest_position
    }
}

/// 整条链的烘焙结果
#[derive(Debug, Clone, PartialEq)]
pub struct BakedMotion {
    /// 根物体名称
    pub root_name: String,
    /// 起始帧
    pub start_frame: i32,
    /// 时间步长（速度计算用）
    pub time_step: f64,
    /// 每个节点一条轨道，按链顺序
    pub tracks: Vec<LinkTrack>,
}

impl BakedMotion {
    /// 帧数
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.tracks.first().map_or(0, |t| t.positions.len())
    }

    /// 最后一帧（没有帧时为 start_frame - 1，超出 i32 范围时截断）
    #[inline]
    pub fn end_frame(&self) -> i32 {
        let end = i64::from(self.start_frame) + self.frame_count() as i64 - 1;
        end.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }

    #[inline]
    pub fn link_count(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn track(&self, link: usize) -> Option<&LinkTrack> {
        self.tracks.get(link)
    }

    /// 节点在某帧的位置
    pub fn position(&self, link: usize, frame: i32) -> Option<Vector3> {
        self.tracks
            .get(link)?
            .positions
            .get(frame_index(self.start_frame, frame)?)
            .copied()
    }

    /// 有限差分速度 (p[frame] - p[frame - 1]) / dt
    ///
    /// 第一帧没有前一帧，返回 None。
    pub fn velocity(&self, link: usize, frame: i32) -> Option<Vector3> {
        let current = self.position(link, frame)?;
        let previous = self.position(link, frame.checked_sub(1)?)?;
        Some((current - previous) / self.time_step)
    }

    /// 第 index 帧（从 start_frame 数）的所有关键帧 (节点轨道, 帧, 位置)，按链顺序
    pub fn frame_keys(&self, index: usize) -> impl Iterator<Item = (&LinkTrack, i32, Vector3)> + '_ {
        let frame = frame_at(self.start_frame, index);
        self.tracks
            .iter()
            .filter_map(move |track| Some((track, frame?, *track.positions.get(index)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BakedMotion {
        BakedMotion {
            root_name: "root".to_string(),
            start_frame: 10,
            time_step: 0.5,
            tracks: vec![LinkTrack {
                link_index: 0,
                name: "a".to_string(),
                rest_position: Vector3::new(0.0, 2.0, 0.0),
                positions: vec![
                    Vector3::new(0.0, 2.0, 0.0),
                    Vector3::new(1.0, 2.0, 0.0),
                    Vector3::new(3.0, 2.0, 0.0),
                ],
            }],
        }
    }

    #[test]
    fn test_lookup() {
        let baked = sample();
        assert_eq!(baked.frame_count(), 3);
        assert_eq!(baked.end_frame(), 12);
        assert_eq!(baked.position(0, 11), Some(Vector3::new(1.0, 2.0, 0.0)));
        assert_eq!(baked.position(0, 9), None);
        assert_eq!(baked.position(1, 10), None);
    }

    #[test]
    fn test_velocity() {
        let baked = sample();
        assert_eq!(baked.velocity(0, 10), None);
        assert_eq!(baked.velocity(0, 12), Some(Vector3::new(4.0, 0.0, 0.0)));
    }

    #[test]
    fn test_offsets_and_frame_keys() {
        let baked = sample();
        let track = &baked.tracks[0];
        assert_eq!(track.offset_from_rest(track.positions[2]), Vector3::new(3.0, 0.0, 0.0));

        let keys: Vec<(i32, Vector3)> = baked.frame_keys(1).map(|(_, f, p)| (f, p)).collect();
        assert_eq!(keys, vec![(11, Vector3::new(1.0, 2.0, 0.0))]);
        assert_eq!(baked.frame_keys(3).count(), 0);
    }

    #[test]
    fn test_lookup_at_i32_limits() {
        let mut baked = sample();
        baked.start_frame = i32::MAX - 2;
        assert_eq!(baked.end_frame(), i32::MAX);
        assert_eq!(baked.position(0, i32::MAX), Some(Vector3::new(3.0, 2.0, 0.0)));
        assert_eq!(baked.position(0, i32::MIN), None);
        assert_eq!(baked.frame_keys(2).next().map(|(_, f, _)| f), Some(i32::MAX));

        baked.start_frame = i32::MIN;
        assert_eq!(baked.velocity(0, i32::MIN), None);
        assert_eq!(baked.velocity(0, i32::MIN + 1), Some(Vector3::new(2.0, 0.0, 0.0)));
    }
}
