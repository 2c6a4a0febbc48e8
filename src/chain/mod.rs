//! 链系统 - 参考 skeleton 的 BoneLink / BoneSet 拆分
//!
//! - ChainLink: 单个跟随节点（静态的静止状态 + 每帧历史）
//! - Chain: 从根到叶的有序节点序列，由起始帧快照构建

mod chain_link;
mod link_chain;

pub use chain_link::ChainLink;
pub use link_chain::Chain;
