//! 内存场景
//!
//! 宿主接口的内存实现：节点层级 + 世界空间位置关键帧，写入的关键帧
//! 按调用顺序记录。测试和 demo 用它代替真正的动画软件。

use std::collections::{BTreeMap, HashMap};

use crate::animation::interpolate_keyframes;
use crate::host::{KeyframeSink, SceneQuery};
use crate::math::Vector3;
use crate::Result;

/// 节点类型，只有变换节点参与建链
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Transform,
    Shape,
}

#[derive(Clone, Debug)]
struct SceneNode {
    kind: NodeKind,
    parent: Option<String>,
    children: Vec<String>,
    /// 没有关键帧时的位置
    rest: Vector3,
    /// 世界空间位置关键帧
    keys: BTreeMap<i32, Vector3>,
}

/// 写入的一条关键帧
#[derive(Clone, Debug, PartialEq)]
pub struct WrittenKey {
    pub object: String,
    pub frame: i32,
    pub position: Vector3,
}

/// 内存场景
#[derive(Clone, Debug, Default)]
pub struct MemoryScene {
    nodes: HashMap<String, SceneNode>,
    selection: Vec<String>,
    written: Vec<WrittenKey>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加节点，parent 必须已存在（不存在时作为根）
    pub fn add_node(&mut self, name: &str, kind: NodeKind, parent: Option<&str>, position: Vector3) {
        let parent = parent.filter(|p| self.nodes.contains_key(*p)).map(str::to_string);
        if let Some(ref p) = parent {
            if let Some(node) = self.nodes.get_mut(p) {
                node.children.push(name.to_string());
            }
        }
        self.nodes.insert(
            name.to_string(),
            SceneNode {
                kind,
                parent,
                children: Vec::new(),
                rest: position,
                keys: BTreeMap::new(),
            },
        );
    }

    /// 添加变换节点
    pub fn add_transform(&mut self, name: &str, parent: Option<&str>, position: Vector3) {
        self.add_node(name, NodeKind::Transform, parent, position);
    }

    /// 给节点设置世界位置关键帧（有关键帧后不再使用添加时的位置）
    pub fn set_key(&mut self, name: &str, frame: i32, position: Vector3) {
        if let Some(node) = self.nodes.get_mut(name) {
            node.keys.insert(frame, position);
        }
    }

    pub fn select(&mut self, names: &[&str]) {
        self.selection = names.iter().map(|n| n.to_string()).collect();
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// 按写入顺序的所有关键帧
    pub fn written_keys(&self) -> &[WrittenKey] {
        &self.written
    }

    /// 某物体写入的关键帧（帧, 值）
    pub fn written_for(&self, object: &str) -> Vec<(i32, Vector3)> {
        self.written
            .iter()
            .filter(|k| k.object == object)
            .map(|k| (k.frame, k.position))
            .collect()
    }

    /// 测试层级：PARENT > SELECT_THIS > test01 > test02 > test03，沿 y 每 2 个单位一节
    ///
    /// 每个变换下挂一个形状节点，选中 SELECT_THIS。
    pub fn vertical_test_hierarchy() -> Self {
        let mut scene = Self::new();
        let names = ["PARENT", "SELECT_THIS", "test01", "test02", "test03"];
        let mut parent: Option<&str> = None;
        for (i, &name) in names.iter().enumerate() {
            scene.add_transform(name, parent, Vector3::new(0.0, 2.0 * i as f64, 0.0));
            let shape = format!("{}Shape", name);
            scene.add_node(&shape, NodeKind::Shape, Some(name), Vector3::new(0.0, 2.0 * i as f64, 0.0));
            parent = Some(name);
        }
        scene.select(&["SELECT_THIS"]);
        scene
    }
}

impl SceneQuery for MemoryScene {
    fn parent_of(&self, object: &str) -> Option<String> {
        self.nodes.get(object)?.parent.clone()
    }

    fn transform_children(&self, object: &str) -> Vec<String> {
        let Some(node) = self.nodes.get(object) else {
            return Vec::new();
        };
        node.children
            .iter()
            .filter(|child| {
                self.nodes
                    .get(child.as_str())
                    .is_some_and(|n| n.kind == NodeKind::Transform)
            })
            .cloned()
            .collect()
    }

    fn world_position(&self, object: &str, frame: i32) -> Option<Vector3> {
        let node = self.nodes.get(object)?;
        if node.keys.is_empty() {
            Some(node.rest)
        } else {
            interpolate_keyframes(&node.keys, frame)
        }
    }
}

impl KeyframeSink for MemoryScene {
    fn set_position_key(&mut self, object: &str, frame: i32, position: Vector3) -> Result<()> {
        self.written.push(WrittenKey {
            object: object.to_string(),
            frame,
            position,
        });
        Ok(())
    }
}
