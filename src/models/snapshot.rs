//! 文档快照
//!
//! 渲染客户端把页面序列化为一棵不可变的文本树，提取引擎只在这棵树上
//! 工作，与渲染时序完全解耦。节点按文档顺序存放在 arena 中，
//! 父/子/兄弟关系通过下标访问。

use serde::Deserialize;

/// arena 中的节点下标
pub type NodeId = usize;

/// 视为"图形容器"的标签，用于小数分类时向上寻找上下文边界
const CONTAINER_TAGS: &[&str] = &["div", "section", "article", "li", "td"];

/// 注入页面的 JS 序列化器产出的传输结构
#[derive(Debug, Clone, Deserialize)]
pub struct RawNode {
    pub tag: String,
    /// 节点自身的直接文本（不含后代），已折叠空白
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub children: Vec<RawNode>,
}

impl RawNode {
    pub fn new(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: text.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<RawNode>) -> Self {
        self.children = children;
        self
    }
}

/// 序列化器的顶层输出：页面标题 + body 树
#[derive(Debug, Clone, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub title: String,
    pub root: RawNode,
}

#[derive(Debug, Clone)]
struct NodeData {
    tag: String,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// 不可变的文档快照
///
/// 同一快照上的任何查询都是确定性的：没有网络、没有时钟、没有隐藏状态
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    title: String,
    nodes: Vec<NodeData>,
}

impl DocumentSnapshot {
    /// 把传输结构展平为 arena（先序遍历，即文档顺序）
    pub fn from_raw(raw: RawDocument) -> Self {
        let mut nodes = Vec::new();
        flatten(&raw.root, None, &mut nodes);
        Self {
            title: raw.title,
            nodes,
        }
    }

    /// 页面标题
    pub fn title(&self) -> &str {
        &self.title
    }

    /// 节点总数
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 按文档顺序遍历所有节点
    pub fn iter(&self) -> impl Iterator<Item = NodeId> {
        0..self.nodes.len()
    }

    /// 节点自身文本
    pub fn text(&self, id: NodeId) -> &str {
        &self.nodes[id].text
    }

    /// 节点标签（小写）
    pub fn tag(&self, id: NodeId) -> &str {
        &self.nodes[id].tag
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// 子树全文：自身文本 + 所有后代文本，按文档顺序以空格连接
    pub fn subtree_text(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        self.collect_text(id, &mut parts);
        parts.join(" ")
    }

    fn collect_text(&self, id: NodeId, parts: &mut Vec<String>) {
        let own = self.nodes[id].text.trim();
        if !own.is_empty() {
            parts.push(own.to_string());
        }
        for &child in &self.nodes[id].children {
            self.collect_text(child, parts);
        }
    }

    /// 第一个自身文本非空的 `<h1>` 节点
    pub fn first_heading(&self) -> Option<&str> {
        self.iter()
            .find(|&id| self.tag(id) == "h1" && !self.text(id).trim().is_empty())
            .map(|id| self.text(id))
    }

    /// 最近的图形容器祖先（div/section/article/li/td）
    pub fn nearest_container(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if CONTAINER_TAGS.contains(&self.tag(node)) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// 节点的兄弟（同一父节点下，不含自身），按文档顺序
    pub fn siblings(&self, id: NodeId) -> Vec<NodeId> {
        match self.parent(id) {
            Some(parent) => self
                .children(parent)
                .iter()
                .copied()
                .filter(|&sibling| sibling != id)
                .collect(),
            None => Vec::new(),
        }
    }

    /// 兄弟窗口：前 `before` 个 + 后 `after` 个兄弟元素，按文档顺序
    pub fn sibling_window(&self, id: NodeId, before: usize, after: usize) -> Vec<NodeId> {
        let Some(parent) = self.parent(id) else {
            return Vec::new();
        };
        let children = self.children(parent);
        let Some(pos) = children.iter().position(|&c| c == id) else {
            return Vec::new();
        };
        let start = pos.saturating_sub(before);
        let end = (pos + after + 1).min(children.len());
        children[start..end]
            .iter()
            .copied()
            .filter(|&c| c != id)
            .collect()
    }
}

fn flatten(raw: &RawNode, parent: Option<NodeId>, nodes: &mut Vec<NodeData>) -> NodeId {
    let id = nodes.len();
    nodes.push(NodeData {
        tag: raw.tag.to_lowercase(),
        text: raw.text.trim().to_string(),
        parent,
        children: Vec::new(),
    });
    for child in &raw.children {
        let child_id = flatten(child, Some(id), nodes);
        nodes[id].children.push(child_id);
    }
    id
}
