//! 文档结构模型
//!
//! 页面被拆解为一棵与 DOM 解耦的节点树：
//!
//! - `Element`：结构性容器，只携带标签、属性和子节点
//! - `Text`：可翻译的文本，内容已去除首尾空白
//! - `Opaque`：原样保留的子树（script/style/pre/code），内容是原始内部标记
//!
//! 节点树可以自由克隆，翻译后的文档就是原始树的一个深拷贝。

use serde::Serialize;

/// 不参与翻译、按原样保留内部标记的标签
pub const OPAQUE_TAGS: &[&str] = &["script", "style", "pre", "code"];

/// 判断标签是否属于原样保留的集合
pub fn is_opaque_tag(tag: &str) -> bool {
    OPAQUE_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// 节点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Element,
    Text,
    Opaque,
}

/// 文档树节点
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    /// Element/Opaque 的标签名，Text 为 None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// 保持原始顺序的属性列表
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
    /// Text 为去除空白的文本；Opaque 为原始内部标记
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    /// 抽取时分配的翻译编号
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation_id: Option<usize>,
}

impl Node {
    pub fn element(tag: &str, attributes: Vec<(String, String)>, children: Vec<Node>) -> Self {
        Node {
            kind: NodeKind::Element,
            tag: Some(tag.to_string()),
            attributes,
            content: String::new(),
            children,
            translation_id: None,
        }
    }

    /// 创建文本节点，内容会被去除首尾空白
    pub fn text(content: &str) -> Self {
        Node {
            kind: NodeKind::Text,
            tag: None,
            attributes: Vec::new(),
            content: content.trim().to_string(),
            children: Vec::new(),
            translation_id: None,
        }
    }

    pub fn opaque(tag: &str, attributes: Vec<(String, String)>, inner_markup: String) -> Self {
        Node {
            kind: NodeKind::Opaque,
            tag: Some(tag.to_string()),
            attributes,
            content: inner_markup,
            children: Vec::new(),
            translation_id: None,
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    pub fn is_opaque(&self) -> bool {
        self.kind == NodeKind::Opaque
    }

    pub fn tag_name(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// 按先序深度优先顺序收集所有文本节点内容（跳过 Opaque）
    pub fn text_contents(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.visit_texts(&mut out);
        out
    }

    fn visit_texts<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self.kind {
            NodeKind::Text => out.push(&self.content),
            NodeKind::Opaque => {}
            NodeKind::Element => {
                for child in &self.children {
                    child.visit_texts(out);
                }
            }
        }
    }

    /// 比较两棵树的结构（标签、属性、子节点顺序、Opaque 内容），忽略文本内容
    pub fn same_structure(&self, other: &Node) -> bool {
        if self.kind != other.kind || self.tag != other.tag || self.attributes != other.attributes {
            return false;
        }
        if self.is_opaque() && self.content != other.content {
            return false;
        }
        self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(other.children.iter())
                .all(|(a, b)| a.same_structure(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_tags_are_case_insensitive() {
        assert!(is_opaque_tag("pre"));
        assert!(is_opaque_tag("SCRIPT"));
        assert!(!is_opaque_tag("p"));
        assert!(!is_opaque_tag("span"));
    }

    #[test]
    fn text_nodes_are_trimmed() {
        let node = Node::text("  Hello world \n");
        assert_eq!(node.content, "Hello world");
        assert!(node.tag.is_none());
        assert!(node.children.is_empty());
    }

    #[test]
    fn structure_comparison_ignores_text() {
        let a = Node::element("p", vec![("class".into(), "x".into())], vec![Node::text("Hello")]);
        let b = Node::element("p", vec![("class".into(), "x".into())], vec![Node::text("Bonjour")]);
        let c = Node::element("p", vec![("class".into(), "y".into())], vec![Node::text("Hello")]);

        assert!(a.same_structure(&b));
        assert!(!a.same_structure(&c));
    }
}
