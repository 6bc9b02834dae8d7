//! HTML 解析器模块
//!
//! 将 HTML 文本解析为结构模型 [`Node`]。
//!
//! ## 规则
//!
//! - 根节点对应 `<body>`
//! - script/style/pre/code 作为 `Opaque` 节点，保存原始内部标记，不再向下遍历
//! - 只包含空白的文本节点被丢弃；相邻的有效文本保持为独立节点，不做合并
//! - 注释、处理指令等非元素、非文本节点被丢弃
//!
//! ```rust
//! use page_translator::parsers::html::parse_html;
//!
//! let root = parse_html("<body><p>Hello</p><pre>code</pre></body>");
//! assert_eq!(root.tag_name(), Some("body"));
//! assert_eq!(root.children.len(), 2);
//! ```

use markup5ever_rcdom::{Handle, NodeData};

use super::dom::{get_body_node, get_node_attrs, get_node_name, html_to_dom, inner_html};
use super::model::{is_opaque_tag, Node};

/// 解析 HTML 文本，返回以 body 为根的文档树
pub fn parse_html(markup: &str) -> Node {
    let dom = html_to_dom(markup);

    match get_body_node(&dom) {
        Some(body) => build_element(&body, "body"),
        None => {
            // frameset 文档没有 body
            tracing::debug!("文档中没有 <body>，返回空的根节点");
            Node::element("body", Vec::new(), Vec::new())
        }
    }
}

fn build_element(handle: &Handle, tag: &str) -> Node {
    let attributes = get_node_attrs(handle);

    if is_opaque_tag(tag) {
        return Node::opaque(tag, attributes, inner_html(handle));
    }

    let children = handle
        .children
        .borrow()
        .iter()
        .filter_map(build_node)
        .collect();

    Node::element(tag, attributes, children)
}

fn build_node(handle: &Handle) -> Option<Node> {
    match handle.data {
        NodeData::Text { ref contents } => {
            let text = contents.borrow();
            if text.trim().is_empty() {
                None
            } else {
                Some(Node::text(&text))
            }
        }
        NodeData::Element { .. } => {
            let tag = get_node_name(handle)?;
            Some(build_element(handle, &tag))
        }
        _ => None,
    }
}
