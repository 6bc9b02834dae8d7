//! HTML解析和处理模块
//!
//! - `dom`: html5ever/rcdom 上的基础 DOM 操作
//! - `model`: 与 DOM 解耦的文档结构模型
//! - `parser`: 从 HTML 文本构建结构模型
//! - `serializer`: 将结构模型写回 HTML

pub mod dom;
pub mod model;
pub mod parser;
pub mod serializer;

pub use dom::{get_body_node, get_child_node_by_name, html_to_dom, inner_html};
pub use model::{is_opaque_tag, Node, NodeKind, OPAQUE_TAGS};
pub use parser::parse_html;
pub use serializer::{render_for_display, serialize_node};
