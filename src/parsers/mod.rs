//! # 解析器模块
//!
//! 页面标记的解析与序列化：
//!
//! - `html` - HTML文档解析、结构模型、序列化

pub mod html;

// Re-export commonly used items for convenience
pub use html::{parse_html, render_for_display, serialize_node, Node, NodeKind};
