//! 译文回填
//!
//! 深拷贝原始文档树，按翻译编号把译文写回对应的文本节点。
//! 每个编号的结果最多被使用一次；没有结果的节点保留原文，Opaque 节点原样复制。

use std::collections::HashMap;

use crate::parsers::html::{Node, NodeKind};
use crate::translation::core::TranslatedText;

/// 生成回填译文后的新文档树，原始树不受影响
pub fn reassemble(original: &Node, results: &[TranslatedText]) -> Node {
    let mut by_id: HashMap<usize, &str> = results
        .iter()
        .map(|result| (result.id, result.translated.as_str()))
        .collect();

    let mut tree = original.clone();
    let applied = apply(&mut tree, &mut by_id);

    if !by_id.is_empty() {
        tracing::warn!("{} 条译文没有找到对应的文本节点", by_id.len());
    }
    tracing::debug!("回填 {} 条译文", applied);
    tree
}

fn apply(node: &mut Node, by_id: &mut HashMap<usize, &str>) -> usize {
    match node.kind {
        NodeKind::Opaque => 0,
        NodeKind::Text => match node.translation_id.and_then(|id| by_id.remove(&id)) {
            Some(translated) => {
                node.content = translated.to_string();
                1
            }
            None => 0,
        },
        NodeKind::Element => node
            .children
            .iter_mut()
            .map(|child| apply(child, by_id))
            .sum(),
    }
}
