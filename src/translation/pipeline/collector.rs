//! 文本收集器模块
//!
//! 按先序深度优先顺序遍历文档树，为每个非空文本节点分配连续的翻译编号，
//! 并收集成 [`TranslationUnit`] 序列。Opaque 子树整体跳过。

use serde::Serialize;

use crate::parsers::html::{Node, NodeKind};

/// 一个待翻译的文本单元
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationUnit {
    pub id: usize,
    pub text: String,
}

/// 文本收集器
#[derive(Debug, Default)]
pub struct TextCollector {
    units: Vec<TranslationUnit>,
}

impl TextCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 遍历文档树并分配翻译编号
    ///
    /// 每次调用都是一次独立的抽取：编号从 0 开始，之前分配的编号会被覆盖。
    pub fn collect(mut self, root: &mut Node) -> Vec<TranslationUnit> {
        self.visit(root);
        tracing::debug!("收集到 {} 个翻译单元", self.units.len());
        self.units
    }

    fn visit(&mut self, node: &mut Node) {
        match node.kind {
            NodeKind::Opaque => {}
            NodeKind::Text => {
                let text = node.content.trim();
                if text.is_empty() {
                    node.translation_id = None;
                    return;
                }
                let id = self.units.len();
                node.translation_id = Some(id);
                self.units.push(TranslationUnit {
                    id,
                    text: text.to_string(),
                });
            }
            NodeKind::Element => {
                node.translation_id = None;
                for child in node.children.iter_mut() {
                    self.visit(child);
                }
            }
        }
    }
}

/// 抽取文档树中的翻译单元，没有可翻译内容时返回空序列
pub fn extract_units(root: &mut Node) -> Vec<TranslationUnit> {
    TextCollector::new().collect(root)
}
