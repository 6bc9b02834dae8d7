//! 文档树序列化
//!
//! - [`serialize_node`]：忠实地把节点树写回 HTML，Opaque 节点原样输出
//! - [`render_for_display`]：供并排展示使用，去掉 script/style/meta/link，
//!   并把以 `/` 开头的图片地址解析为页面域名下的绝对地址

use crate::utils::url::{resolve_url, Url};

use super::model::{Node, NodeKind};

/// 无需闭合标签的元素
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// 展示时跳过的元素
const DISPLAY_SKIPPED: &[&str] = &["script", "style", "meta", "link"];

/// 序列化节点树
pub fn serialize_node(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node, None);
    out
}

/// 按展示规则序列化节点树
pub fn render_for_display(node: &Node, page_url: Option<&Url>) -> String {
    let mut out = String::new();
    write_node(&mut out, node, Some(DisplayRules { page_url }));
    out
}

#[derive(Clone, Copy)]
struct DisplayRules<'a> {
    page_url: Option<&'a Url>,
}

fn write_node(out: &mut String, node: &Node, display: Option<DisplayRules>) {
    match node.kind {
        NodeKind::Text => escape_text(out, &node.content),
        NodeKind::Opaque => {
            let tag = node.tag_name().unwrap_or("div");
            if display.is_some() && DISPLAY_SKIPPED.contains(&tag) {
                return;
            }
            write_start_tag(out, tag, &node.attributes, display);
            out.push_str(&node.content);
            write_end_tag(out, tag);
        }
        NodeKind::Element => {
            let Some(tag) = node.tag_name() else {
                return;
            };
            if display.is_some() && DISPLAY_SKIPPED.contains(&tag) {
                return;
            }
            write_start_tag(out, tag, &node.attributes, display);
            if VOID_ELEMENTS.contains(&tag) {
                return;
            }
            for child in &node.children {
                write_node(out, child, display);
            }
            write_end_tag(out, tag);
        }
    }
}

fn write_start_tag(
    out: &mut String,
    tag: &str,
    attributes: &[(String, String)],
    display: Option<DisplayRules>,
) {
    out.push('<');
    out.push_str(tag);
    for (name, value) in attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        match display.and_then(|rules| rules.page_url) {
            Some(page_url) if tag == "img" && name == "src" && value.starts_with('/') => {
                escape_attr(out, &resolve_url(page_url, value));
            }
            _ => escape_attr(out, value),
        }
        out.push('"');
    }
    out.push('>');
}

fn write_end_tag(out: &mut String, tag: &str) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn escape_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

fn escape_attr(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::parse_html;

    #[test]
    fn serializes_elements_text_and_opaque() {
        let root = parse_html(r#"<body><p class="a">1 &lt; 2 &amp; 3</p><pre><i>x</i></pre><br></body>"#);
        assert_eq!(
            serialize_node(&root),
            r#"<body><p class="a">1 &lt; 2 &amp; 3</p><pre><i>x</i></pre><br></body>"#
        );
    }

    #[test]
    fn escapes_quotes_in_attributes() {
        let node = Node::element("a", vec![("title".into(), "say \"hi\"".into())], vec![Node::text("x")]);
        assert_eq!(serialize_node(&node), r#"<a title="say &quot;hi&quot;">x</a>"#);
    }

    #[test]
    fn display_rendering_skips_scripts_and_resolves_images() {
        let root = parse_html(
            r#"<body><script>alert(1)</script><img src="/logo.png"><img src="rel.png"><p>t</p></body>"#,
        );
        let page = Url::parse("https://example.com/docs/index.html").unwrap();

        assert_eq!(
            render_for_display(&root, Some(&page)),
            r#"<body><img src="https://example.com/logo.png"><img src="rel.png"><p>t</p></body>"#
        );
    }
}
