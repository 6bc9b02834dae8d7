//! URL 工具函数

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
pub use url::Url;

/// 与浏览器 `encodeURIComponent` 等价的编码集合：
/// 除 `A-Z a-z 0-9 - _ . ! ~ * ' ( )` 之外全部编码
const URI_COMPONENT_SET: &AsciiSet = &CONTROLS
    .add(b' ').add(b'"').add(b'<').add(b'>').add(b'`')
    .add(b':').add(b'/').add(b'?').add(b'#').add(b'[').add(b']').add(b'@')
    .add(b'$').add(b'&').add(b'+').add(b',').add(b';').add(b'=')
    .add(b'%').add(b'{').add(b'}').add(b'|').add(b'\\').add(b'^');

/// 编码作为查询参数传递的 URL
pub fn encode_uri_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT_SET).to_string()
}

/// 检查字符串是否为带 http/https 协议的绝对 URL
pub fn is_url_and_has_protocol(input: &str) -> bool {
    parse_http_url(input).is_some()
}

/// 解析绝对 http(s) URL，其他协议或格式错误返回 None
pub fn parse_http_url(input: &str) -> Option<Url> {
    let parsed = Url::parse(input.trim()).ok()?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Some(parsed),
        _ => None,
    }
}

/// 基于 `from` 解析相对地址，失败时原样返回
pub fn resolve_url(from: &Url, to: &str) -> String {
    match from.join(to) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => to.to_string(),
    }
}
