// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::text_encoding::{decode_html, TextEncodingError};
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::debug;

/// 未找到标题时的占位值
pub const NO_TITLE: &str = "No Title Found";
/// 未找到正文时的占位值
pub const NO_CONTENT: &str = "No content found";
/// 正文候选的最少字符数
pub const MIN_CONTENT_CHARS: usize = 100;
/// 正文的最多字符数
pub const MAX_CONTENT_CHARS: usize = 2000;

/// 常见正文容器，按优先级排列
const CONTAINER_SELECTORS: &[&str] = &[
    "article",
    r#"[class*="content"]"#,
    r#"[class*="article"]"#,
    r#"[class*="post"]"#,
    "main",
    ".entry-content",
    "#content",
];

/// 其文本不计入正文的元素
const HIDDEN_ELEMENTS: &[&str] = &["script", "style"];

/// 提取错误类型
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error(transparent)]
    Decode(#[from] TextEncodingError),

    #[error("Invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },
}

/// 提取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub title: String,
    pub content: String,
}

/// 预编译的选择器
pub struct PageSelectors {
    title: Selector,
    heading: Selector,
    og_title: Selector,
    containers: Vec<Selector>,
    paragraph: Selector,
    body: Selector,
}

impl PageSelectors {
    fn compile() -> Result<Self, ExtractionError> {
        Ok(Self {
            title: compile("title")?,
            heading: compile("h1")?,
            og_title: compile(r#"meta[property="og:title"]"#)?,
            containers: CONTAINER_SELECTORS
                .iter()
                .map(|css| compile(css))
                .collect::<Result<_, _>>()?,
            paragraph: compile("p")?,
            body: compile("body")?,
        })
    }
}

fn compile(css: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(css).map_err(|e| ExtractionError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// 标题策略：返回非空标题或 `None`
pub type TitleStrategy = fn(&Html, &PageSelectors) -> Option<String>;
/// 正文策略：返回达到最小长度并已截断的正文或 `None`
pub type BodyStrategy = fn(&Html, &PageSelectors) -> Option<String>;

/// 标题策略，依次尝试，首个结果胜出
pub const TITLE_STRATEGIES: &[(&str, TitleStrategy)] = &[
    ("title", title_element as TitleStrategy),
    ("h1", first_heading as TitleStrategy),
    ("og:title", og_title as TitleStrategy),
];

/// 正文策略，依次尝试，首个结果胜出
pub const BODY_STRATEGIES: &[(&str, BodyStrategy)] = &[
    ("container", container_text as BodyStrategy),
    ("paragraphs", paragraph_text as BodyStrategy),
    ("body", body_text as BodyStrategy),
];

/// 内容提取器
///
/// 从HTML中提取标题和正文的纯函数组合，相同输入总是得到相同输出
pub struct ContentExtractor {
    selectors: PageSelectors,
}

impl ContentExtractor {
    /// 创建提取器并编译所有选择器
    pub fn new() -> Result<Self, ExtractionError> {
        Ok(Self {
            selectors: PageSelectors::compile()?,
        })
    }

    pub fn selectors(&self) -> &PageSelectors {
        &self.selectors
    }

    /// 从原始响应体中提取标题和正文
    ///
    /// # 参数
    ///
    /// * `raw` - 未解码的响应体
    ///
    /// # 返回值
    ///
    /// * `Ok(ExtractedContent)` - 标题和正文，找不到时为占位值
    /// * `Err(ExtractionError)` - 响应体无法解码为文本
    pub fn extract(&self, raw: &[u8]) -> Result<ExtractedContent, ExtractionError> {
        let text = decode_html(raw)?;
        let document = Html::parse_document(&text);

        Ok(ExtractedContent {
            title: self.extract_title(&document),
            content: self.extract_body(&document),
        })
    }

    pub fn extract_title(&self, document: &Html) -> String {
        TITLE_STRATEGIES
            .iter()
            .find_map(|(name, strategy)| {
                let title = strategy(document, &self.selectors)?;
                debug!(strategy = name, "Extracted title");
                Some(title)
            })
            .unwrap_or_else(|| {
                debug!("Could not extract title");
                NO_TITLE.to_string()
            })
    }

    pub fn extract_body(&self, document: &Html) -> String {
        BODY_STRATEGIES
            .iter()
            .find_map(|(name, strategy)| {
                let body = strategy(document, &self.selectors)?;
                debug!(strategy = name, chars = body.chars().count(), "Extracted content");
                Some(body)
            })
            .unwrap_or_else(|| {
                debug!("Could not extract meaningful content");
                NO_CONTENT.to_string()
            })
    }
}

/// `<title>` 元素
pub fn title_element(document: &Html, selectors: &PageSelectors) -> Option<String> {
    document
        .select(&selectors.title)
        .next()
        .map(visible_text)
        .and_then(non_empty)
}

/// 第一个 `<h1>`
pub fn first_heading(document: &Html, selectors: &PageSelectors) -> Option<String> {
    document
        .select(&selectors.heading)
        .next()
        .map(visible_text)
        .and_then(non_empty)
}

/// `og:title` 元信息
pub fn og_title(document: &Html, selectors: &PageSelectors) -> Option<String> {
    document
        .select(&selectors.og_title)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(collapse_whitespace)
        .and_then(non_empty)
}

/// 每个容器选择器只看第一个匹配元素
pub fn container_text(document: &Html, selectors: &PageSelectors) -> Option<String> {
    selectors.containers.iter().find_map(|selector| {
        document
            .select(selector)
            .next()
            .and_then(|element| qualify(visible_text(element)))
    })
}

/// 所有段落以空格连接
pub fn paragraph_text(document: &Html, selectors: &PageSelectors) -> Option<String> {
    let joined = document
        .select(&selectors.paragraph)
        .map(visible_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    qualify(joined)
}

/// 整个 `<body>` 的文本
pub fn body_text(document: &Html, selectors: &PageSelectors) -> Option<String> {
    document
        .select(&selectors.body)
        .next()
        .and_then(|body| qualify(visible_text(body)))
}

/// 元素的可见文本，忽略脚本和样式，空白折叠为单个空格
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut fragments = Vec::new();
    collect_text(element, &mut fragments);
    fragments
        .iter()
        .flat_map(|fragment| fragment.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 显式栈上的先序遍历，嵌套深度不受调用栈限制
fn collect_text<'a>(element: ElementRef<'a>, fragments: &mut Vec<&'a str>) {
    let mut stack: Vec<_> = element.children().rev().collect();

    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(text) => fragments.push(text),
            Node::Element(child) if HIDDEN_ELEMENTS.contains(&child.name()) => {}
            Node::Element(_) => stack.extend(node.children().rev()),
            _ => {}
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

/// 截断到最大长度后检查最小长度
fn qualify(text: String) -> Option<String> {
    let capped = truncate_chars(&text, MAX_CONTENT_CHARS);
    (capped.chars().count() >= MIN_CONTENT_CHARS).then(|| capped.to_string())
}

/// 按字符截断，不会切开多字节字符
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
#[path = "extraction_service_test.rs"]
mod tests;
