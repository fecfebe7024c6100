// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::domain::models::novel::{ChapterRef, NovelRecord};
use crate::domain::models::source::{FieldRule, SelectorMap};
use crate::utils::url_utils;

/// 从搜索结果页抽取小说记录
///
/// 完全由书源的选择器映射驱动。标题去除空白后为空的条目被丢弃；
/// 可选字段（作者、封面、简介）缺失时取空字符串；
/// `link`/`cover` 相对地址会解析为以 `base_url` 为基准的绝对地址。
pub fn extract_list(
    html: &str,
    selectors: &SelectorMap,
    base_url: &Url,
    source_name: &str,
) -> Vec<NovelRecord> {
    let item_selector = match Selector::parse(&selectors.list_item) {
        Ok(s) => s,
        Err(e) => {
            debug!(selector = %selectors.list_item, error = %e, "invalid list item selector");
            return Vec::new();
        }
    };

    let document = Html::parse_document(html);
    let mut records = Vec::new();

    for item in document.select(&item_selector) {
        let title = field_value(item, &selectors.title);
        if title.is_empty() {
            continue;
        }

        let link = absolutize(base_url, &field_value(item, &selectors.link));
        let cover = selectors
            .cover
            .as_ref()
            .map(|rule| absolutize(base_url, &field_value(item, rule)))
            .unwrap_or_default();
        let author = selectors
            .author
            .as_ref()
            .map(|rule| field_value(item, rule))
            .unwrap_or_default();
        let description = selectors
            .description
            .as_ref()
            .map(|rule| field_value(item, rule))
            .unwrap_or_default();

        records.push(NovelRecord {
            title,
            author,
            cover,
            description,
            link,
            source: source_name.to_string(),
        });
    }

    records
}

/// 从目录页抽取章节列表，保持文档顺序
pub fn extract_chapters(html: &str, selectors: &SelectorMap, base_url: &Url) -> Vec<ChapterRef> {
    let item_selector = match Selector::parse(&selectors.chapter_item.selector) {
        Ok(s) => s,
        Err(e) => {
            debug!(selector = %selectors.chapter_item.selector, error = %e, "invalid chapter selector");
            return Vec::new();
        }
    };
    let link_attr = selectors.chapter_item.attr.as_deref().unwrap_or("href");

    let document = Html::parse_document(html);
    let mut chapters = Vec::new();

    for element in document.select(&item_selector) {
        let title = element.text().collect::<Vec<_>>().join(" ").trim().to_string();
        let href = element.value().attr(link_attr).unwrap_or_default().trim();
        if title.is_empty() || href.is_empty() {
            continue;
        }
        chapters.push(ChapterRef {
            title,
            link: absolutize(base_url, href),
        });
    }

    chapters
}

/// 从章节页抽取正文纯文本
pub fn extract_content(html: &str, selectors: &SelectorMap) -> String {
    let content_selector = match Selector::parse(&selectors.content) {
        Ok(s) => s,
        Err(e) => {
            debug!(selector = %selectors.content, error = %e, "invalid content selector");
            return String::new();
        }
    };

    let document = Html::parse_document(html);
    let mut blocks = Vec::new();

    for element in document.select(&content_selector) {
        let text = element
            .text()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        if !text.is_empty() {
            blocks.push(text);
        }
    }

    blocks.join("\n\n")
}

fn field_value(item: ElementRef<'_>, rule: &FieldRule) -> String {
    let selector = match Selector::parse(&rule.selector) {
        Ok(s) => s,
        Err(_) => return String::new(),
    };
    let Some(element) = item.select(&selector).next() else {
        return String::new();
    };

    let raw = match &rule.attr {
        Some(attr) => element.value().attr(attr).unwrap_or_default().to_string(),
        None => element.text().collect::<Vec<_>>().join(" "),
    };
    let trimmed = raw.trim();

    match &rule.strip_prefix {
        Some(prefix) => trimmed.trim_start_matches(prefix.as_str()).trim().to_string(),
        None => trimmed.to_string(),
    }
}

/// 相对地址绝对化，已是绝对地址则原样通过，空值保持为空
fn absolutize(base_url: &Url, value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    match url_utils::resolve_url(base_url, value) {
        Ok(url) => url.to_string(),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.10000txt.com").unwrap()
    }

    const SEARCH_PAGE: &str = r#"
        <html><body>
          <ul class="book-list">
            <li>
              <div class="book-img"><img src="/covers/1.jpg"></div>
              <h4><a href="/book/1">斗破苍穹</a></h4>
              <p class="author">作者：天蚕土豆</p>
              <p class="intro">三十年河东，三十年河西。</p>
            </li>
            <li>
              <h4><a href="/book/2">   </a></h4>
              <p class="author">作者：佚名</p>
            </li>
            <li>
              <h4><a href="https://other.site/book/3">吞噬星空</a></h4>
              <p class="intro">宇宙时代。</p>
            </li>
          </ul>
        </body></html>
    "#;

    #[test]
    fn test_extract_list_skips_empty_titles_and_absolutizes() {
        let records = extract_list(SEARCH_PAGE, &SelectorMap::default(), &base(), "万书网");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "斗破苍穹");
        assert_eq!(records[0].source, "万书网");
        assert_eq!(records[0].link, "https://www.10000txt.com/book/1");
        assert_eq!(records[0].cover, "https://www.10000txt.com/covers/1.jpg");
        assert_eq!(records[0].author, "天蚕土豆");
        assert_eq!(records[0].description, "三十年河东，三十年河西。");

        // 已是绝对地址的链接原样通过
        assert_eq!(records[1].link, "https://other.site/book/3");
        assert_eq!(records[1].author, "");
        assert_eq!(records[1].cover, "");
    }

    #[test]
    fn test_extract_chapters_preserves_order() {
        let html = r#"
            <div class="chapter-list">
              <a href="/book/1/c3">第三章</a>
              <a href="/book/1/c1">第一章</a>
              <a href="/book/1/c2">第二章</a>
              <a href="">无效章节</a>
            </div>
        "#;
        let chapters = extract_chapters(html, &SelectorMap::default(), &base());

        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[0].title, "第三章");
        assert_eq!(chapters[0].link, "https://www.10000txt.com/book/1/c3");
        assert_eq!(chapters[1].title, "第一章");
        assert_eq!(chapters[2].title, "第二章");
    }

    #[test]
    fn test_extract_content_joins_paragraphs() {
        let html = r#"
            <div class="chapter-content">
              <p>第一段。</p>
              <p>  第二段。  </p>
              <p></p>
            </div>
        "#;
        let content = extract_content(html, &SelectorMap::default());
        assert_eq!(content, "第一段。\n第二段。");
    }

    #[test]
    fn test_invalid_selector_yields_empty() {
        let mut selectors = SelectorMap::default();
        selectors.list_item = ":::not-a-selector".to_string();
        assert!(extract_list(SEARCH_PAGE, &selectors, &base(), "万书网").is_empty());
    }
}
