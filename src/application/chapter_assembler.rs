// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::models::novel::{ChapterContent, ChapterRef};

use super::search_orchestrator::SearchOrchestrator;

/// 组装完成的全文文档
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub title: String,
    pub sections: Vec<ChapterContent>,
}

impl AssembledDocument {
    /// 渲染为纯文本下载格式
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for section in &self.sections {
            text.push_str(&format!("\n\n{}\n\n{}\n", section.chapter.title, section.body));
        }
        text
    }
}

/// 章节组装器
///
/// 严格按输入顺序逐章抓取并拼接，输入顺序即成文顺序，永不重排。
/// 单章失败以内联占位文本顶替，任务从不因个别章节中止：
/// 输出的分节数恒等于输入的章节数。每处理完一章发出
/// "processed k of n" 进度信号。
pub struct ChapterAssembler {
    orchestrator: Arc<SearchOrchestrator>,
}

impl ChapterAssembler {
    pub fn new(orchestrator: Arc<SearchOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn assemble(&self, title: &str, chapters: &[ChapterRef]) -> AssembledDocument {
        self.assemble_with_progress(title, chapters, |_, _| {}).await
    }

    /// 组装并在每章完成后回调进度
    pub async fn assemble_with_progress<F>(
        &self,
        title: &str,
        chapters: &[ChapterRef],
        mut progress: F,
    ) -> AssembledDocument
    where
        F: FnMut(usize, usize),
    {
        let total = chapters.len();
        let mut sections = Vec::with_capacity(total);

        for (index, chapter) in chapters.iter().enumerate() {
            let section = match self.orchestrator.fetch_content(&chapter.link).await {
                Ok(body) if !body.trim().is_empty() => ChapterContent::ok(chapter.clone(), body),
                Ok(_) => {
                    warn!(chapter = %chapter.title, "chapter content empty");
                    ChapterContent::failure(chapter.clone(), "内容为空")
                }
                Err(e) => {
                    warn!(chapter = %chapter.title, error = %e, "chapter fetch failed");
                    ChapterContent::failure(chapter.clone(), &e.to_string())
                }
            };
            sections.push(section);

            let processed = index + 1;
            info!(title, processed, total, "assembling chapters");
            progress(processed, total);
        }

        AssembledDocument {
            title: title.to_string(),
            sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{OrchestratorError, StorageError};
    use crate::domain::models::source::{SelectorMap, SourceDefinition};
    use crate::domain::repositories::registry_repository::RegistryRepository;
    use crate::domain::services::source_registry::SourceRegistry;
    use crate::engines::fetcher::{FetchOptions, Fetcher};
    use crate::infrastructure::cache::result_cache::ResultCache;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct NullRepo;

    #[async_trait]
    impl RegistryRepository for NullRepo {
        async fn load(&self) -> Result<Vec<SourceDefinition>, StorageError> {
            Ok(Vec::new())
        }
        async fn save(&self, _sources: &[SourceDefinition]) -> Result<(), StorageError> {
            Ok(())
        }
    }

    /// 章节URL含 `broken` 时失败，其余返回固定正文页
    struct ChapterFetcher;

    #[async_trait]
    impl Fetcher for ChapterFetcher {
        async fn fetch_html(
            &self,
            url: &str,
            _options: &FetchOptions,
        ) -> Result<String, OrchestratorError> {
            if url.contains("broken") {
                return Err(OrchestratorError::FetchFailed("unreachable".to_string()));
            }
            Ok(r#"<div class="chapter-content"><p>正文内容。</p></div>"#.to_string())
        }
    }

    async fn assembler() -> ChapterAssembler {
        let registry = Arc::new(
            SourceRegistry::load(
                Arc::new(NullRepo),
                vec![SourceDefinition::new(
                    "万书网",
                    "https://www.10000txt.com",
                    "/s?q={keyword}",
                    SelectorMap::default(),
                )],
                true,
            )
            .await
            .unwrap(),
        );
        let orchestrator = Arc::new(SearchOrchestrator::new(
            registry,
            Arc::new(ChapterFetcher),
            Arc::new(ResultCache::new(Duration::from_secs(3600))),
            Duration::from_secs(30),
        ));
        ChapterAssembler::new(orchestrator)
    }

    fn chapter(title: &str, link: &str) -> ChapterRef {
        ChapterRef {
            title: title.to_string(),
            link: link.to_string(),
        }
    }

    #[tokio::test]
    async fn test_one_section_per_chapter_in_order() {
        let assembler = assembler().await;
        let chapters = vec![
            chapter("第一章", "https://www.10000txt.com/book/1/c1"),
            chapter("第二章", "https://www.10000txt.com/book/1/broken"),
            chapter("第三章", "https://www.10000txt.com/book/1/c3"),
        ];

        let document = assembler.assemble("斗破苍穹", &chapters).await;

        assert_eq!(document.sections.len(), chapters.len());
        let titles: Vec<_> = document
            .sections
            .iter()
            .map(|s| s.chapter.title.as_str())
            .collect();
        assert_eq!(titles, vec!["第一章", "第二章", "第三章"]);

        assert!(!document.sections[0].failed);
        assert!(document.sections[1].failed);
        assert!(document.sections[1].body.starts_with("[获取内容失败:"));
        assert!(!document.sections[2].failed);
    }

    #[tokio::test]
    async fn test_all_failures_still_yield_full_document() {
        let assembler = assembler().await;
        let chapters: Vec<_> = (1..=4)
            .map(|i| {
                chapter(
                    &format!("第{}章", i),
                    &format!("https://www.10000txt.com/broken/{}", i),
                )
            })
            .collect();

        let document = assembler.assemble("斗破苍穹", &chapters).await;

        assert_eq!(document.sections.len(), 4);
        assert!(document.sections.iter().all(|s| s.failed));
    }

    #[tokio::test]
    async fn test_progress_reported_per_chapter() {
        let assembler = assembler().await;
        let chapters = vec![
            chapter("第一章", "https://www.10000txt.com/c1"),
            chapter("第二章", "https://www.10000txt.com/c2"),
        ];

        let seen = Mutex::new(Vec::new());
        assembler
            .assemble_with_progress("斗破苍穹", &chapters, |done, total| {
                seen.lock().unwrap().push((done, total));
            })
            .await;

        assert_eq!(*seen.lock().unwrap(), vec![(1, 2), (2, 2)]);
    }

    #[tokio::test]
    async fn test_to_text_matches_download_format() {
        let assembler = assembler().await;
        let chapters = vec![chapter("第一章", "https://www.10000txt.com/c1")];

        let document = assembler.assemble("斗破苍穹", &chapters).await;
        assert_eq!(document.to_text(), "\n\n第一章\n\n正文内容。\n");
    }

    // fetch_content 对无法归属书源的URL报 InvalidSource，
    // 组装器应将其转为占位而不是中止
    #[tokio::test]
    async fn test_unknown_host_becomes_placeholder() {
        let assembler = assembler().await;
        let chapters = vec![chapter("第一章", "https://unknown.example.com/c1")];

        let document = assembler.assemble("斗破苍穹", &chapters).await;
        assert_eq!(document.sections.len(), 1);
        assert!(document.sections[0].failed);
    }
}
