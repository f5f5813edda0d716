//! Outline generation with a multi-source fallback chain.
//!
//! Template, retrieval and topic lookups run concurrently, each behind its
//! own failure boundary. Synthesis then runs with whatever arrived; if it
//! fails or times out the outline is built from the template instead. No
//! stage failure reaches the caller.

use std::sync::Arc;
use std::time::Duration;

use sessioncraft_domain::{
    convert_legacy_to_flexible, FlexibleSessionOutline, OutlineBrief, Provenance,
    SessionTemplate, TemplateId, Topic,
};

use crate::infrastructure::ports::{ClockPort, LlmPort, RagPort, RagResult, TopicRepo};
use crate::use_cases::templates::TemplateRegistry;

use super::fallback::build_fallback_outline;
use super::keywords::extract_keywords;
use super::synthesis::OutlineSynthesizer;

/// Stage timeouts and search limits for generation.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Bound on the availability probe and on the query, each.
    pub rag_timeout: Duration,
    /// Bound on the whole synthesis call, retries included.
    pub llm_timeout: Duration,
    pub topic_limit: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            rag_timeout: Duration::from_secs(5),
            llm_timeout: Duration::from_secs(60),
            topic_limit: 10,
        }
    }
}

/// Tagged result of one pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Available(T),
    /// The source answered but had nothing to contribute.
    Unavailable,
    Failed(String),
}

impl<T> StageOutcome<T> {
    pub fn available(&self) -> Option<&T> {
        match self {
            Self::Available(value) => Some(value),
            Self::Unavailable | Self::Failed(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// Retrieval stage result plus the provenance it determines.
#[derive(Debug)]
struct RagStage {
    available: bool,
    queried: bool,
    outcome: StageOutcome<RagResult>,
}

impl RagStage {
    fn skipped(outcome: StageOutcome<RagResult>) -> Self {
        Self {
            available: false,
            queried: false,
            outcome,
        }
    }
}

/// What a generation produced and which sources contributed.
#[derive(Debug, Clone)]
pub struct GeneratedOutline {
    pub outline: FlexibleSessionOutline,
    pub relevant_topics: Vec<Topic>,
    pub provenance: Provenance,
}

/// Inputs gathered before synthesis.
struct Gathered {
    template: Arc<SessionTemplate>,
    rag: RagStage,
    topics: Vec<Topic>,
}

#[derive(Clone, Copy)]
enum Mode {
    Flexible,
    Legacy,
}

pub struct GenerateOutline {
    topics: Arc<dyn TopicRepo>,
    rag: Arc<dyn RagPort>,
    synthesizer: OutlineSynthesizer,
    templates: Arc<TemplateRegistry>,
    clock: Arc<dyn ClockPort>,
    config: GenerationConfig,
}

impl GenerateOutline {
    pub fn new(
        topics: Arc<dyn TopicRepo>,
        rag: Arc<dyn RagPort>,
        llm: Arc<dyn LlmPort>,
        templates: Arc<TemplateRegistry>,
        clock: Arc<dyn ClockPort>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            topics,
            rag,
            synthesizer: OutlineSynthesizer::new(llm),
            templates,
            clock,
            config,
        }
    }

    /// Generate a flexible outline. Never fails; the worst case is the
    /// template-seeded fallback with `fallback_used` set.
    pub async fn execute(
        &self,
        brief: &OutlineBrief,
        template_id: Option<TemplateId>,
    ) -> GeneratedOutline {
        self.run(brief, template_id, Mode::Flexible).await
    }

    /// Same sources, but synthesis produces the four-slot legacy shape which
    /// is then converted forward.
    pub async fn execute_legacy(&self, brief: &OutlineBrief) -> GeneratedOutline {
        self.run(brief, None, Mode::Legacy).await
    }

    async fn run(
        &self,
        brief: &OutlineBrief,
        template_id: Option<TemplateId>,
        mode: Mode,
    ) -> GeneratedOutline {
        let keywords = extract_keywords(&brief.keyword_source_text());
        let gathered = self.gather(brief, template_id, &keywords).await;

        let rag_content = gathered.rag.outcome.available();
        let synthesized = match mode {
            Mode::Flexible => self.synthesize_flexible(brief, &gathered, rag_content).await,
            Mode::Legacy => self.synthesize_legacy(brief, &gathered, rag_content).await,
        };

        let synthesis_fell_back = !synthesized.is_available();
        let outline = match synthesized {
            StageOutcome::Available(outline) => outline,
            StageOutcome::Unavailable | StageOutcome::Failed(_) => {
                build_fallback_outline(&gathered.template, brief, self.clock.now())
            }
        };

        let no_enrichment = rag_content.is_none() && gathered.topics.is_empty();
        let provenance = Provenance {
            rag_available: gathered.rag.available,
            rag_queried: gathered.rag.queried,
            fallback_used: synthesis_fell_back || no_enrichment,
        };
        let outline = outline.with_fallback_used(provenance.fallback_used);

        tracing::info!(
            category = %brief.category,
            template_id = %gathered.template.id,
            rag_available = provenance.rag_available,
            rag_queried = provenance.rag_queried,
            fallback_used = provenance.fallback_used,
            topic_count = gathered.topics.len(),
            section_count = outline.len(),
            total_duration = outline.total_duration(),
            "Generated outline"
        );

        GeneratedOutline {
            outline,
            relevant_topics: gathered.topics,
            provenance,
        }
    }

    /// Template, retrieval and topic stages, issued together.
    async fn gather(
        &self,
        brief: &OutlineBrief,
        template_id: Option<TemplateId>,
        keywords: &[String],
    ) -> Gathered {
        let template_stage = async { self.templates.resolve(template_id) };
        let (template, rag, topics) = tokio::join!(
            template_stage,
            self.rag_stage(brief, keywords),
            self.topic_stage(&brief.category, keywords),
        );

        if let StageOutcome::Failed(reason) = &rag.outcome {
            tracing::warn!(stage = "rag", error = %reason, "Retrieval unavailable, continuing without it");
        }
        let topics = match topics {
            StageOutcome::Available(topics) => topics,
            StageOutcome::Unavailable => Vec::new(),
            StageOutcome::Failed(reason) => {
                tracing::warn!(stage = "topics", error = %reason, "Topic search failed, continuing without topics");
                Vec::new()
            }
        };

        Gathered {
            template,
            rag,
            topics,
        }
    }

    async fn rag_stage(&self, brief: &OutlineBrief, keywords: &[String]) -> RagStage {
        let probe = tokio::time::timeout(self.config.rag_timeout, self.rag.is_available()).await;
        match probe {
            Ok(Ok(true)) => {}
            Ok(Ok(false)) => return RagStage::skipped(StageOutcome::Unavailable),
            Ok(Err(e)) => return RagStage::skipped(StageOutcome::Failed(e.to_string())),
            Err(_) => {
                return RagStage::skipped(StageOutcome::Failed(format!(
                    "availability probe timed out after {:?}",
                    self.config.rag_timeout
                )))
            }
        }

        let topics_text = brief.specific_topics.as_deref().unwrap_or_default();
        let query = tokio::time::timeout(
            self.config.rag_timeout,
            self.rag.query(&brief.category, keywords, topics_text),
        )
        .await;

        let outcome = match query {
            Ok(Ok(Some(result))) if !result.is_empty() => StageOutcome::Available(result),
            Ok(Ok(_)) => StageOutcome::Unavailable,
            Ok(Err(e)) => StageOutcome::Failed(e.to_string()),
            Err(_) => StageOutcome::Failed(format!(
                "query timed out after {:?}",
                self.config.rag_timeout
            )),
        };

        RagStage {
            available: true,
            queried: true,
            outcome,
        }
    }

    /// Keyword search first, then the whole category when that finds nothing.
    async fn topic_stage(&self, category: &str, keywords: &[String]) -> StageOutcome<Vec<Topic>> {
        let limit = self.config.topic_limit;

        if !keywords.is_empty() {
            match self
                .topics
                .find_by_category_and_keywords(category, keywords, limit)
                .await
            {
                Ok(topics) if !topics.is_empty() => return StageOutcome::Available(topics),
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "Keyword topic search failed, trying category only");
                }
            }
        }

        match self.topics.find_by_category(category, limit).await {
            Ok(topics) if !topics.is_empty() => StageOutcome::Available(topics),
            Ok(_) => StageOutcome::Unavailable,
            Err(e) => StageOutcome::Failed(e.to_string()),
        }
    }

    async fn synthesize_flexible(
        &self,
        brief: &OutlineBrief,
        gathered: &Gathered,
        rag: Option<&RagResult>,
    ) -> StageOutcome<FlexibleSessionOutline> {
        let call = self.synthesizer.generate_flexible(
            brief,
            &gathered.topics,
            rag,
            &gathered.template,
            self.clock.now(),
        );
        match tokio::time::timeout(self.config.llm_timeout, call).await {
            Ok(Ok(outline)) => StageOutcome::Available(outline),
            Ok(Err(e)) => self.synthesis_failed(e.to_string()),
            Err(_) => self.synthesis_failed(format!("timed out after {:?}", self.config.llm_timeout)),
        }
    }

    async fn synthesize_legacy(
        &self,
        brief: &OutlineBrief,
        gathered: &Gathered,
        rag: Option<&RagResult>,
    ) -> StageOutcome<FlexibleSessionOutline> {
        let call = self.synthesizer.generate_legacy(brief, &gathered.topics, rag);
        match tokio::time::timeout(self.config.llm_timeout, call).await {
            Ok(Ok(legacy)) => {
                StageOutcome::Available(convert_legacy_to_flexible(&legacy, self.clock.now()))
            }
            Ok(Err(e)) => self.synthesis_failed(e.to_string()),
            Err(_) => self.synthesis_failed(format!("timed out after {:?}", self.config.llm_timeout)),
        }
    }

    fn synthesis_failed<T>(&self, reason: String) -> StageOutcome<T> {
        tracing::warn!(stage = "llm", error = %reason, "Outline synthesis failed, using template fallback");
        StageOutcome::Failed(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use sessioncraft_domain::SectionType;

    use crate::infrastructure::ports::{
        LlmError, LlmRequest, LlmResponse, MockClockPort, MockLlmPort, MockRagPort,
        MockTopicRepo, RagError, RagExcerpt, RepoError,
    };

    const LLM_REPLY: &str = r#"{
        "suggestedSessionTitle": "Trust Lab",
        "sections": [
            {"type": "opener", "title": "Check-in", "durationMinutes": 10},
            {"type": "content", "title": "Trust equation", "durationMinutes": 30},
            {"type": "closing", "title": "Commitments", "durationMinutes": 10}
        ]
    }"#;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn clock() -> Arc<MockClockPort> {
        let mut clock = MockClockPort::new();
        clock.expect_now().returning(fixed_now);
        Arc::new(clock)
    }

    fn leadership_brief() -> OutlineBrief {
        OutlineBrief::new("Leadership", "workshop")
            .with_desired_outcome("build trust")
            .with_duration(60)
    }

    fn rag_disabled() -> MockRagPort {
        let mut rag = MockRagPort::new();
        rag.expect_is_available().returning(|| Ok(false));
        rag.expect_query().never();
        rag
    }

    fn no_topics() -> MockTopicRepo {
        let mut topics = MockTopicRepo::new();
        topics
            .expect_find_by_category_and_keywords()
            .returning(|_, _, _| Ok(vec![]));
        topics.expect_find_by_category().returning(|_, _| Ok(vec![]));
        topics
    }

    fn failing_llm() -> MockLlmPort {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .returning(|_| Err(LlmError::RequestFailed("connection refused".into())));
        llm
    }

    fn generator(topics: MockTopicRepo, rag: MockRagPort, llm: MockLlmPort) -> GenerateOutline {
        GenerateOutline::new(
            Arc::new(topics),
            Arc::new(rag),
            Arc::new(llm),
            Arc::new(TemplateRegistry::new()),
            clock(),
            GenerationConfig::default(),
        )
    }

    #[tokio::test]
    async fn leadership_brief_without_sources_falls_back_to_default_template() {
        let generator = generator(no_topics(), rag_disabled(), failing_llm());

        let result = generator.execute(&leadership_brief(), None).await;

        assert!(result.provenance.fallback_used);
        assert!(!result.provenance.rag_available);
        assert!(!result.provenance.rag_queried);
        assert!(result.outline.fallback_used());
        assert_eq!(
            result.outline.total_duration(),
            SessionTemplate::builtin_default().total_duration
        );
        assert!(result.outline.has_section_type(SectionType::Opener));
        assert!(result.outline.has_section_type(SectionType::Closing));
        assert!(result.relevant_topics.is_empty());
    }

    #[tokio::test]
    async fn empty_sources_mark_fallback_even_when_llm_succeeds() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .returning(|_| Ok(LlmResponse::text(LLM_REPLY)));
        let generator = generator(no_topics(), rag_disabled(), llm);

        let result = generator.execute(&leadership_brief(), None).await;

        assert_eq!(result.outline.suggested_session_title(), "Trust Lab");
        assert!(result.provenance.fallback_used);
        assert!(result.outline.fallback_used());
    }

    #[tokio::test]
    async fn enriched_generation_is_not_a_fallback() {
        let mut rag = MockRagPort::new();
        rag.expect_is_available().returning(|| Ok(true));
        rag.expect_query()
            .withf(|category, keywords, topics_text| {
                category == "Leadership"
                    && keywords.contains(&"trust".to_string())
                    && topics_text == "delegation"
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(Some(RagResult {
                    sources: vec![RagExcerpt {
                        content: "Trust grows through small kept promises.".into(),
                        source: Some("handbook".into()),
                        score: Some(0.9),
                    }],
                }))
            });

        let mut topics = MockTopicRepo::new();
        topics
            .expect_find_by_category_and_keywords()
            .returning(|_, _, _| Ok(vec![Topic::new("Building Trust", "Leadership")]));
        topics.expect_find_by_category().never();

        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .withf(|req| {
                let prompt = &req.messages[0].content;
                prompt.contains("Building Trust") && prompt.contains("kept promises")
            })
            .returning(|_| Ok(LlmResponse::text(LLM_REPLY)));

        let generator = generator(topics, rag, llm);
        let brief = leadership_brief().with_specific_topics("delegation");

        let result = generator.execute(&brief, None).await;

        assert_eq!(
            result.provenance,
            Provenance {
                rag_available: true,
                rag_queried: true,
                fallback_used: false,
            }
        );
        assert_eq!(result.outline.len(), 3);
        assert_eq!(result.relevant_topics.len(), 1);
    }

    #[tokio::test]
    async fn rag_query_error_counts_as_queried_without_content() {
        let mut rag = MockRagPort::new();
        rag.expect_is_available().returning(|| Ok(true));
        rag.expect_query()
            .returning(|_, _, _| Err(RagError::RequestFailed("502".into())));

        let generator = generator(no_topics(), rag, failing_llm());

        let result = generator.execute(&leadership_brief(), None).await;

        assert!(result.provenance.rag_available);
        assert!(result.provenance.rag_queried);
        assert!(result.provenance.fallback_used);
    }

    #[tokio::test]
    async fn probe_error_is_treated_as_unavailable() {
        let mut rag = MockRagPort::new();
        rag.expect_is_available()
            .returning(|| Err(RagError::RequestFailed("dns".into())));
        rag.expect_query().never();

        let generator = generator(no_topics(), rag, failing_llm());

        let result = generator.execute(&leadership_brief(), None).await;

        assert!(!result.provenance.rag_available);
        assert!(!result.provenance.rag_queried);
    }

    #[tokio::test]
    async fn topic_search_retries_by_category_and_swallows_errors() {
        let mut topics = MockTopicRepo::new();
        topics
            .expect_find_by_category_and_keywords()
            .times(1)
            .returning(|_, _, _| Err(RepoError::database("topics_by_keywords", "locked")));
        topics
            .expect_find_by_category()
            .times(1)
            .returning(|_, _| Ok(vec![Topic::new("Coaching", "Leadership")]));

        let generator = generator(topics, rag_disabled(), failing_llm());

        let result = generator.execute(&leadership_brief(), None).await;

        assert_eq!(result.relevant_topics.len(), 1);
        // Topics arrived, but synthesis still fell back to the template.
        assert!(result.provenance.fallback_used);
    }

    #[tokio::test]
    async fn everything_failing_still_returns_an_outline() {
        let mut rag = MockRagPort::new();
        rag.expect_is_available()
            .returning(|| Err(RagError::RequestFailed("down".into())));
        let mut topics = MockTopicRepo::new();
        topics
            .expect_find_by_category_and_keywords()
            .returning(|_, _, _| Err(RepoError::database("topics", "down")));
        topics
            .expect_find_by_category()
            .returning(|_, _| Err(RepoError::database("topics", "down")));

        let generator = generator(topics, rag, failing_llm());

        let result = generator.execute(&leadership_brief(), None).await;

        assert!(result.outline.validate().is_valid);
        assert!(result.provenance.fallback_used);
    }

    #[tokio::test]
    async fn unknown_template_id_uses_default() {
        let generator = generator(no_topics(), rag_disabled(), failing_llm());

        let result = generator
            .execute(&leadership_brief(), Some(TemplateId::new()))
            .await;

        assert_eq!(
            result.outline.total_duration(),
            SessionTemplate::builtin_default().total_duration
        );
    }

    #[tokio::test]
    async fn legacy_mode_converts_to_flexible() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate().returning(|_| {
            Ok(LlmResponse::text(
                r#"{"opener": {"title": "Hi", "duration": 10},
                    "mainTopic": {"title": "Trust", "duration": 35},
                    "activity": {"title": "Pairs", "duration": 20},
                    "closing": {"title": "Bye", "duration": 10}}"#,
            ))
        });
        let generator = generator(no_topics(), rag_disabled(), llm);

        let result = generator.execute_legacy(&leadership_brief()).await;

        assert_eq!(result.outline.len(), 4);
        assert_eq!(result.outline.total_duration(), 75);
        assert_eq!(
            result.outline.sections().iter().map(|s| s.position).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    struct StalledLlm;

    #[async_trait]
    impl LlmPort for StalledLlm {
        async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(LlmResponse::text(LLM_REPLY))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_llm_times_out_into_fallback() {
        let generator = GenerateOutline::new(
            Arc::new(no_topics()),
            Arc::new(rag_disabled()),
            Arc::new(StalledLlm),
            Arc::new(TemplateRegistry::new()),
            clock(),
            GenerationConfig {
                llm_timeout: Duration::from_millis(100),
                ..GenerationConfig::default()
            },
        );

        let result = generator.execute(&leadership_brief(), None).await;

        assert!(result.outline.fallback_used());
        assert_eq!(result.outline.suggested_session_title(), "Leadership Workshop");
    }
}
