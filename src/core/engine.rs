use crate::core::composer::ResponseComposer;
use crate::core::generation::{build_system_instruction, parse_generated_reply};
use crate::core::intent::IntentExtractor;
use crate::core::resolver::CandidateResolver;
use crate::core::sanitizer::TextSanitizer;
use crate::core::session_cache::{is_followup, SessionCache};
use crate::core::tables::MatchingTables;
use crate::domain::model::{
    Catalog, DraftOutcome, DraftRequest, Listing, MatchSignals, ReasonCode, ReplyOrigin,
    ResolutionResult, ResponsePayload,
};
use crate::domain::ports::ReplyGenerator;
use crate::utils::error::{HeroError, Result};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_GENERATOR_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_MAX_FOLLOWUP_TOKENS: usize = 8;

/// Message in, grounded reply out: extraction, cascade, optional session
/// reuse, optional generation, deterministic fallback, sanitizing.
pub struct DraftEngine {
    extractor: IntentExtractor,
    resolver: CandidateResolver,
    composer: ResponseComposer,
    sanitizer: TextSanitizer,
    cache: Option<SessionCache>,
    generator: Option<Arc<dyn ReplyGenerator>>,
    generator_timeout: Duration,
    max_followup_tokens: usize,
}

impl DraftEngine {
    pub fn new(
        catalog: Arc<Catalog>,
        tables: Arc<MatchingTables>,
        composer: ResponseComposer,
        sanitizer: TextSanitizer,
    ) -> Self {
        Self {
            extractor: IntentExtractor::new(catalog.clone(), tables),
            resolver: CandidateResolver::new(catalog),
            composer,
            sanitizer,
            cache: None,
            generator: None,
            generator_timeout: DEFAULT_GENERATOR_TIMEOUT,
            max_followup_tokens: DEFAULT_MAX_FOLLOWUP_TOKENS,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn ReplyGenerator>, timeout: Duration) -> Self {
        self.generator = Some(generator);
        self.generator_timeout = timeout;
        self
    }

    pub fn with_session_cache(mut self, cache: SessionCache, max_followup_tokens: usize) -> Self {
        self.cache = Some(cache);
        self.max_followup_tokens = max_followup_tokens;
        self
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Extraction and cascade only, without session or generation.
    pub fn resolve(&self, message: &str) -> (MatchSignals, ResolutionResult) {
        let signals = self.extractor.extract(message);
        let result = self.resolver.resolve(&signals);
        (signals, result)
    }

    pub async fn draft(&self, request: &DraftRequest) -> Result<DraftOutcome> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(HeroError::ValidationError {
                message: "message must not be empty".to_string(),
            });
        }

        let (signals, mut result) = self.resolve(message);
        tracing::debug!(
            reason = %result.reason,
            candidates = result.listings.len(),
            types = ?signals.property_type_codes,
            neighborhoods = ?signals.neighborhoods,
            "Resolved message"
        );

        let mut reused_session = false;
        if let (Some(cache), Some(sender)) = (&self.cache, request.sender_id.as_deref()) {
            if result.listings.is_empty()
                && signals.is_empty()
                && is_followup(message, self.max_followup_tokens)
            {
                if let Some(listings) = cache.get(sender) {
                    tracing::info!(
                        "♻️ Reusing {} session candidates for {}",
                        listings.len(),
                        sender
                    );
                    result.listings = listings;
                    reused_session = true;
                }
            }
            cache.set(sender, &result.listings);
        }

        let (payload, origin) = self.reply_for(message, &result, &signals).await;
        let text = self.sanitizer.sanitize(&payload.text, message);

        tracing::info!(
            "✉️ Draft ready (reason: {}, origin: {:?}, candidates: {})",
            result.reason,
            origin,
            result.listings.len()
        );

        Ok(DraftOutcome {
            payload: ResponsePayload {
                text,
                followups: payload.followups,
            },
            reason: result.reason,
            origin,
            reused_session,
        })
    }

    async fn reply_for(
        &self,
        message: &str,
        result: &ResolutionResult,
        signals: &MatchSignals,
    ) -> (ResponsePayload, ReplyOrigin) {
        if result.listings.is_empty() || result.reason == ReasonCode::Type {
            return (self.composer.compose(result, signals), ReplyOrigin::Fallback);
        }

        let type_missed =
            result.reason == ReasonCode::Neighborhood && !signals.property_type_codes.is_empty();
        if !type_missed {
            if let Some(payload) = self.generate(message, &result.listings).await {
                return (payload, ReplyOrigin::Generated);
            }
        }

        (self.composer.compose(result, signals), ReplyOrigin::Deterministic)
    }

    /// Any failure here is a permanent downgrade for this request, never
    /// an error.
    async fn generate(&self, message: &str, listings: &[Listing]) -> Option<ResponsePayload> {
        let generator = self.generator.as_ref()?;
        let instruction = build_system_instruction(listings);

        match tokio::time::timeout(
            self.generator_timeout,
            generator.generate(&instruction, message),
        )
        .await
        {
            Ok(Ok(raw)) => {
                let Some(parsed) = parse_generated_reply(&raw) else {
                    tracing::warn!(
                        "⚠️ Generator output had an unexpected shape, using deterministic reply"
                    );
                    return None;
                };
                // contact data and signatures alone are not a reply
                if self.sanitizer.strip_signature(&parsed.text).is_empty() {
                    tracing::warn!(
                        "⚠️ Generator output was only contact details, using deterministic reply"
                    );
                    return None;
                }
                Some(parsed)
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "⚠️ Generator failed, using deterministic reply");
                None
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.generator_timeout.as_millis() as u64,
                    "⚠️ Generator timed out, using deterministic reply"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::composer::DEFAULT_MAX_LISTINGS;
    use crate::core::fixtures::niteroi_catalog;
    use crate::core::sanitizer::{SignatureMode, DEFAULT_SIGNATURE};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CannedGenerator {
        reply: std::result::Result<String, String>,
        delay: Duration,
        calls: Mutex<Vec<String>>,
    }

    impl CannedGenerator {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                delay: Duration::ZERO,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err("upstream 500".to_string()),
                delay: Duration::ZERO,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn slow(reply: &str, delay: Duration) -> Self {
            Self {
                delay,
                ..Self::ok(reply)
            }
        }
    }

    #[async_trait]
    impl ReplyGenerator for CannedGenerator {
        async fn generate(&self, system_instruction: &str, _user_message: &str) -> Result<String> {
            self.calls.lock().unwrap().push(system_instruction.to_string());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.reply
                .clone()
                .map_err(|message| HeroError::GenerationError { message })
        }
    }

    fn engine(mode: SignatureMode) -> DraftEngine {
        let catalog = Arc::new(niteroi_catalog());
        DraftEngine::new(
            catalog.clone(),
            Arc::new(MatchingTables::builtin().unwrap()),
            ResponseComposer::new(catalog, DEFAULT_MAX_LISTINGS),
            TextSanitizer::with_defaults(mode).unwrap(),
        )
    }

    fn cached_engine() -> DraftEngine {
        engine(SignatureMode::Never)
            .with_session_cache(SessionCache::new(chrono::Duration::minutes(30), 100), 8)
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected() {
        let err = engine(SignatureMode::Never)
            .draft(&DraftRequest::new("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, HeroError::ValidationError { .. }));
    }

    #[test]
    fn test_deterministic_reply_without_generator() {
        let engine = engine(SignatureMode::Never);
        let outcome = tokio_test::assert_ok!(tokio_test::block_on(
            engine.draft(&DraftRequest::new("Marem 4 quartos"))
        ));

        assert_eq!(outcome.reason, ReasonCode::Name);
        assert_eq!(outcome.origin, ReplyOrigin::Deterministic);
        assert!(outcome.payload.text.contains("- Marem, em Icaraí."));
        assert!(!outcome.payload.text.contains("Alameda"));
    }

    #[tokio::test]
    async fn test_studio_in_icarai_scenario() {
        let generator = Arc::new(CannedGenerator::ok(r#"{"text": "nunca usado"}"#));
        let outcome = engine(SignatureMode::Never)
            .with_generator(generator.clone(), Duration::from_secs(1))
            .draft(&DraftRequest::new("tem studio em icarai?"))
            .await
            .unwrap();

        assert_eq!(outcome.reason, ReasonCode::Neighborhood);
        assert_eq!(outcome.origin, ReplyOrigin::Deterministic);
        assert!(outcome.payload.text.starts_with("Não encontrei studio em Icaraí"));
        assert!(outcome.payload.text.contains("Marem"));
        assert!(outcome.payload.text.contains("Alameda Icaraí"));
        assert!(generator.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generated_reply_is_used_and_sanitized() {
        let generator = Arc::new(CannedGenerator::ok(
            r#"{"text": "O Marem tem 2 e 3 quartos em Icaraí. Fico à disposição! (21) 98888-7777", "followups": ["Quer visitar?"]}"#,
        ));
        let outcome = engine(SignatureMode::Closing)
            .with_generator(generator.clone(), Duration::from_secs(1))
            .draft(&DraftRequest::new("me fala do marem"))
            .await
            .unwrap();

        assert_eq!(outcome.origin, ReplyOrigin::Generated);
        assert_eq!(
            outcome.payload.text,
            format!(
                "O Marem tem 2 e 3 quartos em Icaraí. Fico à disposição!\n\n{}",
                DEFAULT_SIGNATURE
            )
        );
        assert_eq!(outcome.payload.followups, vec!["Quer visitar?"]);

        let calls = generator.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("Marem"));
        assert!(!calls[0].contains("Nexus"));
    }

    #[tokio::test]
    async fn test_generator_failure_downgrades() {
        let outcome = engine(SignatureMode::Never)
            .with_generator(Arc::new(CannedGenerator::failing()), Duration::from_secs(1))
            .draft(&DraftRequest::new("icarai 4 quartos"))
            .await
            .unwrap();

        assert_eq!(outcome.reason, ReasonCode::NeighborhoodType);
        assert_eq!(outcome.origin, ReplyOrigin::Deterministic);
        assert!(outcome.payload.text.contains("Alameda Icaraí"));
    }

    #[tokio::test]
    async fn test_contact_only_generator_output_downgrades() {
        let outcome = engine(SignatureMode::Never)
            .with_generator(
                Arc::new(CannedGenerator::ok(
                    r#"{"text": "Corretor de Imóveis | CRECI-RJ 12345\n(21) 98888-7777\nwww.hero.com.br"}"#,
                )),
                Duration::from_secs(1),
            )
            .draft(&DraftRequest::new("me fala do marem"))
            .await
            .unwrap();

        assert_eq!(outcome.origin, ReplyOrigin::Deterministic);
        assert!(outcome.payload.text.contains("- Marem, em Icaraí."));
    }

    #[tokio::test]
    async fn test_plain_text_generator_output_downgrades() {
        let outcome = engine(SignatureMode::Never)
            .with_generator(
                Arc::new(CannedGenerator::ok("Claro, o Marem é ótimo!")),
                Duration::from_secs(1),
            )
            .draft(&DraftRequest::new("marem"))
            .await
            .unwrap();
        assert_eq!(outcome.origin, ReplyOrigin::Deterministic);
    }

    #[tokio::test]
    async fn test_generator_timeout_downgrades() {
        let outcome = engine(SignatureMode::Never)
            .with_generator(
                Arc::new(CannedGenerator::slow(
                    r#"{"text": "tarde demais"}"#,
                    Duration::from_secs(5),
                )),
                Duration::from_millis(50),
            )
            .draft(&DraftRequest::new("marem"))
            .await
            .unwrap();
        assert_eq!(outcome.origin, ReplyOrigin::Deterministic);
        assert!(!outcome.payload.text.contains("tarde demais"));
    }

    #[tokio::test]
    async fn test_type_only_asks_to_narrow() {
        let outcome = engine(SignatureMode::Never)
            .draft(&DraftRequest::new("quero um loft"))
            .await
            .unwrap();
        assert_eq!(outcome.reason, ReasonCode::Type);
        assert_eq!(outcome.origin, ReplyOrigin::Fallback);
        assert!(outcome.payload.text.contains("Nexus em Centro"));
    }

    #[tokio::test]
    async fn test_no_signal_fallback_with_closing_signature() {
        let outcome = engine(SignatureMode::Closing)
            .draft(&DraftRequest::new("obrigado, vou pensar"))
            .await
            .unwrap();
        assert_eq!(outcome.reason, ReasonCode::None);
        assert_eq!(outcome.origin, ReplyOrigin::Fallback);
        assert!(outcome.payload.text.ends_with(DEFAULT_SIGNATURE));
        assert!((2..=3).contains(&outcome.payload.followups.len()));
    }

    #[tokio::test]
    async fn test_followup_reuses_session_candidates() {
        let engine = cached_engine();
        engine
            .draft(&DraftRequest::new("icarai").with_sender("5521"))
            .await
            .unwrap();

        let outcome = engine
            .draft(&DraftRequest::new("tenho interesse, me manda o book").with_sender("5521"))
            .await
            .unwrap();
        assert!(outcome.reused_session);
        assert_eq!(outcome.reason, ReasonCode::None);
        assert!(outcome.payload.text.contains("Marem"));
        assert!(outcome.payload.text.contains("Alameda Icaraí"));
    }

    #[tokio::test]
    async fn test_session_is_per_sender_and_needs_followup_cue() {
        let engine = cached_engine();
        engine
            .draft(&DraftRequest::new("icarai").with_sender("a"))
            .await
            .unwrap();

        let other = engine
            .draft(&DraftRequest::new("tenho interesse").with_sender("b"))
            .await
            .unwrap();
        assert!(!other.reused_session);

        let no_cue = engine
            .draft(&DraftRequest::new("bom dia").with_sender("a"))
            .await
            .unwrap();
        assert!(!no_cue.reused_session);
        assert_eq!(no_cue.origin, ReplyOrigin::Fallback);

        let again = engine
            .draft(&DraftRequest::new("quero agendar visita").with_sender("a"))
            .await
            .unwrap();
        assert!(again.reused_session);
    }

    #[tokio::test]
    async fn test_direct_resolution_is_never_overridden_by_session() {
        let engine = cached_engine();
        engine
            .draft(&DraftRequest::new("icarai").with_sender("a"))
            .await
            .unwrap();
        let outcome = engine
            .draft(&DraftRequest::new("tenho interesse no nexus").with_sender("a"))
            .await
            .unwrap();
        assert!(!outcome.reused_session);
        assert_eq!(outcome.reason, ReasonCode::Name);
        assert!(!outcome.payload.text.contains("Marem"));
    }
}
