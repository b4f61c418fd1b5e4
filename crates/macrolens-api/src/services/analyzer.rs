//! Food analysis: label detection followed by the per-label fallback chain.
//!
//! ## Resolution Order
//!
//! For each detected food phrase the analyzer tries:
//! 1. Static nutrition table (after quantity and synonym normalization)
//! 2. Response cache
//! 3. Nutrition database, queried with the normalized base term
//! 4. Vision LLM estimate, only when an image is available
//! 5. Generic estimate with a "could not find" summary
//!
//! Steps 3 and 4 are gated by the [`AnalysisBudget`], sampled again before
//! each of them. Upstream failures in
//! either step are logged and treated as a miss; only the label detector can
//! fail a request.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use macrolens_core::resolver::scale;
use macrolens_core::{
    candidates_from, filter_candidates, food_phrases, macro_summary, AnalysisBudget, CandidateLabel, LabelDetector, LabelResult, MacroEstimator, MacroRecord, MacroResolver,
    MacroSource, MealEstimate, NutritionDatabase, ResolvedMacros, Result,
};

use super::ResponseCache;

/// Outcome of analyzing one image.
#[derive(Debug, Clone)]
pub struct ImageAnalysis {
    /// One entry per processed food phrase; never empty.
    pub results: Vec<LabelResult>,
    /// Displayable raw detector labels.
    pub candidates: Vec<CandidateLabel>,
}

/// Runs the detector and the fallback chain against shared collaborators.
pub struct FoodAnalyzer {
    detector: Arc<dyn LabelDetector>,
    database: Option<Arc<dyn NutritionDatabase>>,
    estimator: Option<Arc<dyn MacroEstimator>>,
    resolver: MacroResolver,
    cache: ResponseCache,
    budget_limit: Duration,
}

impl FoodAnalyzer {
    /// Analyzer with only a label detector: no database, no LLM, no cache.
    pub fn new(detector: Arc<dyn LabelDetector>) -> Self {
        Self {
            detector,
            database: None,
            estimator: None,
            resolver: MacroResolver::default(),
            cache: ResponseCache::disabled(),
            budget_limit: Duration::ZERO,
        }
    }

    pub fn with_database(mut self, database: Option<Arc<dyn NutritionDatabase>>) -> Self {
        self.database = database;
        self
    }

    pub fn with_estimator(mut self, estimator: Option<Arc<dyn MacroEstimator>>) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_resolver(mut self, resolver: MacroResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = cache;
        self
    }

    /// Soft time limit per image; zero disables it.
    pub fn with_budget(mut self, limit: Duration) -> Self {
        self.budget_limit = limit;
        self
    }

    pub fn detector(&self) -> &dyn LabelDetector {
        self.detector.as_ref()
    }

    pub fn has_database(&self) -> bool {
        self.database.is_some()
    }

    pub fn has_estimator(&self) -> bool {
        self.estimator.is_some()
    }

    /// Food phrases for an image, without macro resolution.
    pub async fn detect_labels(&self, image: &[u8]) -> Result<Vec<String>> {
        let detection = self.detector.detect(image).await?;
        Ok(food_phrases(&detection))
    }

    /// Detect foods in an image and resolve macros for each.
    pub async fn analyze_image(&self, image: &[u8]) -> Result<ImageAnalysis> {
        self.analyze_with_budget(image, AnalysisBudget::new(self.budget_limit))
            .await
    }

    /// As [`analyze_image`](Self::analyze_image), against an explicit budget.
    pub async fn analyze_with_budget(
        &self,
        image: &[u8],
        budget: AnalysisBudget,
    ) -> Result<ImageAnalysis> {
        let start = Instant::now();
        let detection = self.detector.detect(image).await?;
        let phrases = food_phrases(&detection);
        let candidates = filter_candidates(candidates_from(&detection));

        let mut results = Vec::with_capacity(phrases.len());
        for phrase in &phrases {
            if budget.stage().is_exhausted() && !results.is_empty() {
                warn!(
                    subsystem = "api",
                    component = "analyzer",
                    elapsed_ms = budget.elapsed().as_millis() as u64,
                    skipped = phrases.len() - results.len(),
                    "Analysis budget exhausted, returning partial results"
                );
                break;
            }
            results.push(self.resolve_label(phrase, Some(image), &budget).await);
        }

        info!(
            subsystem = "api",
            component = "analyzer",
            op = "analyze_image",
            image_bytes = image.len(),
            result_count = results.len(),
            candidate_count = candidates.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Image analysis complete"
        );

        Ok(ImageAnalysis {
            results,
            candidates,
        })
    }

    /// Resolve a typed label; the LLM stage is unavailable without an image.
    pub async fn resolve_text(&self, label: &str) -> LabelResult {
        let unlimited = AnalysisBudget::new(Duration::ZERO);
        self.resolve_label(label.trim(), None, &unlimited).await
    }

    /// Run the fallback chain for one phrase. Always produces a result.
    ///
    /// The budget is sampled before the database and again before the LLM,
    /// so a slow database lookup can rule out the LLM for the same label.
    pub async fn resolve_label(
        &self,
        label: &str,
        image: Option<&[u8]>,
        budget: &AnalysisBudget,
    ) -> LabelResult {
        let (normalized, resolved) = self.resolver.resolve_label(label);
        if let Some(macros) = resolved {
            debug!(
                subsystem = "api",
                component = "analyzer",
                label = label,
                canonical_key = %normalized.canonical_key,
                source = MacroSource::StaticTable.as_str(),
                "Resolved from static table"
            );
            return LabelResult {
                label: label.to_string(),
                macros,
                source: MacroSource::StaticTable,
                summary: None,
                components: None,
            };
        }

        let cache_key = ResponseCache::cache_key(image.unwrap_or_default(), label);
        if let Some(hit) = self.cache.get(&cache_key).await {
            debug!(
                subsystem = "api",
                component = "analyzer",
                label = label,
                source = hit.source.as_str(),
                "Resolved from response cache"
            );
            return LabelResult {
                label: label.to_string(),
                ..hit
            };
        }

        let stage = budget.stage();
        if stage.allows_database() {
            if let Some(record) = self.lookup_database(&normalized.base_term).await {
                let result = LabelResult {
                    label: label.to_string(),
                    macros: scale(record, &normalized.canonical_key, normalized.quantity),
                    source: MacroSource::NutritionDatabase,
                    summary: Some(macro_summary(label, Some(&record))),
                    components: None,
                };
                self.cache.put(cache_key, result.clone()).await;
                return result;
            }
        } else if self.database.is_some() {
            debug!(
                subsystem = "api",
                component = "analyzer",
                label = label,
                stage = ?stage,
                "Budget skips nutrition database"
            );
        }

        if let Some(image) = image {
            let stage = budget.stage();
            if stage.allows_llm() {
                if let Some(estimate) = self.estimate(image, label).await {
                    let result = LabelResult {
                        label: label.to_string(),
                        macros: ResolvedMacros::plain(estimate.total()),
                        source: MacroSource::AiEstimated,
                        summary: None,
                        components: Some(estimate.into_components()),
                    };
                    self.cache.put(cache_key, result.clone()).await;
                    return result;
                }
            } else if self.estimator.is_some() {
                debug!(
                    subsystem = "api",
                    component = "analyzer",
                    label = label,
                    stage = ?stage,
                    "Budget skips vision LLM"
                );
            }
        }

        debug!(
            subsystem = "api",
            component = "analyzer",
            label = label,
            source = MacroSource::GenericEstimate.as_str(),
            "Falling back to generic estimate"
        );
        LabelResult {
            label: label.to_string(),
            macros: ResolvedMacros::plain(MacroRecord::generic_estimate()),
            source: MacroSource::GenericEstimate,
            summary: Some(macro_summary(label, None)),
            components: None,
        }
    }

    async fn lookup_database(&self, query: &str) -> Option<MacroRecord> {
        let database = self.database.as_ref()?;
        match database.search_macros(query).await {
            Ok(Some(record)) => {
                debug!(
                    subsystem = "api",
                    component = "analyzer",
                    database = database.name(),
                    label = query,
                    source = MacroSource::NutritionDatabase.as_str(),
                    "Resolved from nutrition database"
                );
                Some(record)
            }
            Ok(None) => {
                debug!(
                    subsystem = "api",
                    component = "analyzer",
                    database = database.name(),
                    label = query,
                    "No nutrition database match"
                );
                None
            }
            Err(e) => {
                warn!(
                    subsystem = "api",
                    component = "analyzer",
                    database = database.name(),
                    label = query,
                    error = %e,
                    "Nutrition database lookup failed, treating as miss"
                );
                None
            }
        }
    }

    async fn estimate(&self, image: &[u8], label: &str) -> Option<MealEstimate> {
        let estimator = self.estimator.as_ref()?;
        match estimator.estimate(image, label).await {
            Ok(estimate) => estimate,
            Err(e) => {
                warn!(
                    subsystem = "api",
                    component = "analyzer",
                    model = estimator.model_name(),
                    label = label,
                    error = %e,
                    "Vision LLM estimate failed, treating as miss"
                );
                None
            }
        }
    }
}
