//! Input state and request lifecycle of one curation session.
//!
//! A session is always in exactly one [`LifecycleState`]. Every request that leaves
//! the session carries a [`Ticket`]; its result is committed only if the session is
//! still waiting on that same ticket, so a reset or a newer request makes late
//! answers harmless.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::gemini::StylistError;
use crate::models::{CriteriaPatch, OutfitRecommendation, StylingCriteria};

/// The only failure text a user ever sees.
pub const STYLIST_UNAVAILABLE: &str = "The stylist is unavailable right now. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Loading,
    Success { recommendation: OutfitRecommendation },
    Failed { message: String },
}

impl LifecycleState {
    pub fn is_loading(&self) -> bool { matches!(self, LifecycleState::Loading) }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    #[error("choose an occasion first")]
    MissingOccasion,
    #[error("a recommendation is already being curated")]
    AlreadyLoading,
    #[error("start a new curation before generating again")]
    ResultShowing,
}

#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    pub criteria: StylingCriteria,
}

#[derive(Debug, Clone)]
pub struct Curator {
    criteria: StylingCriteria,
    state: LifecycleState,
    generation: u64,
    updated_at: DateTime<Utc>,
}

impl Default for Curator {
    fn default() -> Self {
        Self { criteria: StylingCriteria::default(), state: LifecycleState::Idle, generation: 0, updated_at: Utc::now() }
    }
}

impl Curator {
    pub fn new() -> Self { Self::default() }

    pub fn criteria(&self) -> &StylingCriteria { &self.criteria }
    pub fn state(&self) -> &LifecycleState { &self.state }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    pub fn set_occasion(&mut self, occasion: impl Into<String>) {
        self.criteria.occasion = occasion.into();
        self.touch();
    }

    pub fn set_weather(&mut self, weather: impl Into<String>) {
        self.criteria.weather = weather.into();
        self.touch();
    }

    pub fn set_mood(&mut self, mood: impl Into<String>) {
        self.criteria.mood = mood.into();
        self.touch();
    }

    pub fn update(&mut self, patch: CriteriaPatch) {
        if let Some(occasion) = patch.occasion { self.set_occasion(occasion); }
        if let Some(weather) = patch.weather { self.set_weather(weather); }
        if let Some(mood) = patch.mood { self.set_mood(mood); }
    }

    pub fn can_generate(&self) -> bool {
        self.criteria.has_occasion() && matches!(self.state, LifecycleState::Idle | LifecycleState::Failed { .. })
    }

    /// Moves to `Loading` and hands out the ticket the eventual result must present.
    pub fn begin(&mut self) -> Result<Ticket, Rejected> {
        match self.state {
            LifecycleState::Loading => return Err(Rejected::AlreadyLoading),
            LifecycleState::Success { .. } => return Err(Rejected::ResultShowing),
            LifecycleState::Idle | LifecycleState::Failed { .. } => {}
        }
        if !self.criteria.has_occasion() {
            return Err(Rejected::MissingOccasion);
        }
        self.generation += 1;
        self.state = LifecycleState::Loading;
        self.touch();
        Ok(Ticket { generation: self.generation, criteria: self.criteria.clone() })
    }

    /// Returns whether the result was committed.
    pub fn complete(&mut self, ticket: &Ticket, result: Result<OutfitRecommendation, StylistError>) -> bool {
        if !self.state.is_loading() || ticket.generation != self.generation {
            warn!("🗑️ Dropping stale result for generation {} (current {})", ticket.generation, self.generation);
            return false;
        }
        self.state = match result {
            Ok(recommendation) => {
                info!("✅ Generation {} succeeded: '{}'", ticket.generation, recommendation.title);
                LifecycleState::Success { recommendation }
            }
            Err(e) => {
                warn!("❌ Generation {} failed: {}", ticket.generation, e);
                LifecycleState::Failed { message: STYLIST_UNAVAILABLE.to_string() }
            }
        };
        self.touch();
        true
    }

    /// "Start new curation": drops the recommendation (or the pending request) and keeps the criteria.
    pub fn start_new_curation(&mut self) {
        match self.state {
            LifecycleState::Success { .. } => {}
            LifecycleState::Loading => {
                info!("🛑 Abandoning in-flight generation {}", self.generation);
                self.generation += 1;
            }
            LifecycleState::Idle | LifecycleState::Failed { .. } => return,
        }
        self.state = LifecycleState::Idle;
        self.touch();
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_recommendation;
    use pretty_assertions::assert_eq;

    fn office() -> Curator {
        let mut c = Curator::new();
        c.set_occasion("Office");
        c
    }

    #[test]
    fn starts_idle_and_needs_an_occasion() {
        let mut c = Curator::new();
        assert_eq!(c.state(), &LifecycleState::Idle);
        assert!(!c.can_generate());
        assert_eq!(c.begin().unwrap_err(), Rejected::MissingOccasion);
        assert_eq!(c.state(), &LifecycleState::Idle);

        c.set_occasion("   ");
        assert_eq!(c.begin().unwrap_err(), Rejected::MissingOccasion);
    }

    #[test]
    fn idle_to_loading_to_success() {
        let mut c = office();
        assert!(c.can_generate());
        let ticket = c.begin().unwrap();
        assert_eq!(ticket.criteria.occasion, "Office");
        assert!(c.state().is_loading());
        assert!(!c.can_generate());

        assert!(c.complete(&ticket, Ok(sample_recommendation())));
        assert_eq!(c.state(), &LifecycleState::Success { recommendation: sample_recommendation() });
    }

    #[test]
    fn generate_while_loading_is_rejected_without_new_ticket() {
        let mut c = office();
        let first = c.begin().unwrap();
        assert_eq!(c.begin().unwrap_err(), Rejected::AlreadyLoading);
        assert!(c.state().is_loading());
        assert!(c.complete(&first, Ok(sample_recommendation())));
    }

    #[test]
    fn failure_collapses_to_fixed_message_and_keeps_criteria() {
        let mut c = office();
        c.set_weather("Drizzle");
        let ticket = c.begin().unwrap();
        assert!(c.complete(&ticket, Err(StylistError::Status { status: 503, body: "overloaded".into() })));
        assert_eq!(c.state(), &LifecycleState::Failed { message: STYLIST_UNAVAILABLE.into() });
        assert_eq!(c.criteria(), &StylingCriteria::new("Office", "Drizzle", ""));

        let parse = c.begin().unwrap();
        assert!(c.complete(&parse, Err(StylistError::Parse("expected value".into()))));
        assert_eq!(c.state(), &LifecycleState::Failed { message: STYLIST_UNAVAILABLE.into() });
    }

    #[test]
    fn failed_can_retry() {
        let mut c = office();
        let t = c.begin().unwrap();
        c.complete(&t, Err(StylistError::MissingApiKey));
        assert!(c.can_generate());
        let retry = c.begin().unwrap();
        assert!(c.state().is_loading());
        assert!(c.complete(&retry, Ok(sample_recommendation())));
    }

    #[test]
    fn success_must_be_reset_before_generating() {
        let mut c = office();
        let t = c.begin().unwrap();
        c.complete(&t, Ok(sample_recommendation()));
        assert!(!c.can_generate());
        assert_eq!(c.begin().unwrap_err(), Rejected::ResultShowing);

        c.start_new_curation();
        assert_eq!(c.state(), &LifecycleState::Idle);
        assert_eq!(c.criteria().occasion, "Office");
        assert!(c.can_generate());
    }

    #[test]
    fn reset_during_loading_drops_late_result() {
        let mut c = office();
        let stale = c.begin().unwrap();
        c.start_new_curation();
        assert_eq!(c.state(), &LifecycleState::Idle);

        assert!(!c.complete(&stale, Ok(sample_recommendation())));
        assert_eq!(c.state(), &LifecycleState::Idle);
    }

    #[test]
    fn stale_result_cannot_overwrite_newer_request() {
        let mut c = office();
        let stale = c.begin().unwrap();
        c.start_new_curation();
        let fresh = c.begin().unwrap();

        assert!(!c.complete(&stale, Err(StylistError::Http("timed out".into()))));
        assert!(c.state().is_loading());
        assert!(c.complete(&fresh, Ok(sample_recommendation())));
    }

    #[test]
    fn criteria_stay_editable_while_loading() {
        let mut c = office();
        let _t = c.begin().unwrap();
        c.update(CriteriaPatch { mood: Some("Bold".into()), ..Default::default() });
        assert_eq!(c.criteria().mood, "Bold");
        assert!(c.state().is_loading());
    }

    #[test]
    fn reset_from_idle_or_failed_is_a_no_op() {
        let mut c = office();
        c.start_new_curation();
        assert_eq!(c.state(), &LifecycleState::Idle);

        let t = c.begin().unwrap();
        c.complete(&t, Err(StylistError::EmptyResponse));
        c.start_new_curation();
        assert!(matches!(c.state(), LifecycleState::Failed { .. }));
    }
}
