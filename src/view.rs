use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::curator::{Curator, LifecycleState};
use crate::models::{OutfitRecommendation, StylingCriteria};

/// The one panel the page shows. The `Error` panel is drawn as the empty placeholder with the message on top.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Panel {
    Empty,
    Loading,
    Result { recommendation: OutfitRecommendation },
    Error { message: String },
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub panel: Panel,
    pub criteria: StylingCriteria,
    pub can_generate: bool,
    pub updated_at: DateTime<Utc>,
}

pub fn panel_for(state: &LifecycleState) -> Panel {
    match state {
        LifecycleState::Idle => Panel::Empty,
        LifecycleState::Loading => Panel::Loading,
        LifecycleState::Success { recommendation } => Panel::Result { recommendation: recommendation.clone() },
        LifecycleState::Failed { message } => Panel::Error { message: message.clone() },
    }
}

pub fn render(curator: &Curator) -> ViewModel {
    ViewModel {
        panel: panel_for(curator.state()),
        criteria: curator.criteria().clone(),
        can_generate: curator.can_generate(),
        updated_at: curator.updated_at(),
    }
}
