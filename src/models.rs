use serde::{Serialize, Deserialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

/// Rendered in place of an optional criterion the user left blank.
pub const NOT_SPECIFIED: &str = "Not specified";

pub const OCCASIONS: &[&str] = &[
    "Office", "Wedding", "Date Night", "Job Interview", "Casual Weekend",
    "Cocktail Party", "Gym", "Travel", "Brunch", "Gala",
];

pub const MOODS: &[&str] = &[
    "Confident", "Relaxed", "Romantic", "Bold", "Minimalist", "Playful", "Elegant", "Edgy",
];

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StylingCriteria {
    pub occasion: String,
    #[serde(default)]
    pub weather: String,
    #[serde(default)]
    pub mood: String,
}

impl StylingCriteria {
    pub fn new(occasion: impl Into<String>, weather: impl Into<String>, mood: impl Into<String>) -> Self {
        Self { occasion: occasion.into(), weather: weather.into(), mood: mood.into() }
    }

    pub fn has_occasion(&self) -> bool { !self.occasion.trim().is_empty() }

    pub fn weather_or_placeholder(&self) -> &str { or_placeholder(&self.weather) }

    pub fn mood_or_placeholder(&self) -> &str { or_placeholder(&self.mood) }
}

fn or_placeholder(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() { NOT_SPECIFIED } else { trimmed }
}

/// Partial update sent by the page when a single field changes.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaPatch {
    #[serde(default)]
    pub occasion: Option<String>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Top,
    Bottom,
    Outerwear,
    Footwear,
    Accessory,
}

impl Category {
    pub const ALL: [Category; 5] = [Category::Top, Category::Bottom, Category::Outerwear, Category::Footwear, Category::Accessory];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Top => "top",
            Category::Bottom => "bottom",
            Category::Outerwear => "outerwear",
            Category::Footwear => "footwear",
            Category::Accessory => "accessory",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OutfitComponent {
    pub item: String,
    pub description: String,
    pub category: Category,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ColorPalette {
    pub name: String,
    pub colors: Vec<String>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutfitRecommendation {
    pub title: String,
    pub color_palette: ColorPalette,
    pub components: Vec<OutfitComponent>,
    #[serde(default)]
    pub layering_advice: Option<String>,
    pub style_psychology: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidRecommendation {
    #[error("recommendation has no outfit components")]
    NoComponents,
    #[error("color palette '{0}' has no colors")]
    EmptyPalette(String),
}

impl OutfitRecommendation {
    /// The model's schema enforcement is advisory; this is the check that decides
    /// whether a parsed reply may be shown at all.
    pub fn validate(&self) -> Result<(), InvalidRecommendation> {
        if self.components.is_empty() {
            return Err(InvalidRecommendation::NoComponents);
        }
        if self.color_palette.colors.is_empty() {
            return Err(InvalidRecommendation::EmptyPalette(self.color_palette.name.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct StyleOptions {
    pub occasions: Vec<&'static str>,
    pub moods: Vec<&'static str>,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self { occasions: OCCASIONS.to_vec(), moods: MOODS.to_vec() }
    }
}

#[cfg(test)]
pub(crate) fn sample_recommendation() -> OutfitRecommendation {
    OutfitRecommendation {
        title: "Quiet Authority".into(),
        color_palette: ColorPalette {
            name: "Slate & Sand".into(),
            colors: vec!["#2F3E46".into(), "#CAD2C5".into(), "#E9C46A".into()],
        },
        components: vec![
            OutfitComponent { item: "Oxford shirt".into(), description: "Crisp white cotton".into(), category: Category::Top },
            OutfitComponent { item: "Wool trousers".into(), description: "Charcoal, tapered".into(), category: Category::Bottom },
            OutfitComponent { item: "Derby shoes".into(), description: "Dark brown leather".into(), category: Category::Footwear },
            OutfitComponent { item: "Leather watch".into(), description: "Minimal steel face".into(), category: Category::Accessory },
        ],
        layering_advice: None,
        style_psychology: "Muted tones read as calm competence.".into(),
    }
}
