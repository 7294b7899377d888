//! Intake form stages and the fixed option sets their fields draw from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One page of the intake form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntakeStage {
    Medical,
    Personal,
    Preferences,
    Review,
}

impl IntakeStage {
    /// Number of stages in the form
    pub const COUNT: u8 = 4;

    pub fn all() -> &'static [IntakeStage] {
        &[
            IntakeStage::Medical,
            IntakeStage::Personal,
            IntakeStage::Preferences,
            IntakeStage::Review,
        ]
    }

    /// 1-based position in the form
    pub fn number(&self) -> u8 {
        match self {
            IntakeStage::Medical => 1,
            IntakeStage::Personal => 2,
            IntakeStage::Preferences => 3,
            IntakeStage::Review => 4,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::all().iter().copied().find(|s| s.number() == number)
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }

    pub fn label(&self) -> &'static str {
        match self {
            IntakeStage::Medical => "Medical Information",
            IntakeStage::Personal => "Personal Details",
            IntakeStage::Preferences => "Preferences",
            IntakeStage::Review => "Review",
        }
    }

    /// Field names collected on this stage
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            IntakeStage::Medical => &["condition", "treatment", "urgency"],
            IntakeStage::Personal => &["fullName", "email", "phone", "country", "age", "gender"],
            IntakeStage::Preferences => {
                &["budget", "destination", "accommodation", "travelCompanion"]
            }
            IntakeStage::Review => &[],
        }
    }
}

impl fmt::Display for IntakeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A field whose value must come from a fixed set
pub trait Choice: Sized + Copy + 'static {
    fn all() -> &'static [Self];

    /// Wire value stored in the inquiry
    fn value(&self) -> &'static str;

    /// Human-readable label
    fn label(&self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.value() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Emergency,
}

impl Choice for Urgency {
    fn all() -> &'static [Self] {
        &[
            Urgency::Low,
            Urgency::Medium,
            Urgency::High,
            Urgency::Emergency,
        ]
    }

    fn value(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
            Urgency::Emergency => "emergency",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Urgency::Low => "Low",
            Urgency::Medium => "Medium",
            Urgency::High => "High",
            Urgency::Emergency => "Emergency",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Choice for Gender {
    fn all() -> &'static [Self] {
        &[Gender::Male, Gender::Female, Gender::Other]
    }

    fn value(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetRange {
    #[serde(rename = "under-5000")]
    Under5k,
    #[serde(rename = "5000-10000")]
    From5kTo10k,
    #[serde(rename = "10000-20000")]
    From10kTo20k,
    #[serde(rename = "20000-50000")]
    From20kTo50k,
    #[serde(rename = "over-50000")]
    Over50k,
}

impl Choice for BudgetRange {
    fn all() -> &'static [Self] {
        &[
            BudgetRange::Under5k,
            BudgetRange::From5kTo10k,
            BudgetRange::From10kTo20k,
            BudgetRange::From20kTo50k,
            BudgetRange::Over50k,
        ]
    }

    fn value(&self) -> &'static str {
        match self {
            BudgetRange::Under5k => "under-5000",
            BudgetRange::From5kTo10k => "5000-10000",
            BudgetRange::From10kTo20k => "10000-20000",
            BudgetRange::From20kTo50k => "20000-50000",
            BudgetRange::Over50k => "over-50000",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            BudgetRange::Under5k => "Under $5,000",
            BudgetRange::From5kTo10k => "$5,000 - $10,000",
            BudgetRange::From10kTo20k => "$10,000 - $20,000",
            BudgetRange::From20kTo50k => "$20,000 - $50,000",
            BudgetRange::Over50k => "Over $50,000",
        }
    }
}

/// Suggested accommodation types. The field itself accepts any text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accommodation {
    #[serde(rename = "hotel-3star")]
    Hotel3Star,
    #[serde(rename = "hotel-4star")]
    Hotel4Star,
    #[serde(rename = "hotel-5star")]
    Hotel5Star,
    #[serde(rename = "apartment")]
    Apartment,
    #[serde(rename = "recovery-center")]
    RecoveryCenter,
}

impl Choice for Accommodation {
    fn all() -> &'static [Self] {
        &[
            Accommodation::Hotel3Star,
            Accommodation::Hotel4Star,
            Accommodation::Hotel5Star,
            Accommodation::Apartment,
            Accommodation::RecoveryCenter,
        ]
    }

    fn value(&self) -> &'static str {
        match self {
            Accommodation::Hotel3Star => "hotel-3star",
            Accommodation::Hotel4Star => "hotel-4star",
            Accommodation::Hotel5Star => "hotel-5star",
            Accommodation::Apartment => "apartment",
            Accommodation::RecoveryCenter => "recovery-center",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Accommodation::Hotel3Star => "3-Star Hotel",
            Accommodation::Hotel4Star => "4-Star Hotel",
            Accommodation::Hotel5Star => "5-Star Hotel",
            Accommodation::Apartment => "Serviced Apartment",
            Accommodation::RecoveryCenter => "Recovery Center",
        }
    }
}

/// Label for a stored choice value, falling back to the raw value
pub fn choice_label<C: Choice>(value: &str) -> String {
    C::parse(value)
        .map(|c| c.label().to_string())
        .unwrap_or_else(|| value.to_string())
}
