use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    Married,
    RegisteredPartnership,
    Separated,
    Divorced,
    Widowed,
}

impl MaritalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Married => "married",
            Self::RegisteredPartnership => "registered_partnership",
            Self::Separated => "separated",
            Self::Divorced => "divorced",
            Self::Widowed => "widowed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Some(Self::Single),
            "married" => Some(Self::Married),
            "registered_partnership" => Some(Self::RegisteredPartnership),
            "separated" => Some(Self::Separated),
            "divorced" => Some(Self::Divorced),
            "widowed" => Some(Self::Widowed),
            _ => None,
        }
    }

    /// Joint assessment applies to married couples and registered partners.
    /// Everyone else is assessed on the single tariff.
    pub fn is_joint(&self) -> bool {
        matches!(self, Self::Married | Self::RegisteredPartnership)
    }
}
