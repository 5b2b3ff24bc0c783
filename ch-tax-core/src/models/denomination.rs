use serde::{Deserialize, Serialize};

/// Church membership as declared by the taxpayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Denomination {
    None,
    Reformed,
    RomanCatholic,
    ChristCatholic,
    Jewish,
}

impl Denomination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Reformed => "reformed",
            Self::RomanCatholic => "roman_catholic",
            Self::ChristCatholic => "christ_catholic",
            Self::Jewish => "jewish",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Some(Self::None),
            "reformed" | "protestant" => Some(Self::Reformed),
            "roman_catholic" | "catholic" => Some(Self::RomanCatholic),
            "christ_catholic" => Some(Self::ChristCatholic),
            "jewish" => Some(Self::Jewish),
            _ => None,
        }
    }

    pub fn is_member(&self) -> bool {
        !matches!(self, Self::None)
    }
}
