use std::fmt;

use serde::{Deserialize, Serialize};

/// The 26 Swiss cantons, identified by their official two-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Canton {
    #[serde(rename = "AG")]
    Aargau,
    #[serde(rename = "AI")]
    AppenzellInnerrhoden,
    #[serde(rename = "AR")]
    AppenzellAusserrhoden,
    #[serde(rename = "BE")]
    Bern,
    #[serde(rename = "BL")]
    BaselLandschaft,
    #[serde(rename = "BS")]
    BaselStadt,
    #[serde(rename = "FR")]
    Fribourg,
    #[serde(rename = "GE")]
    Geneva,
    #[serde(rename = "GL")]
    Glarus,
    #[serde(rename = "GR")]
    Graubunden,
    #[serde(rename = "JU")]
    Jura,
    #[serde(rename = "LU")]
    Lucerne,
    #[serde(rename = "NE")]
    Neuchatel,
    #[serde(rename = "NW")]
    Nidwalden,
    #[serde(rename = "OW")]
    Obwalden,
    #[serde(rename = "SG")]
    StGallen,
    #[serde(rename = "SH")]
    Schaffhausen,
    #[serde(rename = "SO")]
    Solothurn,
    #[serde(rename = "SZ")]
    Schwyz,
    #[serde(rename = "TG")]
    Thurgau,
    #[serde(rename = "TI")]
    Ticino,
    #[serde(rename = "UR")]
    Uri,
    #[serde(rename = "VD")]
    Vaud,
    #[serde(rename = "VS")]
    Valais,
    #[serde(rename = "ZG")]
    Zug,
    #[serde(rename = "ZH")]
    Zurich,
}

impl Canton {
    pub const ALL: [Canton; 26] = [
        Self::Aargau,
        Self::AppenzellInnerrhoden,
        Self::AppenzellAusserrhoden,
        Self::Bern,
        Self::BaselLandschaft,
        Self::BaselStadt,
        Self::Fribourg,
        Self::Geneva,
        Self::Glarus,
        Self::Graubunden,
        Self::Jura,
        Self::Lucerne,
        Self::Neuchatel,
        Self::Nidwalden,
        Self::Obwalden,
        Self::StGallen,
        Self::Schaffhausen,
        Self::Solothurn,
        Self::Schwyz,
        Self::Thurgau,
        Self::Ticino,
        Self::Uri,
        Self::Vaud,
        Self::Valais,
        Self::Zug,
        Self::Zurich,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aargau => "AG",
            Self::AppenzellInnerrhoden => "AI",
            Self::AppenzellAusserrhoden => "AR",
            Self::Bern => "BE",
            Self::BaselLandschaft => "BL",
            Self::BaselStadt => "BS",
            Self::Fribourg => "FR",
            Self::Geneva => "GE",
            Self::Glarus => "GL",
            Self::Graubunden => "GR",
            Self::Jura => "JU",
            Self::Lucerne => "LU",
            Self::Neuchatel => "NE",
            Self::Nidwalden => "NW",
            Self::Obwalden => "OW",
            Self::StGallen => "SG",
            Self::Schaffhausen => "SH",
            Self::Solothurn => "SO",
            Self::Schwyz => "SZ",
            Self::Thurgau => "TG",
            Self::Ticino => "TI",
            Self::Uri => "UR",
            Self::Vaud => "VD",
            Self::Valais => "VS",
            Self::Zug => "ZG",
            Self::Zurich => "ZH",
        }
    }

    /// Parses a canton code. Matching is case-insensitive and ignores
    /// surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        let code = s.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }
}

impl fmt::Display for Canton {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
