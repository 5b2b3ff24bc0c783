use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Canton;

/// A municipality and the multiplier it applies to the cantonal tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Municipality {
    /// Federal statistical office (BFS) number.
    pub bfs_id: u32,
    pub name: String,
    pub multiplier: Decimal,
}

/// All municipalities of one canton for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MunicipalityTable {
    pub canton: Canton,
    pub tax_year: i32,
    pub municipalities: Vec<Municipality>,
}

impl MunicipalityTable {
    /// Finds a municipality by BFS number or by name (case-insensitive).
    pub fn find(
        &self,
        key: &str,
    ) -> Option<&Municipality> {
        let key = key.trim();
        if let Ok(id) = key.parse::<u32>() {
            return self.municipalities.iter().find(|m| m.bfs_id == id);
        }
        self.municipalities
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(key))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn table() -> MunicipalityTable {
        MunicipalityTable {
            canton: Canton::Zurich,
            tax_year: 2024,
            municipalities: vec![
                Municipality {
                    bfs_id: 261,
                    name: "Zürich".to_string(),
                    multiplier: dec!(1.19),
                },
                Municipality {
                    bfs_id: 230,
                    name: "Winterthur".to_string(),
                    multiplier: dec!(1.25),
                },
            ],
        }
    }

    #[test]
    fn find_by_bfs_number() {
        let table = table();

        assert_eq!(table.find("230").map(|m| m.multiplier), Some(dec!(1.25)));
    }

    #[test]
    fn find_by_name_ignores_ascii_case() {
        let table = table();

        assert_eq!(table.find("winterthur").map(|m| m.bfs_id), Some(230));
        assert_eq!(table.find(" ZüRICH ").map(|m| m.bfs_id), Some(261));
    }

    #[test]
    fn find_unknown_returns_none() {
        let table = table();

        assert_eq!(table.find("Bern"), None);
        assert_eq!(table.find("999"), None);
    }
}
