use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Denomination, MaritalStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub postal_code: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spouse {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub denomination: Denomination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    pub iban: String,
    pub bank_name: String,
}

/// Personal data snapshot held by a filing.
///
/// Only the identity fields (name, address, marital status, spouse,
/// children, bank accounts, church membership) travel between a primary
/// filing and its secondaries; see [`PersonalData::inherited`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalData {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub address: Address,
    pub marital_status: MaritalStatus,
    pub spouse: Option<Spouse>,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub bank_accounts: Vec<BankAccount>,
    pub denomination: Denomination,

    // Filing-local, never copied between filings.
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl PersonalData {
    /// Builds the personal data of a new secondary filing: the identity
    /// fields are cloned, everything else starts empty.
    pub fn inherited(&self) -> Self {
        Self {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            address: self.address.clone(),
            marital_status: self.marital_status,
            spouse: self.spouse.clone(),
            children: self.children,
            bank_accounts: self.bank_accounts.clone(),
            denomination: self.denomination,
            date_of_birth: None,
            email: None,
            phone: None,
        }
    }

    /// Overwrites the identity fields with clones of `source`'s, keeping the
    /// filing-local fields of `self`.
    pub fn apply_inherited(
        &mut self,
        source: &PersonalData,
    ) {
        self.first_name.clone_from(&source.first_name);
        self.last_name.clone_from(&source.last_name);
        self.address.clone_from(&source.address);
        self.marital_status = source.marital_status;
        self.spouse.clone_from(&source.spouse);
        self.children = source.children;
        self.bank_accounts.clone_from(&source.bank_accounts);
        self.denomination = source.denomination;
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> PersonalData {
        PersonalData {
            first_name: "Anna".to_string(),
            last_name: "Muster".to_string(),
            address: Address {
                street: "Bahnhofstrasse 1".to_string(),
                postal_code: "8001".to_string(),
                city: "Zürich".to_string(),
            },
            marital_status: MaritalStatus::Married,
            spouse: Some(Spouse {
                first_name: "Beat".to_string(),
                last_name: "Muster".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1980, 5, 1),
                denomination: Denomination::Reformed,
            }),
            children: 2,
            bank_accounts: vec![BankAccount {
                iban: "CH93 0076 2011 6238 5295 7".to_string(),
                bank_name: "Testbank".to_string(),
            }],
            denomination: Denomination::RomanCatholic,
            date_of_birth: NaiveDate::from_ymd_opt(1982, 3, 14),
            email: Some("anna@example.ch".to_string()),
            phone: None,
        }
    }

    #[test]
    fn inherited_copies_identity_fields_only() {
        let source = sample();

        let copy = source.inherited();

        assert_eq!(copy.first_name, source.first_name);
        assert_eq!(copy.address, source.address);
        assert_eq!(copy.spouse, source.spouse);
        assert_eq!(copy.children, 2);
        assert_eq!(copy.bank_accounts, source.bank_accounts);
        assert_eq!(copy.denomination, Denomination::RomanCatholic);
        assert_eq!(copy.date_of_birth, None);
        assert_eq!(copy.email, None);
    }

    #[test]
    fn inherited_does_not_share_buffers() {
        let source = sample();

        let copy = source.inherited();

        assert_ne!(copy.first_name.as_ptr(), source.first_name.as_ptr());
        assert_ne!(copy.bank_accounts.as_ptr(), source.bank_accounts.as_ptr());
    }

    #[test]
    fn apply_inherited_keeps_local_fields() {
        let source = sample();
        let mut target = source.inherited();
        target.email = Some("office@example.ch".to_string());

        let mut updated = source.clone();
        updated.last_name = "Beispiel".to_string();
        updated.children = 3;
        target.apply_inherited(&updated);

        assert_eq!(target.last_name, "Beispiel");
        assert_eq!(target.children, 3);
        assert_eq!(target.email.as_deref(), Some("office@example.ch"));
    }
}
