mod canton;
mod church;
mod denomination;
mod federal;
mod financials;
mod marital_status;
mod municipality;
mod personal_data;
mod rule_set;
mod tax_bracket;
mod tax_filing;
mod year_config;

pub use canton::Canton;
pub use church::{ChurchRate, ChurchRuleSet, MunicipalChurchRate};
pub use denomination::Denomination;
pub use federal::FederalRuleSet;
pub use financials::{EmploymentIncome, FilingFinancials, PropertyHolding, SelfEmploymentIncome};
pub use marital_status::MaritalStatus;
pub use municipality::{Municipality, MunicipalityTable};
pub use personal_data::{Address, BankAccount, PersonalData, Spouse};
pub use rule_set::{JurisdictionRuleSet, RateStructure, RuleKind, ThresholdTable};
pub use tax_bracket::TaxBracket;
pub use tax_filing::{FilingRole, FilingStatus, NewTaxFiling, TaxFiling};
pub use year_config::{DeductionLimits, PensionAgeBand, SocialSecurityConfig, YearConfig};
