//! Validation issues and reports

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Machine-readable issue code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    AgeOutOfRange,
    AgePenaltyAllocation,
    CharacteristicsMissing,
    CharacteristicOutOfRange,
    CharacteristicsStaleAge,
    OccupationMissing,
    OccupationUnknown,
    CreditRatingOutOfRange,
    OccupationChoiceGroup,
    OccupationChoiceNotAllowed,
    OccupationChoiceForbidden,
    OccupationChoiceDuplicate,
    OccupationFormulaChoice,
    OccupationBudgetExceeded,
    OccupationSkillNotAllowed,
    SkillAbsoluteCapExceeded,
    SkillCreationCapExceeded,
    PersonalBudgetExceeded,
    SkillForbiddenPersonal,
    IdentityNameMissing,
    BackgroundInsufficient,
    BackgroundCoreBondMissing,
    EquipmentFieldMissing,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::AgeOutOfRange => "AGE_OUT_OF_RANGE",
            IssueCode::AgePenaltyAllocation => "AGE_PENALTY_ALLOCATION",
            IssueCode::CharacteristicsMissing => "CHARACTERISTICS_MISSING",
            IssueCode::CharacteristicOutOfRange => "CHARACTERISTIC_OUT_OF_RANGE",
            IssueCode::CharacteristicsStaleAge => "CHARACTERISTICS_STALE_AGE",
            IssueCode::OccupationMissing => "OCCUPATION_MISSING",
            IssueCode::OccupationUnknown => "OCCUPATION_UNKNOWN",
            IssueCode::CreditRatingOutOfRange => "CREDIT_RATING_OUT_OF_RANGE",
            IssueCode::OccupationChoiceGroup => "OCCUPATION_CHOICE_GROUP",
            IssueCode::OccupationChoiceNotAllowed => "OCCUPATION_CHOICE_NOT_ALLOWED",
            IssueCode::OccupationChoiceForbidden => "OCCUPATION_CHOICE_FORBIDDEN",
            IssueCode::OccupationChoiceDuplicate => "OCCUPATION_CHOICE_DUPLICATE",
            IssueCode::OccupationFormulaChoice => "OCCUPATION_FORMULA_CHOICE",
            IssueCode::OccupationBudgetExceeded => "OCCUPATION_BUDGET_EXCEEDED",
            IssueCode::OccupationSkillNotAllowed => "OCCUPATION_SKILL_NOT_ALLOWED",
            IssueCode::SkillAbsoluteCapExceeded => "SKILL_ABSOLUTE_CAP_EXCEEDED",
            IssueCode::SkillCreationCapExceeded => "SKILL_CREATION_CAP_EXCEEDED",
            IssueCode::PersonalBudgetExceeded => "PERSONAL_BUDGET_EXCEEDED",
            IssueCode::SkillForbiddenPersonal => "SKILL_FORBIDDEN_PERSONAL",
            IssueCode::IdentityNameMissing => "IDENTITY_NAME_MISSING",
            IssueCode::BackgroundInsufficient => "BACKGROUND_INSUFFICIENT",
            IssueCode::BackgroundCoreBondMissing => "BACKGROUND_CORE_BOND_MISSING",
            IssueCode::EquipmentFieldMissing => "EQUIPMENT_FIELD_MISSING",
        }
    }

    /// Age range and stale rolls only warn
    pub fn severity(&self) -> Severity {
        match self {
            IssueCode::AgeOutOfRange | IssueCode::CharacteristicsStaleAge => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub message: String,
    /// Draft path the issue points at, e.g. "skills.personal.Sigilo"
    pub field: String,
    pub severity: Severity,
}

impl ValidationIssue {
    pub fn new(code: IssueCode, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: field.into(),
            severity: code.severity(),
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Issues found for one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub stage: u8,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| issue.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| !issue.is_error())
    }

    /// The wizard may move past this stage
    #[inline]
    pub fn can_advance(&self) -> bool {
        !self.has_errors()
    }

    pub fn codes(&self) -> Vec<IssueCode> {
        self.issues.iter().map(|issue| issue.code).collect()
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }
}
