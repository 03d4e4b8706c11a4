//! Record types a note can be attached to

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Kind of CRM record referenced by a note association
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Account,
    Contact,
    Opportunity,
}

impl RecordType {
    /// Tag stored in `note_associations.record_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Contact => "contact",
            Self::Opportunity => "opportunity",
        }
    }
}

impl FromStr for RecordType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "account" => Ok(Self::Account),
            "contact" => Ok(Self::Contact),
            "opportunity" => Ok(Self::Opportunity),
            _ => Err(ValidationError::InvalidRecordType),
        }
    }
}

impl TryFrom<String> for RecordType {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tags() {
        assert_eq!("account".parse::<RecordType>().unwrap(), RecordType::Account);
        assert_eq!("contact".parse::<RecordType>().unwrap(), RecordType::Contact);
        assert_eq!(
            "opportunity".parse::<RecordType>().unwrap(),
            RecordType::Opportunity
        );
    }

    #[test]
    fn rejects_unknown_and_mixed_case() {
        assert_eq!(
            "lead".parse::<RecordType>().unwrap_err(),
            ValidationError::InvalidRecordType
        );
        assert!("Account".parse::<RecordType>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&RecordType::Opportunity).unwrap();
        assert_eq!(json, "\"opportunity\"");
    }
}
