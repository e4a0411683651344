use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Unknown {kind} code {code}")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub code: u8,
}

///
/// Declares an enum that travels over the wire as its small
/// integer code, and renders in the dashboard as its label.
///
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $( $variant:ident = $code:literal => $label:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(try_from = "u8", into = "u8")]
        pub enum $name { $( $variant ),+ }

        impl $name {
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            pub fn code(self) -> u8 {
                match self { $( $name::$variant => $code ),+ }
            }

            pub fn label(self) -> &'static str {
                match self { $( $name::$variant => $label ),+ }
            }

            /// Parses the code as submitted by an HTML form field
            pub fn from_form(value: &str) -> Option<Self> {
                value.trim().parse::<u8>().ok().and_then(|code| Self::try_from(code).ok())
            }

            /// `(code, label)` pairs for select inputs
            pub fn options() -> Vec<(String, String)> {
                Self::ALL.iter().map(|v| (v.code().to_string(), v.label().to_string())).collect()
            }
        }

        impl TryFrom<u8> for $name {
            type Error = $crate::models::UnknownCode;
            fn try_from(code: u8) -> ::std::result::Result<Self, Self::Error> {
                match code {
                    $( $code => Ok($name::$variant), )+
                    _ => Err($crate::models::UnknownCode { kind: stringify!($name), code }),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 { value.code() }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

pub(crate) use coded_enum;

coded_enum! {
    /// Status shared by users, addresses and products
    ActiveStatus { Active = 1 => "Active", Inactive = 2 => "Inactive" }
}

coded_enum! {
    /// Status shared by payments and withdrawals
    SettlementStatus { Pending = 1 => "Pending", Completed = 2 => "Completed", Canceled = 3 => "Canceled" }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserType {
    Admin,
    User,
}

impl UserType {
    pub const ALL: &'static [UserType] = &[UserType::Admin, UserType::User];

    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Admin => "ADMIN",
            UserType::User => "USER",
        }
    }

    pub fn from_form(value: &str) -> Option<Self> {
        match value.trim() {
            "ADMIN" => Some(UserType::Admin),
            "USER" => Some(UserType::User),
            _ => None,
        }
    }

    pub fn options() -> Vec<(String, String)> {
        Self::ALL.iter().map(|t| (t.as_str().to_string(), t.as_str().to_string())).collect()
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// Returns the trimmed value when it carries any content. The API
/// uses both `null` and `""` for "not set", and every screen treats
/// them the same way.
///
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Deserializes `null`, a missing field or `""` as `None`
pub fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(Error::custom),
    }
}

/// Deserializes a list of ids, dropping `null` and empty entries
pub fn compact_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<Vec<Option<String>>> = Option::deserialize(deserializer)?;
    Ok(opt
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter(|id| !id.trim().is_empty())
        .collect())
}

#[cfg(test)]
mod test {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "empty_as_none")]
        at: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "compact_ids")]
        ids: Vec<String>,
        status: Option<SettlementStatus>,
    }

    #[test]
    fn test_empty_and_null_timestamps_are_absent() -> anyhow::Result<()> {
        let probe: Probe = serde_json::from_str(r#"{"at": "", "status": 2}"#)?;
        assert_eq!(None, probe.at);
        assert_eq!(Some(SettlementStatus::Completed), probe.status);

        let probe: Probe = serde_json::from_str(r#"{"at": null, "ids": null}"#)?;
        assert_eq!(None, probe.at);
        assert!(probe.ids.is_empty());

        let probe: Probe = serde_json::from_str(r#"{"at": "2024-11-10T12:03:34Z"}"#)?;
        assert_eq!(Some(1731240214), probe.at.map(|at| at.timestamp()));
        Ok(())
    }

    #[test]
    fn test_compact_ids_drops_blank_entries() -> anyhow::Result<()> {
        let probe: Probe = serde_json::from_str(r#"{"ids": ["a", null, "", "b"]}"#)?;
        assert_eq!(vec!["a".to_string(), "b".to_string()], probe.ids);
        Ok(())
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        assert!(serde_json::from_str::<SettlementStatus>("4").is_err());
        assert_eq!(Some(ActiveStatus::Inactive), ActiveStatus::from_form(" 2 "));
        assert_eq!(None, ActiveStatus::from_form("x"));
    }

    #[test]
    fn test_present_treats_blank_as_absent() {
        assert_eq!(None, present(&None));
        assert_eq!(None, present(&Some("  ".to_string())));
        assert_eq!(Some("ab"), present(&Some(" ab ".to_string())));
    }
}
