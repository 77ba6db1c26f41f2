//! Typed search-parameter model.
//!
//! A decoded query parameter is represented as a [`TypedSearchValue`] — one
//! closed variant per FHIR search parameter type — wrapped in a
//! [`RequestSearchParameter`] envelope that retains the caller's literal
//! `name`/`value` strings for validation and error reporting. Construction is
//! the job of an external parsing stage; downstream query building pattern
//! matches on the variants without re-parsing.

use serde::{Deserialize, Serialize};
use std::fmt;
use time::PrimitiveDateTime;

/// FHIR search parameter type enumeration
/// See: https://hl7.org/fhir/search.html#table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchParameterType {
    Number,
    Date,
    String,
    Token,
    Reference,
    Composite,
    Quantity,
    Uri,
    Special,
}

impl SearchParameterType {
    /// Parse a search parameter type from its wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "number" => Some(Self::Number),
            "date" => Some(Self::Date),
            "string" => Some(Self::String),
            "token" => Some(Self::Token),
            "reference" => Some(Self::Reference),
            "composite" => Some(Self::Composite),
            "quantity" => Some(Self::Quantity),
            "uri" => Some(Self::Uri),
            "special" => Some(Self::Special),
            _ => None,
        }
    }
}

impl fmt::Display for SearchParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Number => "number",
            Self::Date => "date",
            Self::String => "string",
            Self::Token => "token",
            Self::Reference => "reference",
            Self::Composite => "composite",
            Self::Quantity => "quantity",
            Self::Uri => "uri",
            Self::Special => "special",
        };
        f.write_str(s)
    }
}

/// Comparison prefixes for number/date/quantity search values
/// e.g., `ge2020-01-01`, `lt5.0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPrefix {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Sa, // starts after
    Eb, // ends before
    Ap, // approximately
}

impl SearchPrefix {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "eq" => Some(Self::Eq),
            "ne" => Some(Self::Ne),
            "gt" => Some(Self::Gt),
            "lt" => Some(Self::Lt),
            "ge" => Some(Self::Ge),
            "le" => Some(Self::Le),
            "sa" => Some(Self::Sa),
            "eb" => Some(Self::Eb),
            "ap" => Some(Self::Ap),
            _ => None,
        }
    }
}

impl fmt::Display for SearchPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SearchPrefix::Eq => "eq",
            SearchPrefix::Ne => "ne",
            SearchPrefix::Gt => "gt",
            SearchPrefix::Lt => "lt",
            SearchPrefix::Ge => "ge",
            SearchPrefix::Le => "le",
            SearchPrefix::Sa => "sa",
            SearchPrefix::Eb => "eb",
            SearchPrefix::Ap => "ap",
        };
        f.write_str(s)
    }
}

/// Search modifiers, applied as a suffix to the parameter name (`name:modifier`).
///
/// Unrecognized modifiers are retained verbatim in `Other` so validation can
/// report the caller's literal input instead of dropping it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchModifier {
    Exact,
    Contains,
    Text,
    In,
    NotIn,
    Below,
    Above,
    Not,
    Identifier,
    Missing,
    OfType,
    /// Reference type modifier, e.g. `subject:Patient`
    Type(String),
    /// Raw modifier string that matched no known modifier
    Other(String),
}

impl SearchModifier {
    /// Parse a known modifier name; returns `None` for unknown strings.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "exact" => Some(Self::Exact),
            "contains" => Some(Self::Contains),
            "text" => Some(Self::Text),
            "in" => Some(Self::In),
            "not-in" => Some(Self::NotIn),
            "below" => Some(Self::Below),
            "above" => Some(Self::Above),
            "not" => Some(Self::Not),
            "identifier" => Some(Self::Identifier),
            "missing" => Some(Self::Missing),
            "ofType" => Some(Self::OfType),
            _ => None,
        }
    }

    /// Parse a modifier, falling back to `Other` to keep the raw string.
    ///
    /// A leading-uppercase modifier on a reference parameter is a type
    /// modifier (`subject:Patient`); that decision belongs to the parsing
    /// stage, which constructs `Type` directly.
    #[must_use]
    pub fn from_raw(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| Self::Other(s.to_string()))
    }
}

/// Numeric search value: FHIR permits both whole numbers and decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchNumber {
    Integer(i64),
    Decimal(f64),
}

impl SearchNumber {
    /// Parse a numeric literal, preferring the integer representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if let Ok(i) = s.parse::<i64>() {
            return Some(Self::Integer(i));
        }
        s.parse::<f64>().ok().map(Self::Decimal)
    }

    /// Numeric value as f64 regardless of representation.
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Integer(i) => *i as f64,
            Self::Decimal(d) => *d,
        }
    }
}

impl fmt::Display for SearchNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
        }
    }
}

/// A decoded search parameter value, one variant per parameter type.
///
/// Every variant is immutable once built. Token and reference fields are
/// independently optional: `system|` supplies only a system, `|code` only a
/// code, and a reference may carry any combination of type, id and url.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TypedSearchValue {
    Number {
        prefix: SearchPrefix,
        value: SearchNumber,
    },
    String {
        value: String,
    },
    Uri {
        uri: String,
    },
    Date {
        prefix: SearchPrefix,
        value: PrimitiveDateTime,
    },
    Token {
        system: Option<String>,
        code: Option<String>,
    },
    Reference {
        resource_type: Option<String>,
        id: Option<String>,
        url: Option<String>,
    },
    Composite {
        value: String,
    },
    Quantity {
        prefix: Option<SearchPrefix>,
        number: SearchNumber,
        system: Option<String>,
        code: Option<String>,
    },
    Special {
        value: String,
    },
}

impl TypedSearchValue {
    /// Build a number value; an absent prefix defaults to `eq`.
    pub fn number(prefix: Option<SearchPrefix>, value: SearchNumber) -> Self {
        Self::Number {
            prefix: prefix.unwrap_or(SearchPrefix::Eq),
            value,
        }
    }

    /// Build a date value; an absent prefix defaults to `eq`.
    pub fn date(prefix: Option<SearchPrefix>, value: PrimitiveDateTime) -> Self {
        Self::Date {
            prefix: prefix.unwrap_or(SearchPrefix::Eq),
            value,
        }
    }

    /// Build a quantity value. The prefix stays optional: implicit equality
    /// for prefix-less quantities is decided at query execution, not here.
    pub fn quantity(
        prefix: Option<SearchPrefix>,
        number: SearchNumber,
        system: Option<String>,
        code: Option<String>,
    ) -> Self {
        Self::Quantity {
            prefix,
            number,
            system,
            code,
        }
    }

    /// The parameter type this value belongs to.
    pub fn kind(&self) -> SearchParameterType {
        match self {
            Self::Number { .. } => SearchParameterType::Number,
            Self::String { .. } => SearchParameterType::String,
            Self::Uri { .. } => SearchParameterType::Uri,
            Self::Date { .. } => SearchParameterType::Date,
            Self::Token { .. } => SearchParameterType::Token,
            Self::Reference { .. } => SearchParameterType::Reference,
            Self::Composite { .. } => SearchParameterType::Composite,
            Self::Quantity { .. } => SearchParameterType::Quantity,
            Self::Special { .. } => SearchParameterType::Special,
        }
    }
}

/// Immutable envelope pairing a typed value with the raw query-string input
/// it was decoded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSearchParameter {
    name: String,
    raw_value: String,
    kind: SearchParameterType,
    #[serde(skip_serializing_if = "Option::is_none")]
    modifier: Option<SearchModifier>,
    value: TypedSearchValue,
}

impl RequestSearchParameter {
    pub fn new(
        name: impl Into<String>,
        raw_value: impl Into<String>,
        modifier: Option<SearchModifier>,
        value: TypedSearchValue,
    ) -> Self {
        let kind = value.kind();
        Self {
            name: name.into(),
            raw_value: raw_value.into(),
            kind,
            modifier,
            value,
        }
    }

    /// The parameter name exactly as it appeared in the query string.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameter value exactly as it appeared in the query string.
    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    pub fn kind(&self) -> SearchParameterType {
        self.kind
    }

    pub fn modifier(&self) -> Option<&SearchModifier> {
        self.modifier.as_ref()
    }

    pub fn value(&self) -> &TypedSearchValue {
        &self.value
    }
}

/// A search parameter definition bound to one or more resource types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParameterDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SearchParameterType,
    pub base: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl SearchParameterDefinition {
    pub fn new(
        name: impl Into<String>,
        kind: SearchParameterType,
        base: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            base,
            expression: None,
        }
    }

    /// Set the FHIRPath expression.
    #[must_use]
    pub fn with_expression(mut self, expr: impl Into<String>) -> Self {
        self.expression = Some(expr.into());
        self
    }

    /// Check if this parameter applies to a given resource type.
    pub fn applies_to(&self, resource_type: &str) -> bool {
        self.base.iter().any(|b| b == resource_type)
    }
}
