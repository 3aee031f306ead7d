use crate::domain::{DsfError, DsfResult};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Bool,
    Int,
    Double,
    Str,
}

impl AttributeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Double => "double",
            Self::Str => "string",
        }
    }
}

/// Value of a non-fitted function attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(String),
}

impl AttributeValue {
    pub const fn kind(&self) -> AttributeKind {
        match self {
            Self::Bool(_) => AttributeKind::Bool,
            Self::Int(_) => AttributeKind::Int,
            Self::Double(_) => AttributeKind::Double,
            Self::Str(_) => AttributeKind::Str,
        }
    }

    /// Parse a raw string as the declared kind of an attribute.
    pub fn parse(kind: AttributeKind, raw: &str) -> DsfResult<Self> {
        let value = Self::Str(raw.to_string());
        Ok(match kind {
            AttributeKind::Bool => Self::Bool(value.as_bool()?),
            AttributeKind::Int => Self::Int(value.as_int()?),
            AttributeKind::Double => Self::Double(value.as_double()?),
            AttributeKind::Str => value,
        })
    }

    pub fn as_bool(&self) -> DsfResult<bool> {
        match self {
            Self::Bool(value) => Ok(*value),
            Self::Int(value) => Ok(*value != 0),
            Self::Str(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" | "" => Ok(false),
                _ => Err(conversion_error(self, AttributeKind::Bool)),
            },
            Self::Double(_) => Err(conversion_error(self, AttributeKind::Bool)),
        }
    }

    pub fn as_int(&self) -> DsfResult<i64> {
        match self {
            Self::Int(value) => Ok(*value),
            Self::Double(value) if value.fract() == 0.0 && value.is_finite() => Ok(*value as i64),
            Self::Str(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|_| conversion_error(self, AttributeKind::Int)),
            _ => Err(conversion_error(self, AttributeKind::Int)),
        }
    }

    pub fn as_double(&self) -> DsfResult<f64> {
        match self {
            Self::Double(value) => Ok(*value),
            Self::Int(value) => Ok(*value as f64),
            Self::Str(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|_| conversion_error(self, AttributeKind::Double)),
            Self::Bool(_) => Err(conversion_error(self, AttributeKind::Double)),
        }
    }

    pub fn as_string(&self) -> DsfResult<String> {
        match self {
            Self::Str(value) => Ok(value.clone()),
            _ => Err(conversion_error(self, AttributeKind::Str)),
        }
    }
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value}"),
            Self::Str(value) => write!(f, "\"{value}\""),
        }
    }
}

fn conversion_error(value: &AttributeValue, expected: AttributeKind) -> DsfError {
    DsfError::input_validation(
        "INPUT.ATTRIBUTE_TYPE",
        format!(
            "attribute value {} cannot be read as {}",
            value,
            expected.as_str()
        ),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDeclaration {
    pub name: &'static str,
    pub default: AttributeValue,
}

impl AttributeDeclaration {
    pub fn new(name: &'static str, default: AttributeValue) -> Self {
        Self { name, default }
    }

    pub fn kind(&self) -> AttributeKind {
        self.default.kind()
    }
}
