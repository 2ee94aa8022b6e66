use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt::Write;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("format pattern is empty")]
    Empty,
    #[error("format pattern contains an invalid specifier: {0}")]
    InvalidSpecifier(String),
    #[error("format pattern cannot be rendered from a local timestamp: {0}")]
    Unrenderable(String),
}

/// A strftime-style pattern that has been checked against chrono's parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    pattern: String,
}

impl NameTemplate {
    pub fn render(&self, timestamp: &NaiveDateTime) -> Result<String, TemplateError> {
        let mut out = String::new();
        write!(out, "{}", timestamp.format(&self.pattern))
            .map_err(|_| TemplateError::Unrenderable(self.pattern.clone()))?;
        Ok(out)
    }
}

pub fn validate_template(input: &str) -> Result<(), TemplateError> {
    parse_template(input).map(|_| ())
}

pub fn parse_template(input: &str) -> Result<NameTemplate, TemplateError> {
    if input.is_empty() {
        return Err(TemplateError::Empty);
    }

    if StrftimeItems::new(input).any(|item| matches!(item, Item::Error)) {
        return Err(TemplateError::InvalidSpecifier(input.to_string()));
    }

    let template = NameTemplate {
        pattern: input.to_string(),
    };
    // Offset and zone specifiers parse fine but fail on a naive timestamp.
    let probe = NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    template.render(&probe)?;

    Ok(template)
}
