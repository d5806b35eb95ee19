//! Query template rendering.
//!
//! Catalogued SQL templates carry `{token}` placeholders which are replaced
//! with values from the [`ReportContext`]. Numeric tokens accept a zero-pad
//! width, e.g. `{month:02}` renders March as `03` while `{month}` renders `3`.
//!
//! The token set is closed. An unknown token, or a token whose value the
//! context does not carry, is an error rather than being left in the query.

use std::sync::LazyLock;

use habitat_common::format_numeric;
use habitat_model::ReportContext;
use regex::{Captures, Regex};

use crate::error::TemplateError;

static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([a-z_][a-z0-9_]*)(?::(0[1-9]))?\}").expect("Invalid placeholder regex")
});

/// Placeholder tokens recognized in query templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Year,
    Month,
    Semester,
    SemesterStart,
    SemesterEnd,
    Region,
    Programme,
    Subprogram,
    Notification,
    AidAmount,
}

impl Token {
    pub const ALL: [Token; 10] = [
        Token::Year,
        Token::Month,
        Token::Semester,
        Token::SemesterStart,
        Token::SemesterEnd,
        Token::Region,
        Token::Programme,
        Token::Subprogram,
        Token::Notification,
        Token::AidAmount,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Semester => "semester",
            Self::SemesterStart => "semester_start",
            Self::SemesterEnd => "semester_end",
            Self::Region => "region",
            Self::Programme => "programme",
            Self::Subprogram => "subprogram",
            Self::Notification => "notification",
            Self::AidAmount => "aid_amount",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|token| token.name() == name)
    }

    /// Whether the token renders a number (and so accepts a pad width).
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Year
                | Self::Month
                | Self::Semester
                | Self::SemesterStart
                | Self::SemesterEnd
                | Self::AidAmount
        )
    }
}

/// One placeholder occurrence in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Placeholder as written, braces included.
    pub raw: String,
    pub name: String,
    pub width: Option<usize>,
}

impl Placeholder {
    pub fn token(&self) -> Option<Token> {
        Token::from_name(&self.name)
    }

    fn from_captures(caps: &Captures<'_>) -> Self {
        Self {
            raw: caps[0].to_string(),
            name: caps[1].to_string(),
            width: caps.get(2).and_then(|w| w.as_str().parse().ok()),
        }
    }
}

/// Lists the placeholders used by a template, in order of appearance.
pub fn placeholders(template: &str) -> Vec<Placeholder> {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .map(|caps| Placeholder::from_captures(&caps))
        .collect()
}

/// Renders a query template against a report context.
///
/// Text values are escaped for use inside single-quoted SQL literals.
pub fn render_query(template: &str, context: &ReportContext) -> Result<String, TemplateError> {
    let mut rendered = String::with_capacity(template.len());
    let mut last = 0;
    for caps in PLACEHOLDER_REGEX.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        rendered.push_str(&template[last..whole.start()]);
        let placeholder = Placeholder::from_captures(&caps);
        rendered.push_str(&render_placeholder(&placeholder, context)?);
        last = whole.end();
    }
    rendered.push_str(&template[last..]);
    Ok(rendered)
}

fn render_placeholder(
    placeholder: &Placeholder,
    context: &ReportContext,
) -> Result<String, TemplateError> {
    let token = placeholder
        .token()
        .ok_or_else(|| TemplateError::UnknownPlaceholder {
            placeholder: placeholder.raw.clone(),
        })?;
    if placeholder.width.is_some() && !token.is_numeric() {
        return Err(TemplateError::InvalidFormat {
            placeholder: placeholder.raw.clone(),
        });
    }
    let missing = || TemplateError::MissingValue {
        placeholder: placeholder.raw.clone(),
    };
    let target = context.target();
    let value = match token {
        Token::Year => context.year().to_string(),
        Token::Month => context.month().ok_or_else(missing)?.to_string(),
        Token::Semester => context.semester().ok_or_else(missing)?.to_string(),
        Token::SemesterStart => context.semester_bounds().ok_or_else(missing)?.0.to_string(),
        Token::SemesterEnd => context.semester_bounds().ok_or_else(missing)?.1.to_string(),
        Token::Region => escape_literal(context.region()),
        Token::Programme => escape_literal(target.ok_or_else(missing)?.programme()),
        Token::Subprogram => {
            escape_literal(target.and_then(|t| t.subprogram()).ok_or_else(missing)?)
        }
        Token::Notification => {
            escape_literal(target.and_then(|t| t.notification()).ok_or_else(missing)?)
        }
        Token::AidAmount => format_numeric(target.and_then(|t| t.aid_amount()).ok_or_else(missing)?),
    };
    Ok(match placeholder.width {
        Some(width) => format!("{value:0>width$}"),
        None => value,
    })
}

fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}
