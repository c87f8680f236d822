// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Duration;

use crate::{FieldPath, User, UserId};

pub const SUCCESS_MESSAGE: &str = "User added successfully";
pub const SUCCESS_NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Email,
    Tel,
    Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormSection {
    Address,
}

impl FormSection {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Address => "Address",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPattern {
    /// `non-whitespace@non-whitespace`
    Email,
}

impl FieldPattern {
    pub fn matches(self, value: &str) -> bool {
        match self {
            Self::Email => email_pattern().is_match(value),
        }
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^\S+@\S+$").expect("valid email pattern"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternRule {
    pub pattern: FieldPattern,
    pub message: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormFieldSpec {
    pub path: FieldPath,
    pub label: &'static str,
    pub input: InputKind,
    pub required: Option<&'static str>,
    pub pattern: Option<PatternRule>,
    pub section: Option<FormSection>,
}

const fn field(
    path: FieldPath,
    label: &'static str,
    input: InputKind,
    required: Option<&'static str>,
    section: Option<FormSection>,
) -> FormFieldSpec {
    FormFieldSpec {
        path,
        label,
        input,
        required,
        pattern: None,
        section,
    }
}

pub const ADD_USER_FIELDS: [FormFieldSpec; 10] = [
    field(
        FieldPath::Name,
        "Name",
        InputKind::Text,
        Some("Name is required"),
        None,
    ),
    field(
        FieldPath::Username,
        "Username",
        InputKind::Text,
        Some("Username is required"),
        None,
    ),
    FormFieldSpec {
        pattern: Some(PatternRule {
            pattern: FieldPattern::Email,
            message: "Invalid email format",
        }),
        ..field(
            FieldPath::Email,
            "Email",
            InputKind::Email,
            Some("Email is required"),
            None,
        )
    },
    field(
        FieldPath::AddressStreet,
        "Street",
        InputKind::Text,
        Some("Street is required"),
        Some(FormSection::Address),
    ),
    field(
        FieldPath::AddressSuite,
        "Suite",
        InputKind::Text,
        None,
        Some(FormSection::Address),
    ),
    field(
        FieldPath::AddressCity,
        "City",
        InputKind::Text,
        Some("City is required"),
        Some(FormSection::Address),
    ),
    field(
        FieldPath::AddressZipcode,
        "Zipcode",
        InputKind::Text,
        Some("Zipcode is required"),
        Some(FormSection::Address),
    ),
    field(
        FieldPath::Phone,
        "Phone",
        InputKind::Tel,
        Some("Phone is required"),
        None,
    ),
    field(
        FieldPath::CompanyName,
        "Company Name",
        InputKind::Text,
        Some("Company name is required"),
        None,
    ),
    field(
        FieldPath::Website,
        "Website",
        InputKind::Url,
        Some("Website is required"),
        None,
    ),
];

/// A run of consecutive fields sharing the same section tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldGroup {
    pub section: Option<FormSection>,
    pub fields: Vec<&'static FormFieldSpec>,
}

pub fn field_groups() -> Vec<FieldGroup> {
    let mut groups: Vec<FieldGroup> = Vec::new();
    for spec in &ADD_USER_FIELDS {
        match groups.last_mut() {
            Some(group) if group.section == spec.section => group.fields.push(spec),
            _ => groups.push(FieldGroup {
                section: spec.section,
                fields: vec![spec],
            }),
        }
    }
    groups
}

/// Checks `draft` against every descriptor. Each failing field gets exactly
/// one message: the required message wins over the pattern message.
pub fn validate_draft(draft: &User) -> BTreeMap<FieldPath, String> {
    let mut errors = BTreeMap::new();
    for spec in &ADD_USER_FIELDS {
        let value = spec.path.text(draft);
        if value.is_empty() {
            if let Some(message) = spec.required {
                errors.insert(spec.path, message.to_owned());
            }
            continue;
        }
        if let Some(rule) = spec.pattern {
            if !rule.pattern.matches(value) {
                errors.insert(spec.path, rule.message.to_owned());
            }
        }
    }
    errors
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rejected { invalid_fields: usize },
    Submitted { notice_token: u64 },
}

/// Working draft for the add-user form.
///
/// The success notice is identified by a token. Anything that should clear
/// the notice later must present the same token; starting a new submission or
/// discarding the form moves the token on, so stale clears do nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserForm {
    draft: User,
    errors: BTreeMap<FieldPath, String>,
    notice: Option<u64>,
    notice_token: u64,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            draft: User::empty(),
            errors: BTreeMap::new(),
            notice: None,
            notice_token: 0,
        }
    }
}

impl UserForm {
    pub fn draft(&self) -> &User {
        &self.draft
    }

    pub fn value(&self, path: FieldPath) -> &str {
        path.text(&self.draft)
    }

    pub fn set_value(&mut self, path: FieldPath, value: impl Into<String>) {
        path.assign(&mut self.draft, value.into());
    }

    pub fn push_char(&mut self, path: FieldPath, ch: char) {
        let mut value = self.value(path).to_owned();
        value.push(ch);
        self.set_value(path, value);
    }

    pub fn pop_char(&mut self, path: FieldPath) {
        let mut value = self.value(path).to_owned();
        value.pop();
        self.set_value(path, value);
    }

    pub fn error(&self, path: FieldPath) -> Option<&str> {
        self.errors.get(&path).map(String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<FieldPath, String> {
        &self.errors
    }

    pub fn success_message(&self) -> Option<&'static str> {
        self.notice.map(|_| SUCCESS_MESSAGE)
    }

    /// Validates the draft and, when it passes, hands a copy to `on_record`.
    ///
    /// On success the draft resets to empty and a fresh success notice is
    /// raised. When `on_record` fails the draft is kept and the error returned.
    pub fn submit<F>(&mut self, on_record: F) -> Result<SubmitOutcome>
    where
        F: FnOnce(User) -> Result<()>,
    {
        self.cancel_notice();

        self.errors = validate_draft(&self.draft);
        if !self.errors.is_empty() {
            return Ok(SubmitOutcome::Rejected {
                invalid_fields: self.errors.len(),
            });
        }

        let mut record = self.draft.clone();
        record.id = UserId::UNASSIGNED;
        on_record(record)?;

        self.draft = User::empty();
        self.notice_token = self.notice_token.saturating_add(1);
        self.notice = Some(self.notice_token);
        Ok(SubmitOutcome::Submitted {
            notice_token: self.notice_token,
        })
    }

    /// Clears the success notice if `token` still names it.
    pub fn expire_notice(&mut self, token: u64) -> bool {
        if self.notice == Some(token) {
            self.notice = None;
            return true;
        }
        false
    }

    pub fn cancel_notice(&mut self) {
        self.notice = None;
        self.notice_token = self.notice_token.saturating_add(1);
    }

    /// Tears the form down: empty draft, no errors, no pending notice.
    pub fn discard(&mut self) {
        self.cancel_notice();
        self.draft = User::empty();
        self.errors.clear();
    }
}
