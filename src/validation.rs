//! Declarative field validation: a schema maps each field to an ordered rule
//! list, and validating a value bag yields at most one message per field.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;

/// Field name -> current raw value.
pub type FieldValues = BTreeMap<&'static str, String>;

/// Field name -> first failing rule's message. Empty means the step may submit.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Dot-atom local part, then at least two hostname labels.
pub const EMAIL_PATTERN: &str = r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$";

#[derive(Clone)]
pub enum Rule {
    Required(&'static str),
    Matches(Regex, &'static str),
    MinLen(usize, &'static str),
    MaxLen(usize, &'static str),
    Digits(&'static str),
    /// Numeric value must be at least this (e.g. expiry year >= current year).
    AtLeast(i64, &'static str),
    /// Value must be "true" (toggle fields).
    Checked(&'static str),
}

impl Rule {
    /// `None` when the value passes.
    fn check(&self, value: &str) -> Option<&'static str> {
        let ok = match self {
            Rule::Required(_) => !value.trim().is_empty(),
            Rule::Matches(re, _) => re.is_match(value),
            Rule::MinLen(n, _) => value.chars().count() >= *n,
            Rule::MaxLen(n, _) => value.chars().count() <= *n,
            Rule::Digits(_) => value.chars().all(|c| c.is_ascii_digit()),
            Rule::AtLeast(min, _) => value.trim().parse::<i64>().is_ok_and(|v| v >= *min),
            Rule::Checked(_) => value == "true",
        };
        if ok {
            None
        } else {
            Some(self.message())
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Rule::Required(m)
            | Rule::Matches(_, m)
            | Rule::MinLen(_, m)
            | Rule::MaxLen(_, m)
            | Rule::Digits(m)
            | Rule::AtLeast(_, m)
            | Rule::Checked(m) => *m,
        }
    }
}

#[derive(Clone, Default)]
pub struct Schema {
    fields: Vec<(&'static str, Vec<Rule>)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, rules: Vec<Rule>) -> Self {
        self.fields.push((name, rules));
        self
    }

    /// Run every field's rules against `values`.
    ///
    /// An empty value on a field with a `Required` rule reports the required
    /// message only. An empty value on an optional field skips its rules.
    pub fn validate(&self, values: &FieldValues) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for (name, rules) in &self.fields {
            let value = values.get(name).map(String::as_str).unwrap_or("");
            if value.is_empty() {
                if let Some(required) = rules.iter().find(|r| matches!(r, Rule::Required(_))) {
                    errors.insert(*name, required.message().to_string());
                }
                continue;
            }
            if let Some(msg) = rules.iter().find_map(|r| r.check(value)) {
                errors.insert(*name, msg.to_string());
            }
        }
        errors
    }
}

/// Fields the user has interacted with. Errors are only shown for these.
#[derive(Debug, Default, Clone)]
pub struct Touched(BTreeSet<&'static str>);

impl Touched {
    pub fn touch(&mut self, field: &'static str) {
        self.0.insert(field);
    }

    pub fn touch_all<'a>(&mut self, fields: impl IntoIterator<Item = &'a &'static str>) {
        self.0.extend(fields.into_iter().copied());
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.0.contains(field)
    }
}

/// The error to display for `field`: present only once the field is touched.
pub fn visible_error<'a>(errors: &'a FieldErrors, touched: &Touched, field: &str) -> Option<&'a str> {
    if touched.is_touched(field) {
        errors.get(field).map(String::as_str)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&'static str, &str)]) -> FieldValues {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    fn cvv_schema() -> Schema {
        Schema::new().field(
            "cvv",
            vec![
                Rule::Required("Required"),
                Rule::MinLen(3, "Min. 3 characters"),
                Rule::MaxLen(4, "Max. 4 characters"),
                Rule::Matches(Regex::new(r"^\S*$").unwrap(), "No white spaces"),
            ],
        )
    }

    #[test]
    fn empty_required_field_reports_required_only() {
        let errors = cvv_schema().validate(&values(&[("cvv", "")]));
        assert_eq!(errors.get("cvv").map(String::as_str), Some("Required"));
    }

    #[test]
    fn missing_field_counts_as_empty() {
        let errors = cvv_schema().validate(&FieldValues::new());
        assert_eq!(errors.get("cvv").map(String::as_str), Some("Required"));
    }

    #[test]
    fn first_failing_rule_wins() {
        let schema = cvv_schema();
        assert_eq!(schema.validate(&values(&[("cvv", "12")]))["cvv"], "Min. 3 characters");
        assert_eq!(schema.validate(&values(&[("cvv", "12345")]))["cvv"], "Max. 4 characters");
        assert_eq!(schema.validate(&values(&[("cvv", "1 3")]))["cvv"], "No white spaces");
        assert!(schema.validate(&values(&[("cvv", "1234")])).is_empty());
    }

    #[test]
    fn optional_empty_field_skips_rules() {
        let schema = Schema::new().field("note", vec![Rule::MinLen(3, "too short")]);
        assert!(schema.validate(&values(&[("note", "")])).is_empty());
        assert!(!schema.validate(&values(&[("note", "ab")])).is_empty());
    }

    fn is_email(value: &str) -> bool {
        Regex::new(EMAIL_PATTERN).unwrap().is_match(value)
    }

    #[test]
    fn email_syntax() {
        assert!(is_email("jane@x.com"));
        assert!(is_email("first.last@sub.example.org"));
        assert!(!is_email("jane"));
        assert!(!is_email("jane@"));
        assert!(!is_email("@x.com"));
        assert!(!is_email("jane@x"));
        assert!(!is_email("jane@x..com"));
        assert!(!is_email("ja ne@x.com"));
        assert!(!is_email("a@b@c.com"));
        assert!(!is_email(".jane@x.com"));
        assert!(!is_email("a,b@x.com"));
        assert!(!is_email("<jane>@x.com"));
        assert!(!is_email("jane@x_y.com"));
        assert!(!is_email("ja\"ne@x.com"));
        assert!(!is_email("jane@x.c(m"));
        assert!(!is_email("jane@-x.com"));
        assert!(is_email("o'brien+tag@mail-host.co.uk"));
    }

    #[test]
    fn at_least_rejects_non_numeric() {
        let schema = Schema::new().field("year", vec![Rule::AtLeast(2026, "Card has expired")]);
        assert!(schema.validate(&values(&[("year", "2026")])).is_empty());
        assert_eq!(schema.validate(&values(&[("year", "2025")]))["year"], "Card has expired");
        assert_eq!(schema.validate(&values(&[("year", "abcd")]))["year"], "Card has expired");
    }

    #[test]
    fn checked_requires_true() {
        let schema = Schema::new().field("agree", vec![Rule::Checked("must agree")]);
        assert!(schema.validate(&values(&[("agree", "true")])).is_empty());
        assert!(!schema.validate(&values(&[("agree", "false")])).is_empty());
    }

    #[test]
    fn errors_hidden_until_touched() {
        let errors = cvv_schema().validate(&values(&[("cvv", "")]));
        let mut touched = Touched::default();
        assert_eq!(visible_error(&errors, &touched, "cvv"), None);
        touched.touch("cvv");
        assert_eq!(visible_error(&errors, &touched, "cvv"), Some("Required"));
    }
}
