//! Per-stage field validation.
//!
//! Each validator checks the raw input for one stage and returns the
//! normalized values to merge, or the field errors found. Only the stage's own
//! fields are looked at; anything else in the input is dropped.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::stage::{BudgetRange, Choice, Gender, IntakeStage, Urgency};
use crate::error::FieldErrors;

pub const REQUIRED: &str = "This field is required";
pub const INVALID_EMAIL: &str = "Invalid email address";
pub const INVALID_OPTION: &str = "Please select a valid option";
pub const AGE_RANGE: &str = "Age must be between 1 and 120";
pub const AGE_NOT_NUMBER: &str = "Age must be a whole number";
pub const NOT_TEXT: &str = "Must be text";
pub const NOT_BOOLEAN: &str = "Must be true or false";

pub const MIN_AGE: i64 = 1;
pub const MAX_AGE: i64 = 120;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("email pattern is valid")
});

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Validate `input` for `stage`, returning the values to merge
pub fn validate_stage(
    stage: IntakeStage,
    input: &Map<String, Value>,
) -> Result<Map<String, Value>, FieldErrors> {
    let mut form = StageForm::new(input);
    match stage {
        IntakeStage::Medical => {
            form.required_text("condition");
            form.required_text("treatment");
            form.required_choice::<Urgency>("urgency");
        }
        IntakeStage::Personal => {
            form.required_text("fullName");
            form.email("email");
            form.required_text("phone");
            form.required_text("country");
            form.age("age");
            form.required_choice::<Gender>("gender");
        }
        IntakeStage::Preferences => {
            form.required_choice::<BudgetRange>("budget");
            form.optional_text("destination");
            form.optional_text("accommodation");
            form.optional_flag("travelCompanion");
        }
        IntakeStage::Review => {}
    }
    form.finish()
}

/// Accumulates normalized values and errors while a stage is checked
struct StageForm<'a> {
    input: &'a Map<String, Value>,
    values: Map<String, Value>,
    errors: FieldErrors,
}

impl<'a> StageForm<'a> {
    fn new(input: &'a Map<String, Value>) -> Self {
        Self {
            input,
            values: Map::new(),
            errors: FieldErrors::new(),
        }
    }

    fn finish(self) -> Result<Map<String, Value>, FieldErrors> {
        if self.errors.is_empty() {
            Ok(self.values)
        } else {
            Err(self.errors)
        }
    }

    /// Input value with null treated as absent
    fn raw(&self, field: &str) -> Option<&'a Value> {
        self.input.get(field).filter(|v| !v.is_null())
    }

    /// Trimmed text, or an error recorded for a non-string value
    fn text(&mut self, field: &str) -> Option<String> {
        match self.raw(field)? {
            Value::String(s) => Some(s.trim().to_string()),
            _ => {
                self.errors.add(field, NOT_TEXT);
                None
            }
        }
    }

    fn required_text(&mut self, field: &str) -> Option<String> {
        let present = self.raw(field).is_some();
        match self.text(field) {
            Some(text) if !text.is_empty() => {
                self.values.insert(field.to_string(), Value::String(text.clone()));
                Some(text)
            }
            Some(_) => {
                self.errors.add(field, REQUIRED);
                None
            }
            None => {
                if !present {
                    self.errors.add(field, REQUIRED);
                }
                None
            }
        }
    }

    /// Free-form field: strings are trimmed, scalars kept as text, anything else as given
    fn optional_text(&mut self, field: &str) {
        let value = match self.raw(field) {
            None => return,
            Some(Value::String(s)) => Value::String(s.trim().to_string()),
            Some(Value::Number(n)) => Value::String(n.to_string()),
            Some(Value::Bool(b)) => Value::String(b.to_string()),
            Some(other) => other.clone(),
        };
        self.values.insert(field.to_string(), value);
    }

    fn required_choice<C: Choice>(&mut self, field: &str) {
        if let Some(value) = self.required_text(field) {
            if C::parse(&value).is_none() {
                self.values.remove(field);
                self.errors.add(field, INVALID_OPTION);
            }
        }
    }

    fn email(&mut self, field: &str) {
        if let Some(value) = self.required_text(field) {
            if !is_valid_email(&value) {
                self.values.remove(field);
                self.errors.add(field, INVALID_EMAIL);
            }
        }
    }

    fn age(&mut self, field: &str) {
        let Some(raw) = self.raw(field) else {
            self.errors.add(field, REQUIRED);
            return;
        };
        let age = match raw {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) if s.trim().is_empty() => {
                self.errors.add(field, REQUIRED);
                return;
            }
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        match age {
            Some(age) if (MIN_AGE..=MAX_AGE).contains(&age) => {
                self.values.insert(field.to_string(), Value::from(age));
            }
            Some(_) => self.errors.add(field, AGE_RANGE),
            None => self.errors.add(field, AGE_NOT_NUMBER),
        }
    }

    fn optional_flag(&mut self, field: &str) {
        let flag = match self.raw(field) {
            None => return,
            Some(Value::Bool(b)) => Some(*b),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" => Some(true),
                "false" | "off" | "no" | "" => Some(false),
                _ => None,
            },
            Some(_) => None,
        };
        match flag {
            Some(flag) => {
                self.values.insert(field.to_string(), Value::Bool(flag));
            }
            None => self.errors.add(field, NOT_BOOLEAN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test input must be an object"),
        }
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("jane@x.com"));
        assert!(is_valid_email("Jane.Doe+trip@Clinic.CO.uk"));
        assert!(!is_valid_email("jane@x"));
        assert!(!is_valid_email("jane x@x.com"));
        assert!(!is_valid_email("@x.com"));
    }

    #[test]
    fn test_medical_requires_all_fields() {
        let errors = validate_stage(IntakeStage::Medical, &Map::new()).unwrap_err();
        assert_eq!(errors.get("condition"), Some(REQUIRED));
        assert_eq!(errors.get("treatment"), Some(REQUIRED));
        assert_eq!(errors.get("urgency"), Some(REQUIRED));
    }

    #[test]
    fn test_whitespace_only_text_is_empty() {
        let errors = validate_stage(
            IntakeStage::Medical,
            &input(json!({"condition": "   ", "treatment": "knee", "urgency": "low"})),
        )
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("condition"), Some(REQUIRED));
    }

    #[test]
    fn test_unknown_urgency_rejected() {
        let errors = validate_stage(
            IntakeStage::Medical,
            &input(json!({"condition": "a", "treatment": "b", "urgency": "whenever"})),
        )
        .unwrap_err();
        assert_eq!(errors.get("urgency"), Some(INVALID_OPTION));
    }

    #[test]
    fn test_personal_normalizes_age() {
        let values = validate_stage(
            IntakeStage::Personal,
            &input(json!({
                "fullName": " Jane Doe ",
                "email": "jane@x.com",
                "phone": "+1234567890",
                "country": "Kenya",
                "age": "34",
                "gender": "female",
                "notes": "ignored"
            })),
        )
        .unwrap();
        assert_eq!(values.get("age"), Some(&json!(34)));
        assert_eq!(values.get("fullName"), Some(&json!("Jane Doe")));
        assert!(!values.contains_key("notes"));
    }

    #[test]
    fn test_age_bounds() {
        let base = json!({
            "fullName": "J", "email": "j@x.com", "phone": "1", "country": "K", "gender": "other"
        });
        for (age, expected) in [
            (json!(0), Some(AGE_RANGE)),
            (json!(121), Some(AGE_RANGE)),
            (json!(34.5), Some(AGE_NOT_NUMBER)),
            (json!("abc"), Some(AGE_NOT_NUMBER)),
            (json!(""), Some(REQUIRED)),
            (json!(1), None),
            (json!(120), None),
            (json!(40.0), None),
        ] {
            let mut fields = input(base.clone());
            fields.insert("age".to_string(), age.clone());
            let result = validate_stage(IntakeStage::Personal, &fields);
            match expected {
                Some(message) => {
                    assert_eq!(result.unwrap_err().get("age"), Some(message), "age {age}")
                }
                None => assert!(result.is_ok(), "age {age}"),
            }
        }
    }

    #[test]
    fn test_invalid_email_message() {
        let errors = validate_stage(
            IntakeStage::Personal,
            &input(json!({
                "fullName": "Jane", "email": "not-an-email", "phone": "1",
                "country": "K", "age": 30, "gender": "female"
            })),
        )
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("email"), Some(INVALID_EMAIL));
    }

    #[test]
    fn test_preferences_optional_fields() {
        let values =
            validate_stage(IntakeStage::Preferences, &input(json!({"budget": "10000-20000"})))
                .unwrap();
        assert_eq!(values.len(), 1);

        let values = validate_stage(
            IntakeStage::Preferences,
            &input(json!({
                "budget": "over-50000",
                "destination": "Istanbul",
                "accommodation": "beach villa",
                "travelCompanion": "on"
            })),
        )
        .unwrap();
        assert_eq!(values.get("accommodation"), Some(&json!("beach villa")));
        assert_eq!(values.get("travelCompanion"), Some(&json!(true)));
    }

    #[test]
    fn test_travel_companion_must_be_boolean() {
        let errors = validate_stage(
            IntakeStage::Preferences,
            &input(json!({"budget": "under-5000", "travelCompanion": 3})),
        )
        .unwrap_err();
        assert_eq!(errors.get("travelCompanion"), Some(NOT_BOOLEAN));
    }

    #[test]
    fn test_non_text_value_rejected() {
        let errors = validate_stage(
            IntakeStage::Medical,
            &input(json!({"condition": 42, "treatment": "b", "urgency": "low"})),
        )
        .unwrap_err();
        assert_eq!(errors.get("condition"), Some(NOT_TEXT));
    }

    #[test]
    fn test_free_form_preferences_accept_non_text() {
        let values = validate_stage(
            IntakeStage::Preferences,
            &input(json!({"budget": "under-5000", "destination": 7, "accommodation": true})),
        )
        .unwrap();
        assert_eq!(values.get("destination"), Some(&json!("7")));
        assert_eq!(values.get("accommodation"), Some(&json!("true")));
    }

    #[test]
    fn test_review_accepts_anything() {
        let values = validate_stage(IntakeStage::Review, &input(json!({"x": 1}))).unwrap();
        assert!(values.is_empty());
    }
}
