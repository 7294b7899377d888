//! Read-only summary shown on the review stage.

use serde::Serialize;
use serde_json::{Map, Value};

use super::stage::{choice_label, Accommodation, BudgetRange, Gender, Urgency};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewEntry {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSection {
    pub title: String,
    pub entries: Vec<ReviewEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntakeReview {
    pub sections: Vec<ReviewSection>,
}

impl IntakeReview {
    pub fn from_data(data: &Map<String, Value>) -> Self {
        let text = |field: &str| display(data.get(field));
        let or = |field: &str, placeholder: &str| {
            let value = text(field);
            if value.is_empty() {
                placeholder.to_string()
            } else {
                value
            }
        };

        let medical = ReviewSection::new(
            "Medical Information",
            vec![
                ("Condition", text("condition")),
                ("Treatment", text("treatment")),
                ("Urgency", choice_label::<Urgency>(&text("urgency"))),
            ],
        );
        let personal = ReviewSection::new(
            "Personal Details",
            vec![
                ("Name", text("fullName")),
                ("Email", text("email")),
                ("Phone", text("phone")),
                ("Country", text("country")),
                ("Age", text("age")),
                ("Gender", choice_label::<Gender>(&text("gender"))),
            ],
        );
        let companion = match data.get("travelCompanion") {
            Some(Value::Bool(true)) => "Yes",
            _ => "No",
        };
        let preferences = ReviewSection::new(
            "Preferences",
            vec![
                ("Budget", choice_label::<BudgetRange>(&text("budget"))),
                ("Destination", or("destination", "Any")),
                (
                    "Accommodation",
                    choice_label::<Accommodation>(&or("accommodation", "Standard")),
                ),
                ("Travel companion", companion.to_string()),
            ],
        );

        Self {
            sections: vec![medical, personal, preferences],
        }
    }

    /// Value shown for `label`, searching every section
    pub fn value(&self, label: &str) -> Option<&str> {
        self.sections
            .iter()
            .flat_map(|s| &s.entries)
            .find(|e| e.label == label)
            .map(|e| e.value.as_str())
    }
}

impl ReviewSection {
    fn new(title: &str, entries: Vec<(&str, String)>) -> Self {
        Self {
            title: title.to_string(),
            entries: entries
                .into_iter()
                .map(|(label, value)| ReviewEntry {
                    label: label.to_string(),
                    value,
                })
                .collect(),
        }
    }
}

fn display(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_placeholders_for_missing_preferences() {
        let data = json!({"budget": "5000-10000", "destination": ""});
        let review = IntakeReview::from_data(data.as_object().unwrap());

        assert_eq!(review.value("Destination"), Some("Any"));
        assert_eq!(review.value("Accommodation"), Some("Standard"));
        assert_eq!(review.value("Budget"), Some("$5,000 - $10,000"));
        assert_eq!(review.value("Travel companion"), Some("No"));
    }

    #[test]
    fn test_labels_and_numbers() {
        let data = json!({
            "urgency": "emergency",
            "age": 34,
            "gender": "female",
            "accommodation": "recovery-center",
            "travelCompanion": true
        });
        let review = IntakeReview::from_data(data.as_object().unwrap());

        assert_eq!(review.sections.len(), 3);
        assert_eq!(review.value("Urgency"), Some("Emergency"));
        assert_eq!(review.value("Age"), Some("34"));
        assert_eq!(review.value("Gender"), Some("Female"));
        assert_eq!(review.value("Accommodation"), Some("Recovery Center"));
        assert_eq!(review.value("Travel companion"), Some("Yes"));
    }
}
