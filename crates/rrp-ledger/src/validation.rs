use rrp_types::{
    RatingSubmission, Weekday, WeeklyHours, MAX_ADDRESS_LEN, MAX_DESCRIPTION_LEN, MAX_HOURS_LEN,
    MAX_NAME_LEN, MAX_RATING, MIN_RATING,
};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// Validate a raw rating submission and convert it to its typed form.
///
/// Rules are checked in a fixed order and the first violation wins:
/// `Name`, `Description`, `Address`, `Hours` shape, each day of `Hours`,
/// then `Rating`. Lengths count characters, not bytes.
pub fn validate_submission(payload: &Value) -> Result<RatingSubmission, ValidationError> {
    let fields = payload
        .as_object()
        .ok_or_else(|| ValidationError::new("Submission must be a JSON object"))?;

    let name = validate_name(fields.get("Name"))?;
    let description = bounded_text(fields, "Description", MAX_DESCRIPTION_LEN)?;
    let address = bounded_text(fields, "Address", MAX_ADDRESS_LEN)?;

    let hours = fields
        .get("Hours")
        .and_then(Value::as_object)
        .ok_or_else(|| ValidationError::new("Hours must be a valid object"))?;
    let hours = validate_hours(hours)?;

    let rating = validate_rating(fields.get("Rating"))?;

    Ok(RatingSubmission {
        name,
        description,
        address,
        hours,
        rating,
    })
}

/// Check a restaurant name on its own, as used by lookups.
pub fn validate_name(name: Option<&Value>) -> Result<String, ValidationError> {
    match name.and_then(Value::as_str) {
        Some(name) if !name.is_empty() && name.chars().count() <= MAX_NAME_LEN => {
            Ok(name.to_string())
        }
        _ => Err(ValidationError::new(format!(
            "Name must be text and at most {MAX_NAME_LEN} characters"
        ))),
    }
}

fn bounded_text(
    fields: &Map<String, Value>,
    field: &str,
    max_len: usize,
) -> Result<String, ValidationError> {
    match fields.get(field).and_then(Value::as_str) {
        Some(text) if text.chars().count() <= max_len => Ok(text.to_string()),
        _ => Err(ValidationError::new(format!(
            "{field} must be text and at most {max_len} characters"
        ))),
    }
}

fn validate_hours(hours: &Map<String, Value>) -> Result<WeeklyHours, ValidationError> {
    for day in Weekday::ALL {
        if !hours.contains_key(day.as_str()) {
            return Err(ValidationError::new(format!(
                "Hours must include day: {day}"
            )));
        }
    }

    let mut weekly = WeeklyHours::default();
    for (key, value) in hours {
        let day = key.parse::<Weekday>().map_err(|_| {
            ValidationError::new(format!("Hours includes invalid attribute {key}"))
        })?;
        match value.as_str() {
            Some(text) if text.chars().count() <= MAX_HOURS_LEN => weekly.set(day, text),
            _ => {
                return Err(ValidationError::new(format!(
                    "Hours for {day} must be text and at most {MAX_HOURS_LEN} characters"
                )))
            }
        }
    }
    Ok(weekly)
}

/// Numbers and numeric strings are accepted; the value must be finite and
/// within `[MIN_RATING, MAX_RATING]`.
fn validate_rating(rating: Option<&Value>) -> Result<f64, ValidationError> {
    let value = match rating {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
    .ok_or_else(|| ValidationError::new("Rating must be a number"))?;

    if !(MIN_RATING..=MAX_RATING).contains(&value) {
        return Err(ValidationError::new(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING} inclusive"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn all_days() -> Value {
        json!({
            "Sunday": "closed",
            "Monday": "9-5",
            "Tuesday": "9-5",
            "Wednesday": "9-5",
            "Thursday": "9-5",
            "Friday": "9-9",
            "Saturday": "10-9",
        })
    }

    fn payload() -> Value {
        json!({
            "Name": "Cafe",
            "Description": "d",
            "Address": "a",
            "Hours": all_days(),
            "Rating": 4,
        })
    }

    fn message(payload: &Value) -> String {
        validate_submission(payload).unwrap_err().message
    }

    #[test]
    fn accepts_valid_submission() {
        let submission = validate_submission(&payload()).unwrap();
        assert_eq!(submission.name, "Cafe");
        assert_eq!(submission.rating, 4.0);
        assert_eq!(submission.hours.get(Weekday::Sunday), "closed");
        assert_eq!(submission.hours.get(Weekday::Saturday), "10-9");
    }

    #[test]
    fn rejects_non_object() {
        assert_eq!(message(&json!([1, 2])), "Submission must be a JSON object");
    }

    // -----------------------------------------------------------------------
    // Text fields
    // -----------------------------------------------------------------------

    #[test]
    fn name_must_be_text() {
        let mut p = payload();
        p["Name"] = json!(42);
        assert_eq!(message(&p), "Name must be text and at most 50 characters");
    }

    #[test]
    fn name_length_limit() {
        let mut p = payload();
        p["Name"] = json!("n".repeat(50));
        assert!(validate_submission(&p).is_ok());
        p["Name"] = json!("n".repeat(51));
        assert_eq!(message(&p), "Name must be text and at most 50 characters");
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut p = payload();
        p["Name"] = json!("");
        assert!(message(&p).starts_with("Name"));
    }

    #[test]
    fn description_checks_its_own_length() {
        let mut p = payload();
        p["Description"] = json!("d".repeat(250));
        assert!(validate_submission(&p).is_ok());
        p["Description"] = json!("d".repeat(251));
        assert_eq!(
            message(&p),
            "Description must be text and at most 250 characters"
        );
    }

    #[test]
    fn address_checks_its_own_length() {
        let mut p = payload();
        p["Address"] = json!("a".repeat(150));
        assert!(validate_submission(&p).is_ok());
        p["Address"] = json!("a".repeat(151));
        assert_eq!(message(&p), "Address must be text and at most 150 characters");
    }

    #[test]
    fn missing_address() {
        let mut p = payload();
        p.as_object_mut().unwrap().remove("Address");
        assert_eq!(message(&p), "Address must be text and at most 150 characters");
    }

    #[test]
    fn lengths_count_characters() {
        let mut p = payload();
        p["Name"] = json!("é".repeat(50));
        assert!(validate_submission(&p).is_ok());
    }

    #[test]
    fn first_violation_wins() {
        let mut p = payload();
        p["Name"] = json!(null);
        p["Rating"] = json!(9);
        assert!(message(&p).starts_with("Name"));
    }

    // -----------------------------------------------------------------------
    // Hours
    // -----------------------------------------------------------------------

    #[test]
    fn hours_must_be_object() {
        let mut p = payload();
        p["Hours"] = json!("9-5");
        assert_eq!(message(&p), "Hours must be a valid object");
    }

    #[test]
    fn hours_missing_day_names_it() {
        let mut p = payload();
        p["Hours"].as_object_mut().unwrap().remove("Wednesday");
        assert_eq!(message(&p), "Hours must include day: Wednesday");
    }

    #[test]
    fn hours_extra_key_names_it() {
        let mut p = payload();
        p["Hours"]["Funday"] = json!("all day");
        assert_eq!(message(&p), "Hours includes invalid attribute Funday");
    }

    #[test]
    fn hours_value_must_be_short_text() {
        let mut p = payload();
        p["Hours"]["Monday"] = json!(9);
        assert_eq!(
            message(&p),
            "Hours for Monday must be text and at most 50 characters"
        );
        p["Hours"]["Monday"] = json!("x".repeat(51));
        assert_eq!(
            message(&p),
            "Hours for Monday must be text and at most 50 characters"
        );
    }

    // -----------------------------------------------------------------------
    // Rating
    // -----------------------------------------------------------------------

    #[test]
    fn rating_bounds_are_inclusive() {
        for rating in [json!(1), json!(5), json!(1.0), json!(5.0), json!(3.5)] {
            let mut p = payload();
            p["Rating"] = rating.clone();
            assert!(validate_submission(&p).is_ok(), "{rating}");
        }
    }

    #[test]
    fn rating_out_of_range() {
        for rating in [json!(0.99), json!(5.01), json!(0), json!(-3)] {
            let mut p = payload();
            p["Rating"] = rating;
            assert_eq!(message(&p), "Rating must be between 1 and 5 inclusive");
        }
    }

    #[test]
    fn rating_must_be_number() {
        for rating in [json!("four"), json!(null), json!(true), json!([4])] {
            let mut p = payload();
            p["Rating"] = rating;
            assert_eq!(message(&p), "Rating must be a number");
        }
        let mut p = payload();
        p.as_object_mut().unwrap().remove("Rating");
        assert_eq!(message(&p), "Rating must be a number");
    }

    #[test]
    fn numeric_string_rating_is_accepted() {
        let mut p = payload();
        p["Rating"] = json!(" 4.5 ");
        assert_eq!(validate_submission(&p).unwrap().rating, 4.5);
    }

    #[test]
    fn validate_name_alone() {
        assert_eq!(validate_name(Some(&json!("Cafe"))).unwrap(), "Cafe");
        assert!(validate_name(None).is_err());
    }
}
