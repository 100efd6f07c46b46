use chrono::NaiveDate;

use divelog::{
    duration::Duration,
    validate::{
        DiveForm, FormField, ValidationError, validate_date, validate_duration_minutes,
        validate_non_empty, validate_site, validate_time,
    },
};

#[test]
fn field_validators_return_client_messages() {
    assert_eq!(
        validate_date("2024-02-30").expect_err("date").to_string(),
        "Please provide a valid dive date."
    );
    assert_eq!(
        validate_date("2024-02-29"),
        Ok(NaiveDate::from_ymd_opt(2024, 2, 29).expect("leap day"))
    );
    assert_eq!(validate_time("25:00"), Err(ValidationError::InvalidTime));
    assert!(validate_time("09:15").is_ok());
    assert_eq!(validate_site("  Vrmac "), Ok("Vrmac".to_string()));
    assert_eq!(validate_site("   "), Err(ValidationError::MissingSite));
    assert_eq!(validate_non_empty(" x "), Ok("x".to_string()));
    assert_eq!(validate_non_empty(""), Err(ValidationError::Empty));
}

#[test]
fn duration_minutes_range() {
    assert_eq!(validate_duration_minutes("45"), Ok(Duration::from_minutes(45)));
    assert_eq!(validate_duration_minutes("180"), Ok(Duration::from_minutes(180)));
    assert_eq!(
        validate_duration_minutes("0"),
        Err(ValidationError::DurationOutOfRange)
    );
    assert_eq!(
        validate_duration_minutes("181"),
        Err(ValidationError::DurationOutOfRange)
    );
    assert_eq!(
        validate_duration_minutes("-3"),
        Err(ValidationError::DurationOutOfRange)
    );
    assert_eq!(
        validate_duration_minutes("forty"),
        Err(ValidationError::InvalidDuration)
    );
}

#[test]
fn dive_form_builds_identified_dive() {
    let dive = DiveForm {
        date: "2024-02-01".to_string(),
        time_in: "09:15".to_string(),
        site: " Ada Ciganlija ".to_string(),
        duration_min: "50".to_string(),
        geo: "  ".to_string(),
        deco_dive: "true".to_string(),
    }
    .build()
    .expect("valid form");

    assert_eq!(dive.id(), "20240201T0915");
    assert_eq!(dive.position(), None);
    let record = dive.record();
    assert_eq!(record.date_time, "2024-02-01T09:15");
    assert_eq!(record.site, "Ada Ciganlija");
    assert_eq!(record.duration, Duration::from_minutes(50));
    assert_eq!(record.geo, "");
    assert!(record.deco_dive);
}

#[test]
fn dive_form_collects_every_error() {
    let errors = DiveForm {
        date: "tomorrow".to_string(),
        time_in: "09:15".to_string(),
        site: String::new(),
        duration_min: "500".to_string(),
        ..DiveForm::default()
    }
    .build()
    .expect_err("invalid form");

    assert_eq!(errors.len(), 3);
    assert_eq!(errors[&FormField::Date], ValidationError::InvalidDate);
    assert_eq!(errors[&FormField::Site], ValidationError::MissingSite);
    assert_eq!(
        errors[&FormField::Duration],
        ValidationError::DurationOutOfRange
    );
    assert!(!errors.contains_key(&FormField::TimeIn));
}
