use anyhow::Result;
use visitframe::testing::*;
use visitframe::*;

const SAMPLE_CONFIG_JSON: &str = r#"{
    "excluded": ["comment", "Traitement_Insulines_dep_201701"],
    "types": {
        "person_id": "number",
        "contact_date": "date",
        "Pulse": "number"
    },
    "encoders": "product_atc_code"
}"#;

#[test]
fn json_config_drives_loading() -> Result<()> {
    let config = DatasetConfig::from_json(SAMPLE_CONFIG_JSON)?;
    let data = Dataset::from_text(SAMPLE_VISITS_CSV, &config)?;

    assert_eq!(
        data.columns().collect::<Vec<_>>(),
        [
            "person_id",
            "contact_date",
            "gender_code",
            "product_atc_code",
            "Pulse"
        ]
    );
    assert_eq!(
        data.encoders().columns().collect::<Vec<_>>(),
        ["product_atc_code"]
    );
    assert_eq!(data.rows()[0].get("gender_code"), Some(&Value::from("F")));
    assert_eq!(
        data.rows()[0].get("contact_date"),
        Some(&Value::Number(epoch_millis("15/01/2020")))
    );
    Ok(())
}

#[test]
fn json_and_builder_configs_load_the_same_data() -> Result<()> {
    let from_json = Dataset::from_text(
        SAMPLE_VISITS_CSV,
        &DatasetConfig::from_json(SAMPLE_CONFIG_JSON)?,
    )?;
    let built = Dataset::from_text(
        SAMPLE_VISITS_CSV,
        &DatasetConfig::new()
            .exclude("comment")
            .exclude("Traitement_Insulines_dep_201701")
            .with_type("person_id", Coercion::Number)
            .with_type("contact_date", Coercion::date())
            .with_type("Pulse", Coercion::Number)
            .encode("product_atc_code"),
    )?;
    for column in built.columns() {
        assert_eq!(
            column_values(&from_json, column),
            column_values(&built, column),
            "{column}"
        );
    }
    Ok(())
}

#[test]
fn strict_mode_from_json() -> Result<()> {
    let config = DatasetConfig::from_json(r#"{"types": {"Pulse": "number"}, "coercion_mode": "strict"}"#)?;
    let err = Dataset::from_text(SAMPLE_VISITS_CSV, &config).unwrap_err();
    assert!(matches!(err, DatasetError::Coercion { line: 7, .. }));
    Ok(())
}

#[test]
fn custom_date_format_tag() -> Result<()> {
    let config = DatasetConfig::from_json(r#"{"types": {"day": "date:%Y%m%d"}}"#)?;
    let data = Dataset::from_text("day\n20200115\n2020-01-15\n", &config)?;
    assert_column_values(
        &data,
        "day",
        &[Value::Number(epoch_millis("15/01/2020")), Value::Absent],
    );
    Ok(())
}

#[test]
fn unknown_type_tag_is_rejected() {
    let err = DatasetConfig::from_json(r#"{"types": {"Pulse": "float"}}"#).unwrap_err();
    assert!(err.to_string().contains("float"));
    assert!(matches!(
        "float".parse::<Coercion>(),
        Err(DatasetError::UnknownTypeTag { ref tag }) if tag == "float"
    ));
}
