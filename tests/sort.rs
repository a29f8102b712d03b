use anyhow::Result;
use std::cmp::Ordering;
use visitframe::testing::*;
use visitframe::sort::compare_rows;
use visitframe::*;

#[test]
fn ascending_numeric_sort() -> Result<()> {
    let mut data = CsvBuilder::new(["id"])
        .row(["3"])
        .row(["1"])
        .row(["2"])
        .load(&DatasetConfig::new().with_type("id", Coercion::Number))?;

    data.sort(&[SortSpec::asc("id")])?;
    assert_column_values(&data, "id", &[1.0, 2.0, 3.0].map(Value::Number));
    Ok(())
}

#[test]
fn sort_is_stable() -> Result<()> {
    let mut data = sample_visits();
    data.sort(&[SortSpec::asc("person_id")])?;
    assert_lines(&data, &[1, 2, 4, 6, 0, 5, 7, 3, 8]);
    Ok(())
}

#[test]
fn later_specs_break_ties() -> Result<()> {
    let mut data = sample_visits();
    data.sort(&[SortSpec::asc("person_id"), SortSpec::asc("contact_date")])?;
    assert_lines(&data, &[2, 1, 6, 4, 0, 5, 7, 3, 8]);
    Ok(())
}

#[test]
fn descending_sort() -> Result<()> {
    let mut data = sample_visits();
    data.sort(&[SortSpec::desc("person_id")])?;
    assert_lines(&data, &[3, 8, 0, 5, 7, 1, 2, 4, 6]);
    Ok(())
}

#[test]
fn order_tags_parse() -> Result<()> {
    let mut data = sample_visits();
    let order: SortOrder = "desc".parse().map_err(anyhow::Error::msg)?;
    data.sort(&[SortSpec::new("person_id", order)])?;
    assert_lines(&data, &[3, 8, 0, 5, 7, 1, 2, 4, 6]);
    assert!("sideways".parse::<SortOrder>().is_err());
    Ok(())
}

#[test]
fn non_numeric_values_keep_their_order_under_asc() -> Result<()> {
    let mut data = sample_visits_raw();
    data.sort(&[SortSpec::asc("product_atc_code")])?;
    assert_lines(&data, &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
    Ok(())
}

#[test]
fn numeric_text_sorts_numerically_under_asc() -> Result<()> {
    let mut data = sample_visits_raw();
    data.sort(&[SortSpec::asc("person_id")])?;
    assert_lines(&data, &[1, 2, 4, 6, 0, 5, 7, 3, 8]);
    Ok(())
}

#[test]
fn blank_cells_sort_after_numbers() -> Result<()> {
    // Pulse is blank on lines 3 and 7.
    let mut data = sample_visits();
    data.sort(&[SortSpec::asc("Pulse")])?;
    assert_lines(&data, &[4, 6, 1, 2, 0, 5, 8, 3, 7]);

    data.sort(&[SortSpec::desc("Pulse")])?;
    assert_lines(&data, &[8, 5, 0, 2, 1, 6, 4, 3, 7]);
    Ok(())
}

#[test]
fn large_number_column_with_blanks_sorts_totally() -> Result<()> {
    let builder = (0..3000).fold(CsvBuilder::new(["id", "Pulse"]), |b, i: usize| {
        let pulse = if i % 4 == 1 { String::new() } else { ((i * 7919) % 997).to_string() };
        b.row([i.to_string(), pulse])
    });
    let mut data = builder.load(&DatasetConfig::new().with_type("Pulse", Coercion::Number))?;

    for order in [SortOrder::Asc, SortOrder::Desc] {
        data.sort(&[SortSpec::new("Pulse", order.clone())])?;
        let pulses: Vec<Option<f64>> = data
            .rows()
            .iter()
            .map(|r| r.get("Pulse").and_then(Value::as_f64))
            .collect();
        let numeric = pulses.iter().take_while(|p| p.is_some()).count();
        assert_eq!(numeric, 2250);
        assert!(pulses[numeric..].iter().all(Option::is_none));
        assert!(pulses[..numeric].windows(2).all(|w| match order {
            SortOrder::Desc => w[0] >= w[1],
            _ => w[0] <= w[1],
        }));
    }
    Ok(())
}

#[test]
fn custom_comparator() -> Result<()> {
    let mut data = sample_visits_raw();
    data.sort(&[SortSpec::by("product_atc_code", |a: &Value, b: &Value| {
        a.as_str().cmp(&b.as_str())
    })])?;
    assert_lines(&data, &[2, 5, 1, 4, 8, 0, 3, 6, 7]);
    Ok(())
}

#[test]
fn grouped_sort_matches_flat_sort_when_every_level_has_a_spec() -> Result<()> {
    let specs = [SortSpec::asc("person_id"), SortSpec::asc("contact_date")];

    let mut grouped = sample_visits();
    grouped.sort_with(
        &specs,
        &SortOptions::new().group_by(["person_id", "contact_date"]),
    )?;
    assert_lines(&grouped, &[2, 1, 6, 4, 0, 5, 7, 3, 8]);

    let mut flat = sample_visits();
    flat.sort(&specs)?;
    assert_eq!(column_values(&grouped, "contact_date"), column_values(&flat, "contact_date"));
    Ok(())
}

#[test]
fn grouped_sort_keeps_first_seen_group_order_without_a_level_spec() -> Result<()> {
    let mut data = sample_visits();
    data.filter(|row| row.get("Pulse").is_some_and(|v| !v.is_absent()));
    data.sort_with(
        &[SortSpec::desc("Pulse")],
        &SortOptions::new().group_by(["person_id"]),
    )?;
    // Person 2 first, then 1, then 3; pulses descending inside each person.
    assert_lines(&data, &[5, 0, 2, 1, 6, 4, 8]);
    Ok(())
}

#[test]
fn grouped_sort_orders_groups_by_their_level_spec() -> Result<()> {
    let mut data = sample_visits();
    data.sort_with(
        &[SortSpec::desc("person_id")],
        &SortOptions::new().group_by(["person_id"]),
    )?;
    assert_lines(&data, &[3, 8, 0, 5, 7, 1, 2, 4, 6]);
    Ok(())
}

#[test]
fn comparator_on_group_keys() -> Result<()> {
    let mut data = sample_visits_raw();
    // Reverse text order puts "M" before "F".
    data.sort_with(
        &[SortSpec::by("gender_code", |a: &Value, b: &Value| {
            b.as_str().cmp(&a.as_str())
        })],
        &SortOptions::new().group_by(["gender_code"]),
    )?;
    assert_lines(&data, &[1, 2, 4, 6, 0, 3, 5, 7, 8]);
    Ok(())
}

#[test]
fn absent_group_key_sorts_after_numeric_keys() -> Result<()> {
    let config = DatasetConfig::new()
        .with_type("id", Coercion::Number)
        .with_type("t", Coercion::Number);
    let load = || {
        CsvBuilder::new(["id", "t"])
            .row(["2", "1"])
            .row(["", "5"])
            .row(["1", "2"])
            .row(["3", "0"])
            .row(["1", "4"])
            .load(&config)
    };

    let mut data = load()?;
    data.sort_with(
        &[SortSpec::asc("id"), SortSpec::asc("t")],
        &SortOptions::new().group_by(["id"]),
    )?;
    assert_lines(&data, &[2, 4, 0, 3, 1]);

    let mut data = load()?;
    data.sort_with(
        &[SortSpec::desc("id"), SortSpec::asc("t")],
        &SortOptions::new().group_by(["id"]),
    )?;
    assert_lines(&data, &[3, 0, 2, 4, 1]);
    Ok(())
}

#[test]
fn unknown_column_leaves_order_untouched() {
    let mut data = sample_visits();
    let err = data
        .sort(&[SortSpec::asc("person_id"), SortSpec::asc("nope")])
        .unwrap_err();
    assert!(matches!(err, DatasetError::UnknownColumn { .. }));
    assert_lines(&data, &[0, 1, 2, 3, 4, 5, 6, 7, 8]);

    let err = data
        .sort_with(
            &[SortSpec::asc("person_id")],
            &SortOptions::new().group_by(["nope"]),
        )
        .unwrap_err();
    assert!(matches!(err, DatasetError::UnknownColumn { .. }));
    assert_lines(&data, &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn compare_rows_is_lexicographic() {
    let data = sample_visits();
    let specs = [SortSpec::asc("person_id"), SortSpec::desc("contact_date")];
    let rows = data.rows();
    assert_eq!(compare_rows(&specs, &rows[1], &rows[2]), Ordering::Less);
    assert_eq!(compare_rows(&specs, &rows[1], &rows[6]), Ordering::Equal);
    assert_eq!(compare_rows(&specs, &rows[0], &rows[1]), Ordering::Greater);
}
