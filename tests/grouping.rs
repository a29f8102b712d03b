use anyhow::Result;
use visitframe::testing::*;
use visitframe::*;

#[test]
fn rows_sharing_id_and_date_share_a_terminal_group() -> Result<()> {
    let data = CsvBuilder::new(["id", "date", "code"])
        .row(["1", "2020-01-01", "a"])
        .row(["1", "2020-01-01", "b"])
        .row(["1", "2020-01-02", "a"])
        .load(&DatasetConfig::new())?;

    let tree = data.group_by(&["id", "date"])?;
    assert_group_sizes(&tree, &[2, 1]);
    assert_eq!(tree.depth(), 2);

    let first = tree
        .get(&[Value::from("1"), Value::from("2020-01-01")])
        .and_then(GroupNode::rows)
        .expect("terminal group");
    assert_eq!(first, &[0, 1]);
    Ok(())
}

#[test]
fn typed_ids_group_across_dates() -> Result<()> {
    let data = CsvBuilder::new(["id", "date", "code"])
        .row(["1", "01/01/2020", "A"])
        .row(["1", "02/01/2020", "B"])
        .row(["2", "01/01/2020", "A"])
        .load(
            &DatasetConfig::new()
                .with_type("id", Coercion::Number)
                .with_type("date", Coercion::date()),
        )?;
    assert_eq!(
        data.rows()[1].get("date"),
        Some(&Value::Number(epoch_millis("02/01/2020")))
    );

    let tree = data.group_by(&["id"])?;
    assert_group_sizes(&tree, &[2, 1]);
    let one = tree.get(&[Value::Number(1.0)]).and_then(GroupNode::rows);
    assert_eq!(one, Some(&[0, 1][..]));
    Ok(())
}

#[test]
fn nested_groups_follow_first_seen_order() -> Result<()> {
    let data = sample_visits();
    let tree = data.group_by(&["person_id", "contact_date"])?;

    let people: Vec<&Value> = tree.root().children().expect("internal root").keys().collect();
    assert_eq!(
        people,
        [&Value::Number(2.0), &Value::Number(1.0), &Value::Number(3.0)]
    );
    assert_group_sizes(&tree, &[2, 1, 2, 1, 1, 1, 1]);

    let person_one = tree.get(&[Value::Number(1.0)]).expect("person 1");
    assert_eq!(person_one.len(), 3);
    assert_eq!(person_one.row_count(), 4);
    assert_eq!(person_one.flatten(), [1, 6, 2, 4]);
    assert_eq!(person_one.last_row(), Some(4));
    Ok(())
}

#[test]
fn groups_partition_the_row_store() -> Result<()> {
    let data = sample_visits();
    for columns in [
        vec!["person_id"],
        vec!["gender_code", "product_atc_code"],
        vec!["person_id", "contact_date", "product_atc_code"],
    ] {
        let tree = data.group_by(&columns[..])?;
        assert_eq!(tree.row_count(), data.len(), "{columns:?}");

        let mut seen = tree.flatten();
        seen.sort_unstable();
        assert_eq!(seen, (0..data.len()).collect::<Vec<_>>(), "{columns:?}");
    }
    Ok(())
}

#[test]
fn absent_is_an_ordinary_key() -> Result<()> {
    let data = sample_visits();
    let tree = data.group_by(&["Pulse"])?;
    let missing = tree.get(&[Value::Absent]).and_then(GroupNode::rows);
    assert_eq!(missing, Some(&[3, 7][..]));
    Ok(())
}

#[test]
fn grouping_by_nothing_is_a_single_terminal() -> Result<()> {
    let data = sample_visits();
    let tree = data.group_by::<&str>(&[])?;
    assert!(tree.root().is_terminal());
    assert_group_sizes(&tree, &[SAMPLE_VISITS_LEN]);
    Ok(())
}

#[test]
fn unknown_column_is_an_error() {
    let data = sample_visits();
    let err = data.group_by(&["person_id", "nope"]).unwrap_err();
    assert!(matches!(err, DatasetError::UnknownColumn { ref column } if column == "nope"));
    assert!(err.is_schema_error());
}

#[test]
fn row_lacking_a_grouping_column_is_an_error() {
    let mut data = sample_visits();
    data.row_mut(5).expect("row 5").remove("person_id");
    let err = data.group_by(&["person_id"]).unwrap_err();
    assert!(matches!(
        err,
        DatasetError::ColumnMissingFromRow { ref column, row: 5 } if column == "person_id"
    ));
}
