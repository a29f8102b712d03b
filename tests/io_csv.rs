use anyhow::Result;
use visitframe::testing::*;
use visitframe::*;

#[test]
fn written_dataset_reads_back() -> Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.file_path("out/visits.csv");

    let mut data = sample_visits();
    data.decode::<&str>(&[]);
    data.sort(&[SortSpec::asc("person_id")])?;
    let written = write_dataset(&path, &data)?;
    assert_eq!(written, SAMPLE_VISITS_LEN);

    let text = read_output_text(&path)?;
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("person_id,contact_date,gender_code,product_atc_code,Pulse,Traitement_Insulines_dep_201701")
    );
    let first = format!("1,{},M,C07AB02,72,1", epoch_millis("10/01/2020"));
    assert_eq!(lines.next(), Some(first.as_str()));

    let config = DatasetConfig::new()
        .with_type("person_id", Coercion::Number)
        .with_type("contact_date", Coercion::Number)
        .with_type("Pulse", Coercion::Number);
    let reread = read_dataset(&path, &config)?;
    assert_eq!(reread.len(), data.len());
    for column in ["person_id", "contact_date", "Pulse"] {
        assert_eq!(column_values(&reread, column), column_values(&data, column), "{column}");
    }
    Ok(())
}

#[test]
fn encoded_columns_are_written_as_codes() -> Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.file_path("codes.csv");
    let data = sample_visits();
    write_dataset(&path, &data)?;

    let text = read_output_text(&path)?;
    let atc: Vec<&str> = text
        .lines()
        .skip(1)
        .map(|line| line.split(',').nth(3).unwrap_or_default())
        .collect();
    assert_eq!(atc, ["0", "1", "2", "0", "1", "2", "0", "0", "1"]);
    Ok(())
}

#[test]
fn absent_cells_are_written_empty() -> Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.file_path("absent.csv");
    let data = CsvBuilder::new(["a", "b"])
        .row(["x", ""])
        .load(&DatasetConfig::new())?;
    write_dataset(&path, &data)?;
    assert_eq!(read_output_text(&path)?, "a,b\nx,\n");
    Ok(())
}

#[cfg(feature = "compression-gzip")]
#[test]
fn gz_output_is_compressed() -> Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.file_path("visits.csv.gz");
    let data = sample_visits();
    write_dataset(&path, &data)?;

    let bytes = std::fs::read(&path)?;
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);

    let reread = read_dataset(&path, &DatasetConfig::new())?;
    assert_eq!(reread.len(), SAMPLE_VISITS_LEN);
    Ok(())
}

#[test]
fn load_errors_keep_their_type_behind_context() -> Result<()> {
    let file = mock_csv_file("\n\n")?;
    let err = read_dataset(file.path(), &DatasetConfig::new()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DatasetError>(),
        Some(DatasetError::MissingHeader)
    ));
    assert!(format!("{err:#}").contains(&file.path().display().to_string()));
    Ok(())
}
