//! A small visit-level dataset for tests and examples.
//!
//! Three people with hypertension follow-up visits. Rows are deliberately out
//! of order, two visits share a date, a pulse reading is missing and another is
//! malformed, and a blank line sits in the middle of the file.
//!
//! | line | person | date       | atc     | pulse |
//! |------|--------|------------|---------|-------|
//! | 0    | 2      | 15/01/2020 | C09AA05 | 80    |
//! | 1    | 1      | 10/01/2020 | C07AB02 | 72    |
//! | 2    | 1      | 03/01/2020 | A10BA02 | 75    |
//! | 3    | 3      | 05/02/2020 | C09AA05 |       |
//! | 4    | 1      | 24/01/2020 | C07AB02 | 70    |
//! | 5    | 2      | 15/01/2020 | A10BA02 | 82    |
//! | 6    | 1      | 10/01/2020 | C09AA05 | 71    |
//! | 7    | 2      | 29/01/2020 | C09AA05 | n/a   |
//! | 8    | 3      | 12/02/2020 | C07AB02 | 90    |

use crate::coerce::Coercion;
use crate::config::DatasetConfig;
use crate::dataset::Dataset;
use crate::value::Value;

/// Raw CSV text of the sample visits.
pub const SAMPLE_VISITS_CSV: &str = "\
person_id,contact_date,gender_code,product_atc_code,Pulse,Traitement_Insulines_dep_201701,comment
2,15/01/2020,F,C09AA05,80,NON,
1,10/01/2020,M,C07AB02,72,OUI,first visit
1,03/01/2020,M,A10BA02,75,OUI,
3,05/02/2020,F,C09AA05,,NON,
1,24/01/2020,M,C07AB02,70,OUI,
2,15/01/2020,F,A10BA02,82,NON,
1,10/01/2020,M,C09AA05,71,OUI,
2,29/01/2020,F,C09AA05,n/a,NON,

,,,,,,
3,12/02/2020,F,C07AB02,90,NON,
";

/// Number of data rows in [`SAMPLE_VISITS_CSV`].
pub const SAMPLE_VISITS_LEN: usize = 9;

/// Maps `OUI` to 1 and anything else to 0.
#[must_use]
pub fn treatment_flag(raw: &str) -> Value {
    Value::Number(if raw == "OUI" { 1.0 } else { 0.0 })
}

/// Configuration used with the sample: typed ids, pulses and dates, the
/// treatment flag as a custom coercion, two encoded columns, and the free
/// text comment excluded.
///
/// # Example
///
/// ```
/// use visitframe::testing::{sample_config, SAMPLE_VISITS_CSV};
/// use visitframe::Dataset;
///
/// let data = Dataset::from_text(SAMPLE_VISITS_CSV, &sample_config()).unwrap();
/// assert!(data.encoder("product_atc_code").is_some());
/// ```
#[must_use]
pub fn sample_config() -> DatasetConfig {
    DatasetConfig::new()
        .exclude("comment")
        .with_type("person_id", Coercion::Number)
        .with_type("contact_date", Coercion::date())
        .with_type("Pulse", Coercion::Number)
        .with_custom("Traitement_Insulines_dep_201701", treatment_flag)
        .encode("gender_code")
        .encode("product_atc_code")
}

/// The sample loaded with [`sample_config`].
///
/// # Panics
///
/// Never for the built-in sample; loading is lenient.
#[must_use]
pub fn sample_visits() -> Dataset {
    Dataset::from_text(SAMPLE_VISITS_CSV, &sample_config()).expect("sample visits load")
}

/// The sample loaded as plain text, nothing typed, excluded or encoded.
///
/// # Panics
///
/// Never for the built-in sample.
#[must_use]
pub fn sample_visits_raw() -> Dataset {
    Dataset::from_text(SAMPLE_VISITS_CSV, &DatasetConfig::new()).expect("sample visits load")
}

/// UTC epoch milliseconds of a day/month/year date, as the `date` coercion
/// stores it.
///
/// # Panics
///
/// Panics if `date` is not a valid `%d/%m/%Y` date.
#[must_use]
pub fn epoch_millis(date: &str) -> f64 {
    match Coercion::date().try_coerce(date) {
        Some(Value::Number(ms)) => ms,
        other => panic!("not a dd/mm/yyyy date: {date} ({other:?})"),
    }
}
