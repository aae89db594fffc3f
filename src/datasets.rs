//! Reading and writing interaction tables as CSV.
//!
//! Input files may use any column names; [`ColumnNames`] maps them onto the
//! user, item, rating and timestamp fields. Written files always use the
//! canonical `user_id,item_id,rating,timestamp` header.
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

use csv;
use failure;

use data::{Interaction, Interactions, LabeledInteraction, Prediction};
use encoding::{LabelEncoder, RawId, RawInteraction};
use {EvaluationError, PredictionError, Rating};

/// Names of the columns holding each interaction field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    user: String,
    item: String,
    rating: String,
    timestamp: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        ColumnNames {
            user: "user_id".to_owned(),
            item: "item_id".to_owned(),
            rating: "rating".to_owned(),
            timestamp: "timestamp".to_owned(),
        }
    }
}

impl ColumnNames {
    /// Set the user column.
    pub fn user(mut self, name: &str) -> Self {
        self.user = name.to_owned();
        self
    }

    /// Set the item column.
    pub fn item(mut self, name: &str) -> Self {
        self.item = name.to_owned();
        self
    }

    /// Set the rating (or score) column.
    pub fn rating(mut self, name: &str) -> Self {
        self.rating = name.to_owned();
        self
    }

    /// Set the timestamp column.
    pub fn timestamp(mut self, name: &str) -> Self {
        self.timestamp = name.to_owned();
        self
    }
}

struct ColumnIndices {
    user: usize,
    item: usize,
    rating: usize,
    timestamp: Option<usize>,
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, EvaluationError> {
    headers
        .iter()
        .position(|x| x.trim() == name)
        .ok_or_else(|| EvaluationError::SchemaError(format!("missing column '{}'", name)))
}

impl ColumnIndices {
    fn new(
        headers: &csv::StringRecord,
        columns: &ColumnNames,
        with_timestamp: bool,
    ) -> Result<Self, EvaluationError> {
        Ok(ColumnIndices {
            user: column_index(headers, &columns.user)?,
            item: column_index(headers, &columns.item)?,
            rating: column_index(headers, &columns.rating)?,
            timestamp: if with_timestamp {
                Some(column_index(headers, &columns.timestamp)?)
            } else {
                None
            },
        })
    }
}

fn field<T: FromStr>(
    record: &csv::StringRecord,
    idx: usize,
    line: usize,
) -> Result<T, EvaluationError> {
    let value = record.get(idx).unwrap_or("").trim();

    value.parse().map_err(|_| {
        EvaluationError::SchemaError(format!(
            "cannot parse '{}' in column {} on line {}",
            value, idx, line
        ))
    })
}

fn read_records<R, T, F>(
    reader: R,
    columns: &ColumnNames,
    with_timestamp: bool,
    parse: F,
) -> Result<Vec<T>, failure::Error>
where
    R: Read,
    F: Fn(&csv::StringRecord, &ColumnIndices, usize) -> Result<T, EvaluationError>,
{
    let mut reader = csv::Reader::from_reader(reader);
    let indices = ColumnIndices::new(reader.headers()?, columns, with_timestamp)?;

    let mut rows = Vec::new();

    for (idx, record) in reader.records().enumerate() {
        // Header is line 1.
        rows.push(parse(&record?, &indices, idx + 2)?);
    }

    debug!("Read {} rows", rows.len());

    Ok(rows)
}

/// Read interactions keyed by external identifiers.
pub fn read_raw_interactions<R: Read>(
    reader: R,
    columns: &ColumnNames,
) -> Result<Vec<RawInteraction>, failure::Error> {
    read_records(reader, columns, true, |record, indices, line| {
        Ok(RawInteraction {
            user: field(record, indices.user, line)?,
            item: field(record, indices.item, line)?,
            rating: field(record, indices.rating, line)?,
            timestamp: field(record, indices.timestamp.unwrap_or(0), line)?,
        })
    })
}

/// Read interactions whose user and item ids are already dense integers.
pub fn read_interactions<R: Read>(
    reader: R,
    columns: &ColumnNames,
) -> Result<Interactions, failure::Error> {
    let rows = read_records(reader, columns, true, |record, indices, line| {
        Ok(Interaction::new(
            field(record, indices.user, line)?,
            field(record, indices.item, line)?,
            field(record, indices.rating, line)?,
            field(record, indices.timestamp.unwrap_or(0), line)?,
        ))
    })?;

    Ok(Interactions::from(rows))
}

/// Read model scores; the score is taken from the rating column and must
/// be finite.
pub fn read_predictions<R: Read>(
    reader: R,
    columns: &ColumnNames,
) -> Result<Vec<Prediction>, failure::Error> {
    read_records(reader, columns, false, |record, indices, line| {
        let score: Rating = field(record, indices.rating, line)?;

        if !score.is_finite() {
            return Err(PredictionError::InvalidPredictionValue.into());
        }

        Ok(Prediction::new(
            field(record, indices.user, line)?,
            field(record, indices.item, line)?,
            score,
        ))
    })
}

/// Read raw interactions from `path`.
pub fn load_raw_interactions<P: AsRef<Path>>(
    path: P,
    columns: &ColumnNames,
) -> Result<Vec<RawInteraction>, failure::Error> {
    read_raw_interactions(File::open(path)?, columns)
}

/// Read dense-id interactions from `path`.
pub fn load_interactions<P: AsRef<Path>>(
    path: P,
    columns: &ColumnNames,
) -> Result<Interactions, failure::Error> {
    read_interactions(File::open(path)?, columns)
}

/// Read predictions from `path`.
pub fn load_predictions<P: AsRef<Path>>(
    path: P,
    columns: &ColumnNames,
) -> Result<Vec<Prediction>, failure::Error> {
    read_predictions(File::open(path)?, columns)
}

/// Write interactions with the canonical header.
pub fn write_interactions<W: Write>(
    writer: W,
    interactions: &Interactions,
) -> Result<(), failure::Error> {
    let mut writer = csv::Writer::from_writer(writer);

    for interaction in interactions.data() {
        writer.serialize(interaction)?;
    }

    writer.flush()?;

    Ok(())
}

/// Write binarized feedback as `user_id,item_id,label`.
pub fn write_labeled<W: Write>(
    writer: W,
    samples: &[LabeledInteraction],
) -> Result<(), failure::Error> {
    let mut writer = csv::Writer::from_writer(writer);

    for sample in samples {
        writer.serialize(sample)?;
    }

    writer.flush()?;

    Ok(())
}

/// Write the classes of a label encoder as `id,raw_id` rows, mapping
/// dense ids back to external identifiers.
pub fn write_classes<W: Write>(
    writer: W,
    encoder: &LabelEncoder<RawId>,
) -> Result<(), failure::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(&["id", "raw_id"])?;

    for (idx, class) in encoder.classes().iter().enumerate() {
        writer.write_record(&[idx.to_string(), class.to_string()])?;
    }

    writer.flush()?;

    Ok(())
}
