//! Restaurant master-data standardization.
//!
//! Brand, city and sub-zone come from the client's restaurant master data
//! rather than from the uploaded file. The lookup sits behind
//! [`MasterDataRepository`] so the pipeline carries no connection state.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::{Path, PathBuf};

use aggr_common::{column_strings, gather_column};
use aggr_model::PipelineError;
use aggr_transform::{ENTITY_COLUMN, PERIOD_COLUMN, normalize_entity_id};
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info_span};

pub const MASTER_COLUMNS: [&str; 3] = ["brand", "city", "sub_zone"];

#[derive(Debug, Error)]
pub enum MasterDataError {
    #[error("failed to read master data {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("master data lookup failed for client {client_id}: {message}")]
    Lookup { client_id: i64, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantRecord {
    pub res_id: String,
    pub brand: Option<String>,
    pub city: Option<String>,
    pub sub_zone: Option<String>,
}

impl RestaurantRecord {
    pub fn new(res_id: impl Into<String>) -> Self {
        Self {
            res_id: res_id.into(),
            brand: None,
            city: None,
            sub_zone: None,
        }
    }

    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    #[must_use]
    pub fn with_sub_zone(mut self, sub_zone: impl Into<String>) -> Self {
        self.sub_zone = Some(sub_zone.into());
        self
    }

    fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "brand" => self.brand.clone(),
            "city" => self.city.clone(),
            "sub_zone" => self.sub_zone.clone(),
            _ => None,
        }
    }
}

/// Keyed lookup of a client's restaurants.
pub trait MasterDataRepository {
    fn restaurants(&self, client_id: i64) -> Result<Vec<RestaurantRecord>, MasterDataError>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryMasterData {
    clients: BTreeMap<i64, Vec<RestaurantRecord>>,
}

#[derive(Debug, Deserialize)]
struct MasterDataRow {
    client_id: i64,
    res_id: String,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    sub_zone: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl InMemoryMasterData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, client_id: i64, record: RestaurantRecord) {
        self.clients.entry(client_id).or_default().push(record);
    }

    #[must_use]
    pub fn with_record(mut self, client_id: i64, record: RestaurantRecord) -> Self {
        self.insert(client_id, record);
        self
    }

    /// Reads `client_id,res_id,brand,city,sub_zone` rows from a CSV file.
    pub fn from_csv_path(path: &Path) -> Result<Self, MasterDataError> {
        let file = std::fs::File::open(path).map_err(|err| MasterDataError::Csv {
            path: path.to_path_buf(),
            source: csv::Error::from(err),
        })?;
        Self::from_csv_reader(file).map_err(|source| MasterDataError::Csv {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut data = Self::new();
        for row in csv_reader.deserialize::<MasterDataRow>() {
            let row = row?;
            data.insert(
                row.client_id,
                RestaurantRecord {
                    res_id: row.res_id,
                    brand: non_empty(row.brand),
                    city: non_empty(row.city),
                    sub_zone: non_empty(row.sub_zone),
                },
            );
        }
        Ok(data)
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}

impl MasterDataRepository for InMemoryMasterData {
    fn restaurants(&self, client_id: i64) -> Result<Vec<RestaurantRecord>, MasterDataError> {
        Ok(self.clients.get(&client_id).cloned().unwrap_or_default())
    }
}

/// Join semantics for attaching master data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MasterJoin {
    /// Keep only rows whose restaurant is in the master data.
    #[default]
    Inner,
    /// Keep every row; unknown restaurants get null attributes.
    Left,
}

/// Replaces `brand`, `city` and `sub_zone` in `table` with the client's
/// master-data values, matched on `res_id`.
///
/// The attributes are placed right after the key columns.
pub fn standardize_restaurant_master_data<R>(
    repository: &R,
    table: &DataFrame,
    client_id: i64,
    join: MasterJoin,
) -> Result<DataFrame, PipelineError>
where
    R: MasterDataRepository + ?Sized,
{
    let span = info_span!("master_data", client_id);
    let _guard = span.enter();

    let records = repository.restaurants(client_id).map_err(|err| {
        error!(error = %err, "master data lookup failed");
        PipelineError::master_data_lookup(err)
    })?;
    if records.is_empty() {
        return Err(PipelineError::master_data_undefined());
    }
    if table.column(ENTITY_COLUMN).is_err() {
        return Err(PipelineError::column_missing([ENTITY_COLUMN]));
    }

    let mut lookup: HashMap<String, &RestaurantRecord> = HashMap::new();
    for record in &records {
        lookup.entry(normalize_entity_id(&record.res_id)).or_insert(record);
    }

    let ids = column_strings(table, ENTITY_COLUMN)?;
    let mut rows: Vec<Option<usize>> = Vec::with_capacity(ids.len());
    let mut matches: Vec<Option<&RestaurantRecord>> = Vec::with_capacity(ids.len());
    for (idx, id) in ids.iter().enumerate() {
        let hit = id
            .as_deref()
            .and_then(|id| lookup.get(&normalize_entity_id(id)).copied());
        if hit.is_some() || join == MasterJoin::Left {
            rows.push(Some(idx));
            matches.push(hit);
        }
    }

    let key_names: Vec<&str> = [ENTITY_COLUMN, PERIOD_COLUMN]
        .into_iter()
        .filter(|name| table.column(name).is_ok())
        .collect();
    let mut columns: Vec<Column> = Vec::with_capacity(table.width() + MASTER_COLUMNS.len());
    for name in &key_names {
        columns.push(gather_column(table.column(name)?, &rows)?);
    }
    for attribute in MASTER_COLUMNS {
        let values: Vec<Option<String>> = matches
            .iter()
            .map(|hit| hit.and_then(|record| record.attribute(attribute)))
            .collect();
        columns.push(Series::new(attribute.into(), values).into_column());
    }
    for column in table.get_columns() {
        let name = column.name().as_str();
        if key_names.contains(&name) || MASTER_COLUMNS.contains(&name) {
            continue;
        }
        columns.push(gather_column(column, &rows)?);
    }

    debug!(
        input_rows = table.height(),
        output_rows = rows.len(),
        restaurants = records.len(),
        "attached master data"
    );
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aggr_model::ErrorKind;

    struct FailingRepository;

    impl MasterDataRepository for FailingRepository {
        fn restaurants(&self, client_id: i64) -> Result<Vec<RestaurantRecord>, MasterDataError> {
            Err(MasterDataError::Lookup {
                client_id,
                message: "connection refused".to_string(),
            })
        }
    }

    fn table() -> DataFrame {
        DataFrame::new(vec![
            Series::new("res_id".into(), vec!["101", "102"]).into(),
            Series::new("period".into(), vec!["2023-01", "2023-01"]).into(),
            Series::new("city".into(), vec!["stale", "stale"]).into(),
            Series::new("orders_tm".into(), vec![5i64, 7]).into(),
        ])
        .unwrap()
    }

    fn repository() -> InMemoryMasterData {
        InMemoryMasterData::new().with_record(
            7,
            RestaurantRecord::new("101.0")
                .with_brand("Burger Barn")
                .with_city("Pune")
                .with_sub_zone("Baner"),
        )
    }

    #[test]
    fn inner_join_keeps_known_restaurants() {
        let out = standardize_restaurant_master_data(&repository(), &table(), 7, MasterJoin::Inner)
            .unwrap();
        assert_eq!(out.height(), 1);
        let names: Vec<&str> = out.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["res_id", "period", "brand", "city", "sub_zone", "orders_tm"]);
        let city = column_strings(&out, "city").unwrap();
        assert_eq!(city, vec![Some("Pune".to_string())]);
    }

    #[test]
    fn left_join_keeps_every_row() {
        let out = standardize_restaurant_master_data(&repository(), &table(), 7, MasterJoin::Left)
            .unwrap();
        assert_eq!(out.height(), 2);
        let brand = column_strings(&out, "brand").unwrap();
        assert_eq!(brand, vec![Some("Burger Barn".to_string()), None]);
    }

    #[test]
    fn unknown_client_is_undefined() {
        let err = standardize_restaurant_master_data(&repository(), &table(), 8, MasterJoin::Inner)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MasterDataUndefined);
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn repository_failure_is_a_lookup_error() {
        let err =
            standardize_restaurant_master_data(&FailingRepository, &table(), 7, MasterJoin::Inner)
                .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MasterDataLookup);
        assert!(err.message().contains("connection refused"));
    }

    #[test]
    fn loads_csv_rows() {
        let csv = "client_id,res_id,brand,city,sub_zone\n\
                   7,101,Burger Barn,Pune,\n\
                   9,55,Tea Co,Delhi,CP\n";
        let data = InMemoryMasterData::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(data.client_count(), 2);
        let records = data.restaurants(7).unwrap();
        assert_eq!(records[0].sub_zone, None);
        assert_eq!(records[0].brand.as_deref(), Some("Burger Barn"));
    }
}
