//! Per-article metric rows

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::article::ArticleRecord;
use crate::model::Extraction;
use crate::publisher::{AffiliationSource, Publisher, PublisherSchema};
use crate::schema::Column;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricValue {
    Int(i64),
    Text(Option<String>),
    Date(NaiveDate),
    List(Vec<String>),
}

impl MetricValue {
    fn count(n: usize) -> Self {
        Self::Int(n as i64)
    }

    fn text(value: Option<&str>) -> Self {
        Self::Text(value.map(String::from))
    }
}

/// CSV cell rendering: absent text is empty, dates are `YYYY-MM-DD`, lists
/// are a JSON array.
impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(Some(s)) => f.write_str(s),
            Self::Text(None) => Ok(()),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::List(items) => {
                let json = serde_json::to_string(items).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

/// One article's metrics, keyed by column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsRecord {
    values: BTreeMap<Column, MetricValue>,
}

impl MetricsRecord {
    pub fn get(&self, column: Column) -> Option<&MetricValue> {
        self.values.get(&column)
    }

    /// Columns present, in canonical order.
    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.values.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn insert(&mut self, column: Column, value: MetricValue) {
        self.values.insert(column, value);
    }
}

/// Build the metrics row for `article`.
///
/// `repository_count` is only read by publishers whose affiliation counts come
/// from the repository store.
pub fn aggregate(
    article: &ArticleRecord,
    publisher: &Publisher,
    extraction: &Extraction,
    repository_count: usize,
) -> MetricsRecord {
    let mut record = MetricsRecord::default();

    let date = article.publication_date;
    record.insert(Column::Year, MetricValue::Int(i64::from(date.year())));
    record.insert(Column::Journal, MetricValue::text(article.journal()));
    record.insert(Column::Doi, MetricValue::text(article.first_doi()));
    record.insert(Column::PublicationDate, MetricValue::Date(date));
    record.insert(Column::ArxivNumber, MetricValue::text(article.first_arxiv()));
    record.insert(
        Column::PrimaryArxivCategory,
        MetricValue::text(article.primary_category()),
    );
    record.insert(Column::TotalAuthors, MetricValue::count(article.authors.len()));
    record.insert(
        Column::DatasetMaterials,
        MetricValue::count(article.related_material_count("dataset")),
    );
    record.insert(
        Column::SoftwareMaterials,
        MetricValue::count(article.related_material_count("software")),
    );

    if let Some(schema) = publisher.schema() {
        for &column in schema.extra_columns {
            if let Some(value) = extra_value(column, schema, extraction, repository_count) {
                record.insert(column, value);
            }
        }
    }

    record
}

fn extra_value(
    column: Column,
    schema: &PublisherSchema,
    extraction: &Extraction,
    repository_count: usize,
) -> Option<MetricValue> {
    let value = match column {
        Column::OrcidCount => MetricValue::count(extraction.orcid_count()),
        Column::NonUniqueAffiliations => MetricValue::count(match schema.affiliations {
            AffiliationSource::Xml => extraction.affiliations.len(),
            AffiliationSource::Repository => repository_count,
        }),
        Column::RepositoryAffiliations => MetricValue::count(repository_count),
        Column::RorLinked => MetricValue::count(extraction.ror_count()),
        Column::DatasetLinks => MetricValue::List(extraction.datasets.clone()),
        _ => return None,
    };
    Some(value)
}
