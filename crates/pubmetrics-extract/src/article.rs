//! Article facts as served by the article index

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::publisher::Publisher;

/// One indexed article. Field names follow the index's JSON documents.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub publication_date: NaiveDate,
    #[serde(default)]
    pub publication_info: Vec<PublicationInfo>,
    #[serde(default, rename = "article_identifiers")]
    pub identifiers: Vec<Identifier>,
    #[serde(default, rename = "article_arxiv_category")]
    pub arxiv_categories: Vec<ArxivCategory>,
    /// Only counted; the author shape varies between index versions
    #[serde(default)]
    pub authors: Vec<serde_json::Value>,
    #[serde(default)]
    pub related_files: Vec<RelatedFile>,
    #[serde(default)]
    pub related_materials: Vec<RelatedMaterial>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublicationInfo {
    #[serde(default)]
    pub journal_title: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Identifier {
    pub identifier_type: String,
    pub identifier_value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArxivCategory {
    pub category: String,
    #[serde(default)]
    pub primary: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelatedFile {
    pub file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelatedMaterial {
    pub related_material_type: String,
}

impl ArticleRecord {
    fn first_identifier(&self, kind: &str) -> Option<&str> {
        self.identifiers
            .iter()
            .find(|i| i.identifier_type == kind)
            .map(|i| i.identifier_value.as_str())
    }

    pub fn first_doi(&self) -> Option<&str> {
        self.first_identifier("DOI")
    }

    pub fn first_arxiv(&self) -> Option<&str> {
        self.first_identifier("arXiv")
    }

    pub fn primary_category(&self) -> Option<&str> {
        self.arxiv_categories
            .iter()
            .find(|c| c.primary)
            .map(|c| c.category.as_str())
    }

    /// Journal title of the first publication info entry.
    pub fn journal(&self) -> Option<&str> {
        self.publication_info.first()?.journal_title.as_deref()
    }

    /// Publisher tag of the first publication info entry.
    pub fn publisher(&self) -> Option<Publisher> {
        self.publication_info
            .first()?
            .publisher
            .as_deref()
            .map(Publisher::from_name)
    }

    /// Related file paths ending in `.xml`, in index order.
    pub fn xml_files(&self) -> impl Iterator<Item = &str> {
        self.related_files
            .iter()
            .map(|f| f.file.as_str())
            .filter(|f| f.ends_with(".xml"))
    }

    pub fn related_material_count(&self, kind: &str) -> usize {
        self.related_materials
            .iter()
            .filter(|m| m.related_material_type == kind)
            .count()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s,
    })
}
