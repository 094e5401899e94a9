use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Document submitted to the goods-marking registry. Field names follow the
// wire format, which mixes snake_case and camelCase.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Document {
    pub description: Description,
    pub doc_id: String,
    pub doc_status: String,
    pub doc_type: DocumentType,
    #[serde(rename = "importRequest")]
    pub import_request: bool,
    pub owner_inn: String,
    pub participant_inn: String,
    pub producer_inn: String,
    pub production_date: NaiveDate,
    pub production_type: String,
    #[serde(default)]
    pub products: Vec<Product>,
    pub reg_date: NaiveDate,
    pub reg_number: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Description {
    #[serde(rename = "participantInn")]
    pub participant_inn: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    #[serde(rename = "LP_INTRODUCE_GOODS")]
    IntroduceGoods,
}

// One line item of a document
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Product {
    pub certificate_document: String,
    pub certificate_document_date: NaiveDate,
    pub certificate_document_number: String,
    pub owner_inn: String,
    pub producer_inn: String,
    pub production_date: NaiveDate,
    pub tnved_code: String,
    pub uit_code: String,
    pub uitu_code: String,
}

// Sample document used when no file is given on the command line
pub const SAMPLE_DOCUMENT: &str = r#"{
  "description": { "participantInn": "string" },
  "doc_id": "string",
  "doc_status": "string",
  "doc_type": "LP_INTRODUCE_GOODS",
  "importRequest": true,
  "owner_inn": "string",
  "participant_inn": "string",
  "producer_inn": "string",
  "production_date": "2020-01-23",
  "production_type": "string",
  "products": [
    {
      "certificate_document": "string",
      "certificate_document_date": "2020-01-23",
      "certificate_document_number": "string",
      "owner_inn": "string",
      "producer_inn": "string",
      "production_date": "2020-01-23",
      "tnved_code": "string",
      "uit_code": "string",
      "uitu_code": "string"
    }
  ],
  "reg_date": "2020-01-23",
  "reg_number": "string"
}"#;

impl Document {
    pub fn sample() -> Result<Self, serde_json::Error> {
        serde_json::from_str(SAMPLE_DOCUMENT)
    }
}
