//! Document analysis wire types
//!
//! The analysis service returns a loosely-typed tree: every level may be
//! missing or `null`. These types accept that shape as-is and expose slice
//! accessors that treat absence as an empty sequence.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Label name of the repeated line-item group field
pub const ITEMS_FIELD: &str = "Items";

/// Document type reported for invoices by the classifier
pub const INVOICE_DOCUMENT_TYPE: &str = "INVOICE";

static NULL_VALUE: Value = Value::Null;

/// Deserialize an optional sequence, dropping `null` entries
fn non_null_entries<'de, D, T>(deserializer: D) -> std::result::Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let entries: Option<Vec<Option<T>>> = Option::deserialize(deserializer)?;
    Ok(entries.map(|entries| entries.into_iter().flatten().collect()))
}

/// Raw result of a document analysis call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnalysisResult {
    #[serde(default, deserialize_with = "non_null_entries")]
    pub detected_document_types: Option<Vec<DetectedDocumentType>>,
    #[serde(default, deserialize_with = "non_null_entries")]
    pub pages: Option<Vec<Page>>,
}

impl RawAnalysisResult {
    pub fn new(detected: Vec<DetectedDocumentType>, pages: Vec<Page>) -> Self {
        Self {
            detected_document_types: Some(detected),
            pages: Some(pages),
        }
    }

    pub fn detected_document_types(&self) -> &[DetectedDocumentType] {
        self.detected_document_types.as_deref().unwrap_or(&[])
    }

    pub fn pages(&self) -> &[Page] {
        self.pages.as_deref().unwrap_or(&[])
    }
}

/// One classifier guess for the document type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedDocumentType {
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl DetectedDocumentType {
    pub fn new(document_type: &str, confidence: f64) -> Self {
        Self {
            document_type: Some(document_type.to_string()),
            confidence: Some(confidence),
        }
    }
}

/// A single analyzed page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default, deserialize_with = "non_null_entries")]
    pub document_fields: Option<Vec<DocumentField>>,
}

impl Page {
    pub fn new(fields: Vec<DocumentField>) -> Self {
        Self {
            document_fields: Some(fields),
        }
    }

    pub fn document_fields(&self) -> &[DocumentField] {
        self.document_fields.as_deref().unwrap_or(&[])
    }
}

/// Field label: semantic name plus the extractor's confidence in it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldLabel {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Untyped field value as it arrives on the wire.
///
/// Scalar fields populate `value`; the line-item group populates `items`,
/// where each entry is itself a field whose `items` are the item's fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFieldValue {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default, deserialize_with = "non_null_entries")]
    pub items: Option<Vec<DocumentField>>,
}

/// An extracted key/value field, or a line-item group / line item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentField {
    #[serde(default)]
    pub field_label: Option<FieldLabel>,
    #[serde(default)]
    pub field_value: Option<RawFieldValue>,
}

/// A field value resolved by its label name
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Plain value (string, number, or null)
    Scalar(&'a Value),
    /// The "Items" group: one entry per line item
    ItemGroup(&'a [DocumentField]),
}

impl DocumentField {
    /// Key/value field with a labelled scalar value
    pub fn scalar(name: &str, value: Value, confidence: Option<f64>) -> Self {
        Self {
            field_label: Some(FieldLabel {
                name: Some(name.to_string()),
                confidence,
            }),
            field_value: Some(RawFieldValue {
                value: Some(value),
                items: None,
            }),
        }
    }

    /// The "Items" group holding one entry per line item
    pub fn item_group(line_items: Vec<DocumentField>) -> Self {
        Self {
            field_label: Some(FieldLabel {
                name: Some(ITEMS_FIELD.to_string()),
                confidence: None,
            }),
            field_value: Some(RawFieldValue {
                value: None,
                items: Some(line_items),
            }),
        }
    }

    /// One line item holding its own fields
    pub fn line_item(fields: Vec<DocumentField>) -> Self {
        Self {
            field_label: None,
            field_value: Some(RawFieldValue {
                value: None,
                items: Some(fields),
            }),
        }
    }

    /// Label name, if the extractor assigned one
    pub fn name(&self) -> Option<&str> {
        self.field_label.as_ref()?.name.as_deref()
    }

    pub fn label_confidence(&self) -> Option<f64> {
        self.field_label.as_ref()?.confidence
    }

    /// Nested fields (`fieldValue.items`), empty when absent
    pub fn items(&self) -> &[DocumentField] {
        self.field_value
            .as_ref()
            .and_then(|v| v.items.as_deref())
            .unwrap_or(&[])
    }

    /// Scalar `fieldValue.value`, `null` when absent
    pub fn value(&self) -> &Value {
        self.field_value
            .as_ref()
            .and_then(|v| v.value.as_ref())
            .unwrap_or(&NULL_VALUE)
    }

    /// Pick the value variant. Only a field labelled "Items" is a group.
    pub fn resolve(&self) -> FieldValue<'_> {
        if self.name() == Some(ITEMS_FIELD) {
            FieldValue::ItemGroup(self.items())
        } else {
            FieldValue::Scalar(self.value())
        }
    }
}

/// Feature requested from the analysis service
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "featureType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentFeature {
    KeyValueExtraction,
    DocumentClassification {
        #[serde(rename = "maxResults")]
        max_results: u32,
    },
}

impl DocumentFeature {
    /// Feature set used for invoice extraction
    pub fn invoice_features() -> Vec<DocumentFeature> {
        vec![
            DocumentFeature::KeyValueExtraction,
            DocumentFeature::DocumentClassification { max_results: 5 },
        ]
    }
}

/// Document embedded in the request body as base64
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineDocument {
    pub source: &'static str,
    pub data: String,
}

impl InlineDocument {
    pub fn new(encoded: String) -> Self {
        Self {
            source: "INLINE",
            data: encoded,
        }
    }
}

/// Body of an analyze-document call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeDocumentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compartment_id: Option<String>,
    pub document: InlineDocument,
    pub features: Vec<DocumentFeature>,
}
