use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// 表单中允许上传的文件字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileField {
    Mark10,
    Mark11,
    Mark12,
    IdCard,
    DiscountMark,
}

impl FileField {
    pub const ALL: [FileField; 5] = [
        FileField::Mark10,
        FileField::Mark11,
        FileField::Mark12,
        FileField::IdCard,
        FileField::DiscountMark,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileField::Mark10 => "mark10",
            FileField::Mark11 => "mark11",
            FileField::Mark12 => "mark12",
            FileField::IdCard => "idCard",
            FileField::DiscountMark => "discountMark",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(self, FileField::Mark10 | FileField::IdCard)
    }
}

impl std::fmt::Display for FileField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: Option<String>,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    /// `data:<mime>;base64,<data>`
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.data))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub parent_profession: Option<String>,
    pub files: BTreeMap<FileField, Attachment>,
}

impl SubmissionForm {
    pub fn missing_required(&self) -> Vec<FileField> {
        FileField::ALL
            .into_iter()
            .filter(|f| f.is_required() && !self.files.contains_key(f))
            .collect()
    }

    /// JSON body for the spreadsheet ingest endpoint.
    pub fn to_payload(&self, submitted_at: DateTime<Utc>) -> Value {
        let mut payload = Map::new();
        let text = |v: &Option<String>| Value::String(v.clone().unwrap_or_default());

        payload.insert("name".into(), text(&self.name));
        payload.insert("phone".into(), text(&self.phone));
        payload.insert("parentProfession".into(), text(&self.parent_profession));
        payload.insert("submittedAt".into(), Value::String(submitted_at.to_rfc3339()));

        for (field, attachment) in &self.files {
            payload.insert(field.as_str().into(), Value::String(attachment.to_data_uri()));
            if let Some(file_name) = &attachment.file_name {
                payload.insert(
                    format!("{}FileName", field.as_str()),
                    Value::String(file_name.clone()),
                );
            }
        }

        Value::Object(payload)
    }
}

/// OpenAPI description of the `multipart/form-data` body accepted by `/submit-form`.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct SubmitFormRequest {
    name: Option<String>,
    phone: Option<String>,
    parent_profession: Option<String>,
    #[schema(value_type = String, format = Binary)]
    mark10: Vec<u8>,
    #[schema(value_type = Option<String>, format = Binary)]
    mark11: Option<Vec<u8>>,
    #[schema(value_type = Option<String>, format = Binary)]
    mark12: Option<Vec<u8>>,
    #[schema(value_type = String, format = Binary)]
    id_card: Vec<u8>,
    #[schema(value_type = Option<String>, format = Binary)]
    discount_mark: Option<Vec<u8>>,
}
