//! Contract templates

use serde::{Deserialize, Serialize};

/// Offer-letter template a position's contracts are generated from
///
/// Templates are referenced by name in import files and are never imported
/// themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub template_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_file: Option<String>,
}
