//! Language model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::LanguageName;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Language {
    pub id: i32,
    pub name: LanguageName,
}

/// Create or change a language row
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LanguageInput {
    #[serde(default)]
    pub name: LanguageName,
}
