use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Section;
use crate::db::types::SectionType;

const fn default_section_type() -> SectionType {
    SectionType::Listening
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CreateSectionRequest {
    #[serde(alias = "testId")]
    pub(crate) test_id: Uuid,
    #[validate(range(min = 1, message = "Order must be positive"))]
    pub(crate) order: i32,
    #[serde(default = "default_section_type", alias = "sectionType")]
    pub(crate) section_type: SectionType,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateTranscriptRequest {
    pub(crate) id: Uuid,
    pub(crate) description: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteSectionRequest {
    #[serde(alias = "sectionId")]
    pub(crate) section_id: Uuid,
    #[serde(alias = "sectionType")]
    pub(crate) section_type: SectionType,
}

#[derive(Debug, Serialize)]
pub(crate) struct SectionResponse {
    pub(crate) id: Uuid,
    pub(crate) test_id: Uuid,
    pub(crate) section_type: SectionType,
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) order: i32,
    pub(crate) audio: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl SectionResponse {
    pub(crate) fn from_db(section: Section) -> Self {
        Self {
            id: section.id,
            test_id: section.test_id,
            section_type: section.section_type,
            title: section.title,
            description: section.description,
            order: section.position,
            audio: section.audio,
            created_at: format_primitive(section.created_at),
            updated_at: format_primitive(section.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AudioResponse {
    pub(crate) audio_url: String,
}
