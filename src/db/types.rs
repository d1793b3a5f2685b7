use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Student,
    Moderator,
    Admin,
}

impl UserRole {
    /// Staff may manage test content and blogs.
    pub(crate) fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Moderator)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "testskill", rename_all = "lowercase")]
pub(crate) enum TestSkill {
    Listening,
    Reading,
    Writing,
    Speaking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "teststatus", rename_all = "lowercase")]
pub(crate) enum TestStatus {
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "sectiontype", rename_all = "lowercase")]
pub(crate) enum SectionType {
    Listening,
    Reading,
    Writing,
}

impl SectionType {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Listening => "Listening",
            Self::Reading => "Reading",
            Self::Writing => "Writing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "questiontype", rename_all = "snake_case")]
pub(crate) enum QuestionType {
    MultipleChoice,
    FillInTheBlank,
    TickBox,
    Matching,
    ShortAnswer,
    Essay,
}

impl QuestionType {
    /// Groups of these types are graded automatically against their answer keys.
    pub(crate) fn is_auto_graded(self) -> bool {
        matches!(self, Self::MultipleChoice | Self::FillInTheBlank | Self::TickBox)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "questiongroupcategory", rename_all = "snake_case")]
pub(crate) enum QuestionGroupCategory {
    FormNoteCompletion,
    TableCompletion,
    SentenceCompletion,
    MultipleChoice,
    MultipleAnswer,
    Matching,
    MapPlanDiagramLabeling,
    ShortAnswer,
    FlowchartCompletion,
    NotYetCategorized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "blogstatus", rename_all = "lowercase")]
pub(crate) enum BlogStatus {
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "blogtheme", rename_all = "lowercase")]
pub(crate) enum BlogTheme {
    Listening,
    Reading,
    Speaking,
    Writing,
}
