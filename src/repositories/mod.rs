pub(crate) mod answer_keys;
pub(crate) mod blogs;
pub(crate) mod health;
pub(crate) mod ordering;
pub(crate) mod question_groups;
pub(crate) mod questions;
pub(crate) mod refresh_tokens;
pub(crate) mod sections;
pub(crate) mod temp_users;
pub(crate) mod test_results;
pub(crate) mod users;
