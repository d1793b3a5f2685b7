pub(crate) mod auth;
pub(crate) mod blogs;
pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod pagination;
pub(crate) mod question_groups;
pub(crate) mod questions;
pub(crate) mod response;
pub(crate) mod router;
pub(crate) mod sections;
pub(crate) mod test_results;
pub(crate) mod upload;
pub(crate) mod uploads;
pub(crate) mod users;
pub(crate) mod validation;
