pub(crate) mod email;
pub(crate) mod google;
pub(crate) mod object_keys;
pub(crate) mod ordering;
pub(crate) mod otp;
pub(crate) mod scoring;
pub(crate) mod slug;
pub(crate) mod storage;
