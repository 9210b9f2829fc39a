pub(crate) mod fingerprint;
pub(crate) mod rate_limit;
