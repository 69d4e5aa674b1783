pub mod artifact;
pub mod user_entitlement;
