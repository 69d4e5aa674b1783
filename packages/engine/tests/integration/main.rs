mod common;

mod artifact;
mod db_store;
mod rate_limit;
