pub mod airtable;

pub use airtable::{is_addressable_record_id, HttpTableClient, TableClient, TableResponse};
