pub mod coerce;
pub mod item;

pub use coerce::{coerce_float, coerce_int, coerce_text};
pub use item::{
    parse_record_list, remote_error_message, FieldsEnvelope, Item, ItemFields, ItemPayload,
    RecordsEnvelope,
};
