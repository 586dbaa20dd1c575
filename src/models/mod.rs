pub mod invoice;
pub mod query;

pub use invoice::{document_too_long, Invoice, NewInvoice, DOCUMENT_MAX_LENGTH};
pub use query::{Pagination, QueryField, QueryOptions, Sort, DEFAULT_PAGE, DEFAULT_PER_PAGE};
