pub mod invoices;

pub use invoices::{InvoicePage, InvoiceService, PageWindow};
