//! Loan routes
//!
//! Features:
//! - Legacy route table: `/get_loan/:id`, `/add_loan/:loan`, `/get_all_loan`,
//!   `/change_lender/:lender`, forwarded to the ledger controller
//! - JSON API under `/api/loans` with structured status codes
//! - Loan page with HTMX fragments for the four user actions
//!
//! Structure:
//! - api.rs: route table and JSON API
//! - page.rs: page rendering of the view state

pub mod api;
pub mod page;

pub use api::{
    add_loan,
    api_loan_change_lender,
    api_loan_create,
    api_loan_detail,
    api_loans,
    change_lender,
    get_all_loan,
    get_loan,
};

pub use page::{
    htmx_all_loan,
    htmx_change_lender,
    htmx_query_loan,
    htmx_record_loan,
    page_loans,
    render,
};
