//! Data models for cashbook entities.
//!
//! These are the payloads of the `/api/v1/` endpoints:
//!
//! - `Cashbook`, `Summary`, `UserRole`, `Business`: ledgers and their totals
//! - `Transaction`, `NewTransaction`, `TransactionFilter`: entries and queries
//! - `Category`, `Party`, `PaymentMode`, `Member`: lookup entities
//! - `Report`, `ExportFormat`: reports and their downloadable exports
//! - `Page`, `Pagination`: paginated or bare list responses

pub mod cashbook;
mod de;
pub mod lookup;
pub mod page;
pub mod report;
pub mod transaction;
pub mod user;

pub use cashbook::{Business, Cashbook, NewCashbook, Summary, UserRole};
pub use lookup::{Category, Member, NewLookup, Party, PaymentMode};
pub use page::{Page, Pagination, DEFAULT_PAGE_SIZE};
pub use report::{ExportFormat, Report, ReportLine};
pub use transaction::{DateRange, NewTransaction, Transaction, TransactionFilter, TransactionType};
pub use user::UserProfile;
pub(crate) use user::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse};
