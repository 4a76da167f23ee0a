//! Client side of the loan service
//!
//! - `gateway`: the data-access component. Builds request URLs for the
//!   four operations and classifies responses into `Reply` values.
//! - `presenter`: the presentation controller. Turns gateway results into
//!   a `Transition` to the next `ViewState` for every user action.

pub mod error;
pub mod gateway;
pub mod presenter;

pub use error::ClientError;
pub use gateway::{HttpGateway, LoanGateway, LocalGateway, Reply};
pub use presenter::{Banners, LoanRecord, Presenter, Transition, ViewState};
