pub(crate) mod request;
pub(crate) mod response;

pub use request::{PageAction, PageRequest, Pagination};
pub use response::PageResponse;
