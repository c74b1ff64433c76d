//! Request pipeline layers, outermost first:
//! request id → identity resolution → visit tracking → handler.

pub mod identity;
pub mod request_id;
pub mod visits;
