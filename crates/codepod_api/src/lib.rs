//! Transport-neutral façade for the CodePod repository routes.
//!
//! An HTTP layer maps each route to one method on [`CodepodApi`] and writes
//! the returned [`ApiReply`] status and body verbatim.

pub mod api;
pub mod envelope;

pub use api::{AddCommentRequest, CodepodApi, CreateIssueRequest, UpdateFileRequest};
pub use envelope::{
    ApiError, ApiReply, ApiResponse, STATUS_BAD_REQUEST, STATUS_CREATED, STATUS_INTERNAL_ERROR,
    STATUS_NOT_FOUND, STATUS_OK,
};
