mod exchange_service;

pub use exchange_service::{
    accept_request, cancel_request, create_request, list_requests_for_user, reject_request,
};
