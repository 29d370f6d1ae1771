mod order_service;

pub use order_service::{create_order, find_order_by_request, list_orders_for_user, update_order};
