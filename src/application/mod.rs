pub mod display;
pub mod order_board;
pub mod order_service;
pub mod pagination;
