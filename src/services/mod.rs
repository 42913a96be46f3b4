//! Application services.

pub mod order_creation;

pub use order_creation::{
    CreateOrderRequest, CreatedOrder, CreationState, OrderCreationService, OrderError,
    ORDER_CREATED_MESSAGE,
};
