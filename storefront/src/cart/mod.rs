//! Cart store: the signed-in user's cart, refetched after every mutation.

pub mod actions;
pub mod reducer;
pub mod state;

pub use actions::{CartAction, DEFAULT_QUANTITY};
pub use reducer::{
    CartReducer, ADD_FAILED, CLEAR_FAILED, FETCH_FAILED, REMOVE_FAILED, UPDATE_FAILED,
};
pub use state::{CartEvent, CartState};
