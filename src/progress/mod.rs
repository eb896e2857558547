/// Progress events, derived timing and observers.
pub mod reporter;
