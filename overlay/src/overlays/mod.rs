//! Complete overlay implementations built on [`ToastWindow`](crate::manager::ToastWindow)

mod toast;

pub use toast::{LinePlacement, ToastLayout, ToastOverlay, layout_toast};
