//! Concrete popups. Shared helpers and the `PopupComponent` trait live in
//! `components/popup.rs`.
pub mod alert;
pub mod confirm;
pub mod input;
pub mod menu;

pub use alert::AlertPopup;
pub use confirm::ConfirmPopup;
pub use input::InputPopup;
pub use menu::MenuPopup;
