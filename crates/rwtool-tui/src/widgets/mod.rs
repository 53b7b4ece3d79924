//! Small rendering helpers shared by the screens.

pub mod fmt;
pub mod form;
pub mod sub_tabs;
