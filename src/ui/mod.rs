pub mod components;
pub mod layout;
pub mod path_input;
pub mod render;
pub mod theme;
