pub mod dialogs;
pub mod menu;
pub mod table;
