pub mod food;
pub mod health;
pub mod hours;
pub mod menus;
