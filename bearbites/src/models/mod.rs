mod food;
mod hours;
mod location;
mod menu;
mod tags;

pub use food::*;
pub use hours::*;
pub use location::*;
pub use menu::*;
pub use tags::*;
