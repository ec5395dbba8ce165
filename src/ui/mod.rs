// ui/mod.rs

mod component;
mod sheet;
mod view;

pub use component::Component;
pub use sheet::{MIN_HEIGHT, MIN_WIDTH, draw_sheet};
pub use view::{Control, TuiView, label_for};
