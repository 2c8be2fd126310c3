use crate::mux::Slot;

const PREFIX: &str = "capture_";
const GRID_SUFFIX: &str = "_grid.jpg";

pub fn slot_filename(stamp: &str, slot: Slot) -> String {
    format!("{}{}_cam{}.jpg", PREFIX, stamp, slot)
}

pub fn grid_filename(stamp: &str) -> String {
    format!("{}{}{}", PREFIX, stamp, GRID_SUFFIX)
}

pub fn is_grid_filename(name: &str) -> bool {
    name.starts_with(PREFIX) && name.ends_with(GRID_SUFFIX)
}
