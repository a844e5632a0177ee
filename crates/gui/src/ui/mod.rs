pub mod headset;
pub mod part_tree;
pub mod properties;
pub mod status_bar;
