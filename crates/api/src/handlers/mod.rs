pub mod flows;
pub mod project;
pub mod visual_style;
