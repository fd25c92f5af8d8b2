mod collect;
mod pipeline;
mod refresh;
mod render;

pub use collect::cmd_collect;
pub use pipeline::cmd_pipeline;
pub use refresh::cmd_refresh;
pub use render::cmd_render;
