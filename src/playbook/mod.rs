// Playbook model

pub mod ast;
pub mod yaml;

pub use ast::{args, Play, PlayTask, Task};
pub use yaml::{parse_play_fragment, parse_task_list};
