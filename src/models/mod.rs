pub mod task;
pub mod user;

pub use task::{NewTask, Task, TaskChanges, TaskInput, TaskList, TaskPatch, TaskQuery};
pub use user::{NewUser, User};
