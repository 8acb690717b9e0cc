pub mod dispatcher;
pub mod queue;
pub mod task;

pub use dispatcher::{Dispatcher, TaskHandle, TaskHandler};
pub use queue::TaskQueue;
pub use task::{EnqueueOptions, Task, TaskKind, TaskStatus};
