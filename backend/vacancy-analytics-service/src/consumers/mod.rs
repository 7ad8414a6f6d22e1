pub mod task_trigger;

pub use task_trigger::TaskTriggerConsumer;
