// Operator menu on the hub's buttons and light matrix
//
// Provides:
// - The armed run index and the persisted field configuration
// - Short / long press classification
// - The selector loop that launches runs and hosts the config sub-mode

mod field;
mod press;
mod selection;
mod selector;

pub use field::FieldConfig;
pub use press::{Press, await_press, wait_press, wait_release};
pub use selection::RunSelection;
pub use selector::{MenuEvent, Selector, configure, show_selection};
