pub mod icons;
pub mod output;
pub mod progress;
pub mod progress_message;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{banner, diagnostic, dim, error, order_line, path_line, section, success, warn};
pub use progress::{ProgressManager, Spinner};
pub use progress_message::{ProgressMessage, ProgressPhase};
pub use table::{DependencyRow, ExternalRow, TableBuilder};
pub use theme::{theme, Theme};
