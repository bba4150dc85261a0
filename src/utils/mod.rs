pub mod display;

pub use display::{print_entry, print_error, print_header, print_info, print_success};
