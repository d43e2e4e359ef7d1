/*!
Command dispatcher module.

Layout:
  src/cmd/
    mod.rs          (module declarations + re-exports)
    columns.rs      (ColumnsArgs  + execute_columns)
    add.rs          (AddArgs      + execute_add)
    set.rs          (SetArgs      + execute_set)
    complete.rs     (CompleteArgs + execute_complete)
    shared.rs       (target/env handling, field pairs, error output)
    format.rs       (table / box / color formatting utilities)

Conventions:
  - Each subcommand module exposes exactly one public `execute_*` function
    returning `anyhow::Result<()>`.
  - Argument structs derive `clap::Args` and are kept minimal.
  - JSON output paths never use the format helpers; machine output stays
    clean.
*/

pub mod add;
pub mod columns;
pub mod complete;
pub mod format;
pub mod set;
pub mod shared;

pub use add::{AddArgs, execute_add};
pub use columns::{ColumnsArgs, execute_columns};
pub use complete::{CompleteArgs, execute_complete};
pub use set::{SetArgs, execute_set};
