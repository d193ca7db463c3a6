//! csproj-langversion: keeps generated C# project files in line with `csc.rsp`
//!
//! Unity regenerates its `.csproj` files without the language version requested in
//! the compiler options file, so IDEs analyze the code as C# 9. This library
//! provides the pieces to fix that up after every regeneration:
//! - Project document parsing that preserves the original text of untouched nodes
//! - Compiler options scanning for `-langVersion:10` and `-langVersion:preview`
//! - Reconciliation of the project's `LangVersion` setting
//!
//! # Example
//!
//! ```
//! use std::io;
//!
//! use csproj_langversion::reconcile;
//!
//! let project = r#"<Project>
//!   <PropertyGroup>
//!     <LangVersion>9.0</LangVersion>
//!   </PropertyGroup>
//!   <ItemGroup>
//!     <None Include="Assets/csc.rsp" />
//!   </ItemGroup>
//! </Project>"#;
//! let options = |_: &str| -> io::Result<Vec<String>> { Ok(vec!["-langVersion:10".to_string()]) };
//!
//! let updated = reconcile(project, &options).unwrap();
//! assert!(updated.contains("<LangVersion>10.0</LangVersion>"));
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod parser;
pub mod resolver;
pub mod schema;

mod runner;
mod sync;

pub use config::{LineEnding, SyncConfig};
pub use document::ProjectDocument;
pub use error::{ParseError, SyncError};
pub use resolver::{FileResolver, FsResolver};
pub use runner::{FileReport, Mode, RunError, Runner, Summary};
pub use sync::{reconcile, Outcome, ProjectLangVersionSync, Reconciliation};
