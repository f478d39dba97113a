//! CLI command implementations
//!
//! Every command returns its process exit code:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Completed with invalid or unpublished records |
//! | 2 | Configuration error |
//! | 4 | Connection failure |
//! | 5 | Fatal error |
//! | 130 | Interrupted by signal |

pub mod init;
pub mod invoke;
pub mod process;
pub mod validate;
