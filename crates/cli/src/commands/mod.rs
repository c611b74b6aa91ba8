//! Command implementations for the solaudit CLI.
//!
//! `scan` runs the pattern catalogue over one file or a directory tree and
//! renders the scored report; `cvss` scores a standalone CVSS v3.1 vector
//! string, which is handy when refining the suggested vectors by hand.

pub mod cvss;
pub mod scan;
