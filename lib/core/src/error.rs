//! Error handling foundation for rolelink.
//!
//! Domain error enums live next to the code that raises them; this module
//! only supplies the rootcause-backed `Result` alias those layers share.
//! Callers attach layer-appropriate context as errors propagate.

use rootcause::Report;

/// Result alias carrying a rootcause `Report` on the error side.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
