//! PDF Module
//!
//! Certificate HTML assembly and the HTML to PDF renderer seam.

mod certificate;
mod renderer;

pub use certificate::{certificate_filename, fill_template, resolve_template_name};
pub use renderer::{CommandRenderer, PdfRenderer};
