//! Batch conversion of EPUB books from traditional to simplified Chinese.
//!
//! A book is unpacked into a scratch directory, every HTML/XHTML document has its
//! text nodes run through a [`ScriptConverter`], and the tree is packed back into
//! a new EPUB.

pub mod archive;
pub mod convert;
pub mod markup;

pub use archive::{batch_convert, convert_epub, BatchReport, BookResult, EpubReport};
pub use convert::{ScriptConverter, TraditionalToSimplified};
pub use markup::convert_markup;
