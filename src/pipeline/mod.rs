//! Pipeline stages for manuscript flattening.
//!
//! Each submodule implements exactly one step. Stages share no state; the
//! driver in [`crate::flatten()`] threads paths and text between them.
//!
//! ## Data Flow
//!
//! ```text
//! validate ──▶ tools ──▶ extract ──▶ copy ──▶ rewrite
//! (paths)     (latexpand, (regex)    (Fig<N>)  (names, paths)
//!              bibexport)
//! ```
//!
//! 1. [`validate`]: check every input path before anything is created
//! 2. [`tools`]: run bibexport and latexpand as child processes
//! 3. [`extract`]: list `\includegraphics` arguments in document order
//! 4. [`copy`]: copy figures as `Fig<N>.<ext>`, plus `.cls/.sty/.bst`
//! 5. [`rewrite`]: rename figures, drop `\graphicspath`, retarget
//!    `\bibliography`

pub mod copy;
pub mod extract;
pub mod rewrite;
pub mod tools;
pub mod validate;
