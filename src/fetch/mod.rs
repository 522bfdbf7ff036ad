//! Dataset acquisition collaborators: download archive parts, then assemble
//! and unpack them into the audio tree. The extraction core only consumes
//! their postcondition (a tree of audio files on disk).

pub mod assemble;
pub mod download;

pub use assemble::assemble_and_unpack;
pub use download::download_parts;
