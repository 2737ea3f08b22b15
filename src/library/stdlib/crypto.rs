//! Hash digests

use super::arg;
use crate::library::LibraryTable;
use crate::parser::Node;
use crate::types::Signature;
use sha2::{Digest, Sha256};

/// Register crypto functions
pub fn register(library: &mut LibraryTable) {
    library.define_fn("crypto.sha256", Signature::positional(&["string"]), |_, args| {
        let digest = Sha256::digest(arg(&args, 0).to_text().as_bytes());
        Ok(Node::String(hex::encode(digest)))
    });
}
