use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading a mesh.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Syntax error on line {line}: {content}")]
    Syntax { line: usize, content: String },

    #[error("Face on line {line} has {corners} corners, only triangles are supported")]
    NonTriangularFace { line: usize, corners: usize },

    #[error("Index {index} on line {line} is out of range (1..={len})")]
    IndexOutOfRange { line: usize, index: u32, len: usize },

    #[error("Mesh has no vertices")]
    EmptyMesh,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = LoadError::NonTriangularFace { line: 7, corners: 4 };
        assert_eq!(
            e.to_string(),
            "Face on line 7 has 4 corners, only triangles are supported"
        );
        let e = LoadError::IndexOutOfRange { line: 3, index: 9, len: 8 };
        assert_eq!(e.to_string(), "Index 9 on line 3 is out of range (1..=8)");
    }
}
