#![forbid(unsafe_code)]

//! Language detection from a document's display name.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Syntax family used to annotate loaded documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
    Html,
    Css,
    Json,
    Xml,
    Markdown,
    Python,
    Java,
    Kotlin,
    Rust,
    C,
    Cpp,
    Shell,
    Lua,
    Sql,
    #[default]
    PlainText,
}

impl Language {
    /// Classify by file extension (case-insensitive). Unknown -> plain text.
    #[must_use]
    pub fn from_file_name(name: &str) -> Self {
        let Some(ext) = Path::new(name).extension().and_then(|e| e.to_str()) else {
            return Self::PlainText;
        };
        match ext.to_ascii_lowercase().as_str() {
            "js" | "mjs" | "cjs" | "jsx" => Self::JavaScript,
            "ts" | "tsx" => Self::TypeScript,
            "html" | "htm" | "xhtml" => Self::Html,
            "css" | "scss" | "less" => Self::Css,
            "json" => Self::Json,
            "xml" | "svg" => Self::Xml,
            "md" | "markdown" => Self::Markdown,
            "py" | "pyw" => Self::Python,
            "java" => Self::Java,
            "kt" | "kts" => Self::Kotlin,
            "rs" => Self::Rust,
            "c" | "h" => Self::C,
            "cc" | "cpp" | "cxx" | "hpp" | "hh" => Self::Cpp,
            "sh" | "bash" | "zsh" => Self::Shell,
            "lua" => Self::Lua,
            "sql" => Self::Sql,
            _ => Self::PlainText,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Html => "html",
            Self::Css => "css",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Markdown => "markdown",
            Self::Python => "python",
            Self::Java => "java",
            Self::Kotlin => "kotlin",
            Self::Rust => "rust",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Shell => "shell",
            Self::Lua => "lua",
            Self::Sql => "sql",
            Self::PlainText => "plaintext",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
