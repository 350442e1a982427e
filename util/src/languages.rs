use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages the workbench editor can hold code for.
/// Serialized/deserialized in `lowercase`; common aliases are accepted
/// (e.g., "cc", "c++", "js", "py", "golang").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[serde(alias = "py", alias = "python3")]
    Python,
    #[serde(alias = "cc", alias = "c++")]
    Cpp,
    C,
    Java,
    #[serde(alias = "js")]
    JavaScript,
    #[serde(alias = "ts")]
    TypeScript,
    Rust,
    #[serde(alias = "golang")]
    Go,
    #[serde(alias = "c#")]
    CSharp,
}

impl Language {
    pub const ALL: [Language; 9] = [
        Language::Python,
        Language::Cpp,
        Language::C,
        Language::Java,
        Language::JavaScript,
        Language::TypeScript,
        Language::Rust,
        Language::Go,
        Language::CSharp,
    ];

    /// Canonical lowercase name, identical to the serde form.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python     => "python",
            Language::Cpp        => "cpp",
            Language::C          => "c",
            Language::Java       => "java",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Rust       => "rust",
            Language::Go         => "go",
            Language::CSharp     => "csharp",
        }
    }

    /// Judge0 language id the grader expects in `languageId`.
    pub fn judge0_id(self) -> u32 {
        match self {
            Language::Python     => 71, // Python 3.8
            Language::Cpp        => 54, // GCC 9.2
            Language::C          => 50, // GCC 9.2
            Language::Java       => 62, // OpenJDK 13
            Language::JavaScript => 63, // Node.js 12
            Language::TypeScript => 74,
            Language::Rust       => 73,
            Language::Go         => 60,
            Language::CSharp     => 51, // Mono 6.6
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a language name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown language '{}'", self.0)
    }
}

impl std::error::Error for UnknownLanguage {}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        serde_json::from_value(serde_json::Value::String(lowered))
            .map_err(|_| UnknownLanguage(s.to_string()))
    }
}
