//! Built-in language table.

use once_cell::sync::Lazy;

use super::language::{Comment, Language};

/// Built-in language configurations, lazily initialized.
static BUILTIN_LANGUAGES: Lazy<Vec<Language>> = Lazy::new(|| {
    vec![
        // C-style languages
        Language::new("C", Comment::line("//")).with_identifiers(&["c", "h"]),
        Language::new("C++", Comment::line("//")).with_identifiers(&["cpp", "c++", "cxx", "hpp"]),
        Language::new("Java", Comment::line("//")).with_identifiers(&["java"]),
        Language::new("JavaScript", Comment::line("//")).with_identifiers(&["javascript", "js"]),
        Language::new("TypeScript", Comment::line("//")).with_identifiers(&["typescript", "ts"]),
        Language::new("Rust", Comment::line("//")).with_identifiers(&["rust", "rs"]),
        Language::new("Go", Comment::line("//")).with_identifiers(&["go"]),
        Language::new("C#", Comment::line("//")).with_identifiers(&["csharp", "cs"]),
        // Shell-style languages
        Language::new("Python", Comment::line("#")).with_identifiers(&["python", "py", "python3"]),
        Language::new("Ruby", Comment::line("#")).with_identifiers(&["ruby", "rb"]),
        Language::new("Bash", Comment::line("#")).with_identifiers(&["bash", "sh", "shell", "zsh"]),
        Language::new("R", Comment::line("#")).with_identifiers(&["r"]),
        Language::new("Julia", Comment::line("#")).with_identifiers(&["julia", "jl"]),
        Language::new("YAML", Comment::line("#")).with_identifiers(&["yaml", "yml"]),
        Language::new("TOML", Comment::line("#")).with_identifiers(&["toml"]),
        Language::new("Make", Comment::line("#")).with_identifiers(&["make", "makefile"]),
        Language::new("Dockerfile", Comment::line("#")).with_identifiers(&["dockerfile", "docker"]),
        // Lisp-style languages
        Language::new("Lisp", Comment::line(";")).with_identifiers(&["lisp", "elisp"]),
        Language::new("Scheme", Comment::line(";")).with_identifiers(&["scheme", "scm"]),
        Language::new("Clojure", Comment::line(";")).with_identifiers(&["clojure", "clj"]),
        // ML-style languages
        Language::new("Haskell", Comment::line("--")).with_identifiers(&["haskell", "hs"]),
        Language::new("Elm", Comment::line("--")).with_identifiers(&["elm"]),
        Language::new("OCaml", Comment::block("(*", "*)")).with_identifiers(&["ocaml", "ml"]),
        // Web and data languages
        Language::new("HTML", Comment::block("<!--", "-->")).with_identifiers(&["html", "htm"]),
        Language::new("XML", Comment::block("<!--", "-->")).with_identifiers(&["xml", "svg"]),
        Language::new("CSS", Comment::block("/*", "*/")).with_identifiers(&["css"]),
        Language::new("SQL", Comment::line("--")).with_identifiers(&["sql"]),
        Language::new("Lua", Comment::line("--")).with_identifiers(&["lua"]),
        Language::new("LaTeX", Comment::line("%")).with_identifiers(&["latex", "tex"]),
        Language::new("Gnuplot", Comment::line("#")).with_identifiers(&["gnuplot"]),
    ]
});

/// Finds a built-in language by fence identifier.
pub fn find_language(identifier: &str) -> Option<Language> {
    BUILTIN_LANGUAGES
        .iter()
        .find(|l| l.matches(identifier))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_identifier() {
        assert_eq!(find_language("py").unwrap().name, "Python");
        assert_eq!(find_language("rs").unwrap().comment, Comment::line("//"));
        assert!(find_language("brainfuck").is_none());
    }

    #[test]
    fn test_block_comment_languages() {
        let html = find_language("html").unwrap();
        assert_eq!(html.comment, Comment::block("<!--", "-->"));
    }
}
