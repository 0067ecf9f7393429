//! Console output helpers shared by the CLI commands.
//!
//! The global flags (`--json`, `--quiet`, `--no-color`) are exported as
//! environment variables by `main` so every module can check them without
//! threading the flags through each call.

/// True when `--quiet` was passed.
pub fn is_quiet() -> bool {
    std::env::var("PARTFETCH_QUIET").is_ok()
}

/// True when `--json` was passed.
pub fn is_json() -> bool {
    std::env::var("PARTFETCH_JSON").is_ok()
}

/// True when `--verbose` was passed.
pub fn is_verbose() -> bool {
    std::env::var("PARTFETCH_VERBOSE").is_ok()
}

/// Print a machine-readable JSON value on stdout.
pub fn print_json(value: &serde_json::Value) {
    println!("{value}");
}

/// Symbol set respecting `--no-color` and the `NO_COLOR` convention.
pub struct Styled {
    color: bool,
}

impl Styled {
    pub fn new() -> Self {
        let color = std::env::var("PARTFETCH_NO_COLOR").is_err()
            && std::env::var("NO_COLOR").is_err();
        Self { color }
    }

    pub fn ok_sym(&self) -> &'static str {
        if self.color {
            "\x1b[32m\u{2713}\x1b[0m"
        } else {
            "[OK]"
        }
    }

    pub fn warn_sym(&self) -> &'static str {
        if self.color {
            "\x1b[33m!\x1b[0m"
        } else {
            "[!!]"
        }
    }

    pub fn err_sym(&self) -> &'static str {
        if self.color {
            "\x1b[31m\u{2717}\x1b[0m"
        } else {
            "[xx]"
        }
    }
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}
