//! Built-in example programs.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// A named example program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    /// Straight-line floating-point program with loads and all four operations.
    Default,
    /// Read-after-write hazard.
    Raw,
    /// Write-after-read hazard.
    War,
    /// Write-after-write hazard.
    Waw,
    /// Counting loop with a `blt` back-edge.
    Loop,
}

impl Template {
    /// Every template, in menu order.
    pub const ALL: [Self; 5] = [Self::Default, Self::Raw, Self::War, Self::Waw, Self::Loop];

    /// Short name used on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Raw => "raw",
            Self::War => "war",
            Self::Waw => "waw",
            Self::Loop => "loop",
        }
    }

    /// Assembly source of the template.
    pub const fn source(self) -> &'static str {
        match self {
            Self::Default => {
                "flw f6, 32(a2)\nflw f2, 44(a3)\nfmul.s f0, f2, f4\nfsub.s f8, f2, f6\nfdiv.s f10, f0, f6\nfadd.s f6, f6, f2"
            }
            Self::Raw => "fmul.s f4, f1, f2\nfadd.s f5, f1, f4",
            Self::War => "fmul.s f4, f1, f5\nfadd.s f5, f1, f2",
            Self::Waw => "fmul.s f6, f1, f2\nfadd.s f6, f3, f4",
            Self::Loop => "# x1 counts up until it reaches x2\nloop:\naddi x1, x1, 1\nblt x1, x2, loop",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Template {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|t| t.name()).collect();
                format!("unknown template `{s}` (expected one of: {})", names.join(", "))
            })
    }
}
