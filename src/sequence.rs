//! Script identifiers and named script sequences
//!
//! The built-in sequences mirror the script groups of the grading service:
//! UDP scripts live in 1..=17 and TCP scripts in 20..=39. Configuration can
//! add more sequences by name, and `--scripts` accepts ad-hoc lists such as
//! `6,9,20-25`.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::common::{Error, Result};

/// A remote test script number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ScriptId(u16);

impl ScriptId {
    /// Script numbers start at 1
    pub fn new(n: u16) -> Option<Self> {
        (n > 0).then_some(Self(n))
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named, ordered list of scripts
#[derive(Debug, Clone, Serialize)]
pub struct Sequence {
    pub name: String,
    pub scripts: Vec<ScriptId>,
}

/// A sequence shipped with the tool
#[derive(Debug, Clone, Copy)]
pub struct BuiltinSequence {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    scripts: &'static [u16],
}

impl BuiltinSequence {
    pub fn sequence(&self) -> Sequence {
        Sequence {
            name: self.name.to_string(),
            scripts: self.scripts.iter().copied().filter_map(ScriptId::new).collect(),
        }
    }
}

/// Sequence used when the user selects nothing
pub const DEFAULT_SEQUENCE: &str = "post";

/// Name of the sequence built from `--scripts`. Configured names may not
/// start with `-`, so it never collides with one.
pub const AD_HOC_SEQUENCE: &str = "--scripts";

static BUILTINS: &[BuiltinSequence] = &[
    BuiltinSequence {
        name: "udp",
        aliases: &[],
        description: "Every UDP script",
        scripts: &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17],
    },
    BuiltinSequence {
        name: "tcp",
        aliases: &[],
        description: "Every TCP script",
        scripts: &[
            20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39,
        ],
    },
    BuiltinSequence {
        name: "all",
        aliases: &[],
        description: "Every UDP script followed by every TCP script",
        scripts: &[
            1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 20, 21, 22, 23, 24, 25, 26,
            27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39,
        ],
    },
    BuiltinSequence {
        name: "tejo",
        aliases: &[],
        description: "The sequence the reference evaluation runs",
        scripts: &[
            6, 9, 10, 14, 21, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39,
        ],
    },
    BuiltinSequence {
        name: "list",
        aliases: &["ul"],
        description: "User and group listing",
        scripts: &[6, 9, 14, 3, 20, 21],
    },
    BuiltinSequence {
        name: "post",
        aliases: &[],
        description: "Message posting",
        scripts: &[6, 9, 14, 23, 24, 25, 26, 30, 32, 34, 36, 38],
    },
    BuiltinSequence {
        name: "retrieve",
        aliases: &[],
        description: "Message posting followed by retrieval",
        scripts: &[
            6, 9, 14, 23, 24, 25, 26, 30, 32, 34, 36, 38, 27, 28, 29, 31, 33, 35, 37, 39,
        ],
    },
];

/// All built-in sequences
pub fn builtin_sequences() -> &'static [BuiltinSequence] {
    BUILTINS
}

fn find_builtin(name: &str) -> Option<&'static BuiltinSequence> {
    BUILTINS
        .iter()
        .find(|s| s.name == name || s.aliases.contains(&name))
}

/// Built-in sequences plus the ones defined in the config file
///
/// A configured name shadows a built-in one.
#[derive(Debug, Default)]
pub struct SequenceCatalog {
    custom: BTreeMap<String, Vec<u16>>,
}

impl SequenceCatalog {
    pub fn new(custom: BTreeMap<String, Vec<u16>>) -> Self {
        Self { custom }
    }

    /// Look up a sequence by name or alias
    pub fn resolve(&self, name: &str) -> Result<Sequence> {
        if let Some(scripts) = self.custom.get(name) {
            let scripts = scripts
                .iter()
                .map(|&n| {
                    ScriptId::new(n).ok_or_else(|| {
                        Error::Config(format!("sequence '{}' contains script 0", name))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(Sequence {
                name: name.to_string(),
                scripts,
            });
        }

        find_builtin(name)
            .map(|b| b.sequence())
            .ok_or_else(|| Error::unknown_sequence(name, &self.names()))
    }

    /// Names of every available sequence, built-ins first
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = BUILTINS
            .iter()
            .map(|b| b.name.to_string())
            .filter(|n| !self.custom.contains_key(n))
            .collect();
        names.extend(self.custom.keys().cloned());
        names
    }

    /// Configured sequences, in name order
    pub fn custom(&self) -> impl Iterator<Item = (&str, &[u16])> {
        self.custom.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_custom(&self, name: &str) -> bool {
        self.custom.contains_key(name)
    }
}

/// Parse an ad-hoc script list like `6,9,20-25`
///
/// Ranges are inclusive and must not be descending. Order is preserved and
/// duplicates are kept, since running a script twice is meaningful.
pub fn parse_script_list(input: &str) -> Result<Sequence> {
    let mut scripts = Vec::new();

    for part in input.split(',').map(str::trim) {
        if part.is_empty() {
            return Err(Error::invalid_script_list(input, "empty entry"));
        }

        let (start, end) = match part.split_once('-') {
            Some((a, b)) => (parse_script(input, a.trim())?, parse_script(input, b.trim())?),
            None => {
                let n = parse_script(input, part)?;
                (n, n)
            }
        };

        if start > end {
            return Err(Error::invalid_script_list(
                input,
                &format!("descending range {}", part),
            ));
        }

        scripts.extend((start.get()..=end.get()).filter_map(ScriptId::new));
    }

    Ok(Sequence {
        name: AD_HOC_SEQUENCE.to_string(),
        scripts,
    })
}

fn parse_script(input: &str, s: &str) -> Result<ScriptId> {
    let n: u16 = s.parse().map_err(|_| {
        Error::invalid_script_list(input, &format!("'{}' is not a script number", s))
    })?;
    ScriptId::new(n).ok_or_else(|| Error::invalid_script_list(input, "script numbers start at 1"))
}
