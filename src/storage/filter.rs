//! Key matching shared by every listing backend.
//!
//! Keys are `/`-separated strings: object keys for remote backends,
//! paths for the local filesystem. A listing root is the part of the
//! pattern before the first glob character, cut back to its last `/`;
//! relative names are computed against it.

use super::ListMode;
use crate::error::Result;
use crate::location::has_glob_chars;
use glob::{MatchOptions, Pattern};

const LITERAL_SEPARATOR: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

const ANY_SEPARATOR: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Outcome of matching one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KeyMatch {
    /// The key itself is listed
    Object { relative: String },
    /// A directory above the key is listed instead
    Prefix { key: String },
}

#[derive(Debug, Clone)]
pub(crate) struct KeyFilter {
    root: String,
    literal: String,
    pattern: Option<Pattern>,
    recursive: bool,
    mode: ListMode,
}

impl KeyFilter {
    pub(crate) fn new(path: &str, recursive: bool, mode: ListMode) -> Result<Self> {
        if has_glob_chars(path) {
            let first = path.find(['*', '?', '[']).unwrap_or(path.len());
            let root = match path[..first].rfind('/') {
                Some(idx) => path[..=idx].to_owned(),
                None => String::new(),
            };
            Ok(Self {
                root,
                literal: path.to_owned(),
                pattern: Some(Pattern::new(path)?),
                recursive,
                mode,
            })
        } else {
            let root = if path.is_empty() || path.ends_with('/') {
                path.to_owned()
            } else {
                format!("{path}/")
            };
            Ok(Self {
                root,
                literal: path.to_owned(),
                pattern: None,
                recursive,
                mode,
            })
        }
    }

    /// Key prefix every match starts with.
    pub(crate) fn root(&self) -> &str {
        &self.root
    }

    /// How deep below the root a listing has to look, `None` for unbounded.
    pub(crate) fn max_depth(&self) -> Option<usize> {
        if self.recursive {
            return None;
        }
        match self.pattern {
            Some(_) => Some(self.literal[self.root.len()..].split('/').count()),
            None => Some(1),
        }
    }

    /// Match a key naming an object.
    pub(crate) fn classify(&self, key: &str) -> Option<KeyMatch> {
        let Some(pattern) = &self.pattern else {
            if key == self.literal {
                let relative = key.rsplit('/').next().unwrap_or(key).to_owned();
                return Some(KeyMatch::Object { relative });
            }
            let rel = key.strip_prefix(&self.root).filter(|r| !r.is_empty())?;
            if self.recursive {
                return Some(KeyMatch::Object {
                    relative: rel.to_owned(),
                });
            }
            return match rel.find('/') {
                None => Some(KeyMatch::Object {
                    relative: rel.to_owned(),
                }),
                Some(idx) => self.prefix(&rel[..idx]),
            };
        };

        let rel = key.strip_prefix(&self.root)?;
        if self.recursive {
            if pattern.matches_with(key, ANY_SEPARATOR) || self.matched_ancestor(pattern, rel).is_some()
            {
                return Some(KeyMatch::Object {
                    relative: rel.to_owned(),
                });
            }
            return None;
        }

        if pattern.matches_with(key, LITERAL_SEPARATOR) {
            return Some(KeyMatch::Object {
                relative: rel.to_owned(),
            });
        }
        let idx = self.matched_ancestor(pattern, rel)?;
        self.prefix(&rel[..idx])
    }

    /// Match a directory found while walking a tree.
    ///
    /// Only non-recursive listings report directories; recursive ones
    /// report the objects inside them instead.
    pub(crate) fn classify_dir(&self, key: &str) -> Option<KeyMatch> {
        if self.recursive {
            return None;
        }
        let rel = key.strip_prefix(&self.root).filter(|r| !r.is_empty())?;
        match &self.pattern {
            Some(pattern) if pattern.matches_with(key, LITERAL_SEPARATOR) => self.prefix(rel),
            Some(pattern) => {
                let idx = self.matched_ancestor(pattern, rel)?;
                self.prefix(&rel[..idx])
            }
            None => match rel.find('/') {
                None => self.prefix(rel),
                Some(idx) => self.prefix(&rel[..idx]),
            },
        }
    }

    /// Byte offset of the shallowest directory in `rel` matched by the pattern.
    fn matched_ancestor(&self, pattern: &Pattern, rel: &str) -> Option<usize> {
        rel.match_indices('/')
            .map(|(idx, _)| idx)
            .find(|&idx| pattern.matches_with(&format!("{}{}", self.root, &rel[..idx]), LITERAL_SEPARATOR))
    }

    fn prefix(&self, rel_dir: &str) -> Option<KeyMatch> {
        match self.mode {
            ListMode::ObjectsOnly => None,
            ListMode::AllItems => Some(KeyMatch::Prefix {
                key: format!("{}{}/", self.root, rel_dir),
            }),
        }
    }
}

/// A [`KeyFilter`] that reports each directory once.
///
/// Relies on the keys of one directory arriving contiguously, which holds
/// for sorted keys and for depth-first walks.
#[derive(Debug)]
pub(crate) struct Matcher {
    filter: KeyFilter,
    last_prefix: Option<String>,
}

impl Matcher {
    pub(crate) fn new(filter: KeyFilter) -> Self {
        Self {
            filter,
            last_prefix: None,
        }
    }

    pub(crate) fn filter(&self) -> &KeyFilter {
        &self.filter
    }

    pub(crate) fn object(&mut self, key: &str) -> Option<KeyMatch> {
        let found = self.filter.classify(key)?;
        self.admit(found)
    }

    pub(crate) fn dir(&mut self, key: &str) -> Option<KeyMatch> {
        let found = self.filter.classify_dir(key)?;
        self.admit(found)
    }

    fn admit(&mut self, found: KeyMatch) -> Option<KeyMatch> {
        if let KeyMatch::Prefix { key } = &found {
            if self.last_prefix.as_deref() == Some(key.as_str()) {
                return None;
            }
            self.last_prefix = Some(key.clone());
        }
        Some(found)
    }
}
