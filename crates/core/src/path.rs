//! Paths into nested documents and arrays
//!
//! A [`Path`] is a sequence of fragments, each either a field name or an
//! array index. Paths are plain values: extending one returns a new path.
//!
//! # Path Syntax
//!
//! | Syntax | Meaning | Example |
//! |--------|---------|---------|
//! | `name` / `.name` | Document field | `.user` |
//! | `` `any text` `` | Quoted field (double a backtick to escape it) | `` `a.b` `` |
//! | `[n]` | Array index | `[0]` |
//! | (empty) | Root | `` |
//!
//! Resolution, copy-on-write update and deletion are the free functions
//! [`get`], [`set`] and [`delete`].

use crate::array::ValueBuffer;
use crate::document::{Document, FieldBuffer};
use crate::error::{Error, Result};
use crate::Value;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// Path and PathFragment
// =============================================================================

/// Error type for path parsing
///
/// Positions are character offsets into the parsed text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// Empty field name after a dot
    #[error("empty field name in path at position {0}")]
    EmptyField(usize),
    /// Unclosed bracket
    #[error("unclosed bracket starting at position {0}")]
    UnclosedBracket(usize),
    /// Unclosed backtick quote
    #[error("unclosed quote starting at position {0}")]
    UnclosedQuote(usize),
    /// Invalid array index
    #[error("invalid array index at position {0}: {1}")]
    InvalidIndex(usize, String),
    /// Unexpected character
    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),
}

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathFragment {
    /// Document field: `.name`
    Field(String),
    /// Array index: `[0]`
    Index(usize),
}

impl fmt::Display for PathFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathFragment::Field(name) => {
                f.write_str(".")?;
                write_field(f, name)
            }
            PathFragment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

fn is_bare_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn write_field(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if !name.is_empty() && name.chars().all(is_bare_char) {
        return f.write_str(name);
    }
    f.write_str("`")?;
    f.write_str(&name.replace('`', "``"))?;
    f.write_str("`")
}

/// A path into a document or array
///
/// ```
/// use docmodel_core::{Path, PathFragment};
///
/// let path: Path = "user.scores[1]".parse().unwrap();
/// assert_eq!(path, Path::root().field("user").field("scores").index(1));
/// assert_eq!(path.to_string(), "user.scores[1]");
/// assert_eq!(path.last_fragment(), Some(&PathFragment::Index(1)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Path {
    fragments: SmallVec<[PathFragment; 4]>,
}

impl Path {
    /// Create the root path (empty path)
    pub fn root() -> Self {
        Path::default()
    }

    /// Create a path from fragments
    pub fn from_fragments(fragments: impl IntoIterator<Item = PathFragment>) -> Self {
        Path {
            fragments: fragments.into_iter().collect(),
        }
    }

    /// Parse path text, reporting failures as [`Error::InvalidPath`]
    pub fn parse(s: &str) -> Result<Self> {
        Ok(s.parse::<Path>()?)
    }

    /// Get the path fragments
    pub fn fragments(&self) -> &[PathFragment] {
        &self.fragments
    }

    /// Get the number of fragments in the path
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Check if this is the root path (empty)
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Append a field fragment (builder pattern)
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fragments.push(PathFragment::Field(name.into()));
        self
    }

    /// Append an index fragment (builder pattern)
    pub fn index(mut self, idx: usize) -> Self {
        self.fragments.push(PathFragment::Index(idx));
        self
    }

    /// New path with a field fragment appended; `self` is unchanged
    pub fn extend_field(&self, name: impl Into<String>) -> Path {
        self.clone().field(name)
    }

    /// New path with an index fragment appended; `self` is unchanged
    pub fn extend_index(&self, idx: usize) -> Path {
        self.clone().index(idx)
    }

    pub(crate) fn push(&mut self, fragment: PathFragment) {
        self.fragments.push(fragment);
    }

    pub(crate) fn pop(&mut self) -> Option<PathFragment> {
        self.fragments.pop()
    }

    /// Get the parent path (None if root)
    pub fn parent(&self) -> Option<Path> {
        if self.fragments.is_empty() {
            return None;
        }
        let mut parent = self.clone();
        parent.fragments.pop();
        Some(parent)
    }

    /// Get the last fragment (None if root)
    pub fn last_fragment(&self) -> Option<&PathFragment> {
        self.fragments.last()
    }

    /// Check if this path is a prefix of (or equal to) another
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        other.fragments.starts_with(&self.fragments)
    }
}

impl FromStr for Path {
    type Err = PathParseError;

    /// Parse a path from a string
    ///
    /// Supported syntax:
    /// - `foo` or `.foo` - field
    /// - `` `a.b` `` - quoted field
    /// - `[0]` - array index
    /// - `foo.bar[0].baz` - mixed
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        let mut fragments = SmallVec::new();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '[' => {
                    let start = i;
                    i += 1;
                    let idx_start = i;
                    while i < chars.len() && chars[i] != ']' {
                        i += 1;
                    }
                    if i >= chars.len() {
                        return Err(PathParseError::UnclosedBracket(start));
                    }
                    let idx_str: String = chars[idx_start..i].iter().collect();
                    let idx = idx_str
                        .parse::<usize>()
                        .map_err(|_| PathParseError::InvalidIndex(idx_start, idx_str))?;
                    fragments.push(PathFragment::Index(idx));
                    i += 1; // Skip closing bracket
                }
                '.' => {
                    i += 1;
                    let name = parse_field(&chars, &mut i)?;
                    fragments.push(PathFragment::Field(name));
                }
                c if fragments.is_empty() && (c == '`' || is_bare_char(c)) => {
                    let name = parse_field(&chars, &mut i)?;
                    fragments.push(PathFragment::Field(name));
                }
                c => return Err(PathParseError::UnexpectedChar(c, i)),
            }
        }

        Ok(Path { fragments })
    }
}

fn parse_field(chars: &[char], i: &mut usize) -> std::result::Result<String, PathParseError> {
    let start = *i;
    if *i >= chars.len() {
        return Err(PathParseError::EmptyField(start));
    }

    if chars[*i] == '`' {
        *i += 1;
        let mut name = String::new();
        loop {
            match chars.get(*i) {
                None => return Err(PathParseError::UnclosedQuote(start)),
                Some('`') if chars.get(*i + 1) == Some(&'`') => {
                    name.push('`');
                    *i += 2;
                }
                Some('`') => {
                    *i += 1;
                    return Ok(name);
                }
                Some(c) => {
                    name.push(*c);
                    *i += 1;
                }
            }
        }
    }

    while *i < chars.len() && is_bare_char(chars[*i]) {
        *i += 1;
    }
    if *i == start {
        return Err(PathParseError::EmptyField(start));
    }
    Ok(chars[start..*i].iter().collect())
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, fragment) in self.fragments.iter().enumerate() {
            match fragment {
                // No leading dot on the first fragment
                PathFragment::Field(name) if n == 0 => write_field(f, name)?,
                other => write!(f, "{}", other)?,
            }
        }
        Ok(())
    }
}

impl From<PathFragment> for Path {
    fn from(fragment: PathFragment) -> Self {
        Path::from_fragments([fragment])
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Get the value at `path` within `root`
///
/// The root path returns `root` itself. A field fragment requires a
/// document and an index fragment requires an array; anything else, as
/// well as a missing field or an index past the end, is a not-found error
/// ([`Error::is_not_found`]).
///
/// ```
/// use docmodel_core::{path, FieldBuffer, Path, Value};
///
/// let doc = Value::from(FieldBuffer::new().with_field("a", vec![Value::from(1), Value::from(2)]));
/// let p: Path = "a[1]".parse().unwrap();
/// assert_eq!(path::get(&doc, &p).unwrap(), Value::Integer(2));
/// ```
pub fn get(root: &Value, path: &Path) -> Result<Value> {
    let mut current = root.clone();
    for fragment in path.fragments() {
        current = step(&current, fragment)?;
    }
    Ok(current)
}

/// Get the value at `path` within a document
pub fn get_in_document(doc: &dyn Document, path: &Path) -> Result<Value> {
    let (first, rest) = match path.fragments().split_first() {
        Some(split) => split,
        None => return FieldBuffer::copy_from(doc).map(Value::from),
    };
    let mut current = match first {
        PathFragment::Field(name) => doc.get_by_field(name)?,
        PathFragment::Index(index) => return Err(Error::IndexOutOfRange { index: *index }),
    };
    for fragment in rest {
        current = step(&current, fragment)?;
    }
    Ok(current)
}

fn step(current: &Value, fragment: &PathFragment) -> Result<Value> {
    match (fragment, current) {
        (PathFragment::Field(name), Value::Document(d)) => d.get_by_field(name),
        (PathFragment::Index(index), Value::Array(a)) => a.get_by_index(*index),
        (PathFragment::Field(name), _) => Err(Error::field_not_found(name.as_str())),
        (PathFragment::Index(index), _) => Err(Error::IndexOutOfRange { index: *index }),
    }
}

// =============================================================================
// Copy-on-write mutation
// =============================================================================

/// Return a new root with `value` stored at `path`
///
/// Every document or array on the way down is copied into an owned buffer
/// before it is modified; `root` and anything it shares are never touched.
/// A final field fragment missing from its parent document is appended.
/// Missing intermediate fields and array indexes past the end are errors;
/// arrays are never extended. The root path replaces the whole value.
///
/// ```
/// use docmodel_core::{path, FieldBuffer, Path, Value};
///
/// let root = Value::from(FieldBuffer::new());
/// let updated = path::set(&root, &"a".parse().unwrap(), Value::from(1)).unwrap();
/// assert_eq!(updated, Value::from(FieldBuffer::new().with_field("a", 1)));
/// ```
pub fn set(root: &Value, path: &Path, value: Value) -> Result<Value> {
    set_in(root, path.fragments(), value)
}

fn set_in(current: &Value, fragments: &[PathFragment], value: Value) -> Result<Value> {
    let (first, rest) = match fragments.split_first() {
        Some(split) => split,
        None => return Ok(value),
    };

    match (first, current) {
        (PathFragment::Field(name), Value::Document(d)) => {
            let mut fb = FieldBuffer::new();
            fb.scan_document(d.as_ref())?;
            if rest.is_empty() {
                fb.set(name.as_str(), value);
            } else {
                let child = fb
                    .get(name)
                    .ok_or_else(|| Error::field_not_found(name.as_str()))?;
                let updated = set_in(child, rest, value)?;
                fb.replace(name, updated)?;
            }
            Ok(Value::from(fb))
        }
        (PathFragment::Index(index), Value::Array(a)) => {
            let mut vb = ValueBuffer::new();
            vb.scan_array(a.as_ref())?;
            let child = vb
                .get(*index)
                .ok_or(Error::IndexOutOfRange { index: *index })?;
            let updated = set_in(child, rest, value)?;
            vb.replace(*index, updated)?;
            Ok(Value::from(vb))
        }
        (PathFragment::Field(name), _) => Err(Error::field_not_found(name.as_str())),
        (PathFragment::Index(index), _) => Err(Error::IndexOutOfRange { index: *index }),
    }
}

/// Return a new root with the value at `path` removed
///
/// Same copy discipline as [`set`]. Deleting a field removes its first
/// occurrence; deleting an array element shifts later elements down.
/// Deleting a path that does not exist is a not-found error, and the root
/// path cannot be deleted.
pub fn delete(root: &Value, path: &Path) -> Result<Value> {
    if path.is_empty() {
        return Err(Error::Unsupported("cannot delete the root value".to_string()));
    }
    delete_in(root, path.fragments())
}

fn delete_in(current: &Value, fragments: &[PathFragment]) -> Result<Value> {
    let (first, rest) = match fragments.split_first() {
        Some(split) => split,
        None => return Ok(current.clone()),
    };

    match (first, current) {
        (PathFragment::Field(name), Value::Document(d)) => {
            let mut fb = FieldBuffer::new();
            fb.scan_document(d.as_ref())?;
            if rest.is_empty() {
                fb.delete(name)?;
            } else {
                let child = fb
                    .get(name)
                    .ok_or_else(|| Error::field_not_found(name.as_str()))?;
                let updated = delete_in(child, rest)?;
                fb.replace(name, updated)?;
            }
            Ok(Value::from(fb))
        }
        (PathFragment::Index(index), Value::Array(a)) => {
            let mut vb = ValueBuffer::new();
            vb.scan_array(a.as_ref())?;
            if rest.is_empty() {
                vb.remove(*index)?;
            } else {
                let child = vb
                    .get(*index)
                    .ok_or(Error::IndexOutOfRange { index: *index })?;
                let updated = delete_in(child, rest)?;
                vb.replace(*index, updated)?;
            }
            Ok(Value::from(vb))
        }
        (PathFragment::Field(name), _) => Err(Error::field_not_found(name.as_str())),
        (PathFragment::Index(index), _) => Err(Error::IndexOutOfRange { index: *index }),
    }
}
