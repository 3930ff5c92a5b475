//! Filename templates such as `[name].[contenthash:8].js`.
//!
//! A template is literal text interleaved with `[placeholder]` or
//! `[placeholder:len]` tokens. The resolver only accepts templates that carry
//! at least one placeholder that differs between artifacts of the same kind,
//! so two emitted files can never share a name.

use std::fmt;
use std::path::{Component, Path};

use serde::{Serialize, Serializer};

use crate::error::{ConfigError, Result};

/// Substitution token inside a filename template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// Chunk or module name
    Name,
    /// Chunk or module id
    Id,
    /// Hash of the artifact's content
    ContentHash(Option<usize>),
    /// Hash of the chunk
    ChunkHash(Option<usize>),
    /// Hash of the whole compilation (same for every artifact)
    FullHash(Option<usize>),
    /// Module hash for WebAssembly artifacts, compilation hash otherwise
    Hash(Option<usize>),
    /// Extension of the source file, including the dot
    Ext,
    /// Query string of the source request
    Query,
}

impl Placeholder {
    fn parse(token: &str) -> Option<Self> {
        let (name, len) = match token.split_once(':') {
            Some((name, len)) => (name, Some(len.parse::<usize>().ok().filter(|n| *n > 0)?)),
            None => (token, None),
        };

        let placeholder = match name {
            "name" => Self::Name,
            "id" => Self::Id,
            "contenthash" => Self::ContentHash(len),
            "chunkhash" => Self::ChunkHash(len),
            "fullhash" => Self::FullHash(len),
            "hash" => Self::Hash(len),
            "ext" => Self::Ext,
            "query" => Self::Query,
            _ => return None,
        };

        // Only hashes take a length
        match placeholder {
            Self::Name | Self::Id | Self::Ext | Self::Query if len.is_some() => None,
            other => Some(other),
        }
    }

    /// Whether this placeholder differs between two artifacts of `kind`.
    pub fn is_unique_per(&self, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::JavaScript => matches!(
                self,
                Self::Name | Self::Id | Self::ContentHash(_) | Self::ChunkHash(_)
            ),
            ArtifactKind::WebAssembly => {
                matches!(self, Self::Id | Self::Hash(_) | Self::ContentHash(_))
            }
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, len) = match self {
            Self::Name => ("name", None),
            Self::Id => ("id", None),
            Self::ContentHash(len) => ("contenthash", *len),
            Self::ChunkHash(len) => ("chunkhash", *len),
            Self::FullHash(len) => ("fullhash", *len),
            Self::Hash(len) => ("hash", *len),
            Self::Ext => ("ext", None),
            Self::Query => ("query", None),
        };
        match len {
            Some(len) => write!(f, "[{name}:{len}]"),
            None => write!(f, "[{name}]"),
        }
    }
}

/// Kind of artifact a template names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    JavaScript,
    WebAssembly,
}

impl ArtifactKind {
    fn unique_placeholders(&self) -> &'static str {
        match self {
            Self::JavaScript => "[name], [id], [contenthash] or [chunkhash]",
            Self::WebAssembly => "[id], [hash] or [contenthash]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// Parsed filename template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameTemplate {
    source: String,
    segments: Vec<Segment>,
}

/// Values substituted when rendering a template
#[derive(Debug, Clone, Default)]
pub struct ArtifactInfo<'a> {
    pub name: &'a str,
    pub id: &'a str,
    pub content_hash: &'a str,
    pub chunk_hash: &'a str,
    pub full_hash: &'a str,
    pub module_hash: &'a str,
    pub ext: &'a str,
    pub query: &'a str,
}

impl FilenameTemplate {
    /// Parse a template, rejecting malformed tokens and paths that would
    /// escape the output directory. `field` names the option in errors.
    pub fn parse(field: &str, source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Err(ConfigError::invalid_value(field, "filename pattern cannot be empty"));
        }

        let path = Path::new(source);
        if path.is_absolute()
            || path
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
        {
            return Err(ConfigError::invalid_value(
                field,
                format!("`{source}` must stay inside the output directory"),
            ));
        }

        let mut segments = Vec::new();
        let mut rest = source;
        while let Some(open) = rest.find('[') {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let after = &rest[open + 1..];
            let close = after.find(']').ok_or_else(|| {
                ConfigError::invalid_value(field, format!("unterminated placeholder in `{source}`"))
            })?;
            let token = &after[..close];
            let placeholder = Placeholder::parse(token).ok_or_else(|| {
                ConfigError::invalid_value(field, format!("unknown placeholder `[{token}]`"))
            })?;
            segments.push(Segment::Placeholder(placeholder));
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.segments.iter().filter_map(|seg| match seg {
            Segment::Placeholder(p) => Some(*p),
            Segment::Literal(_) => None,
        })
    }

    pub fn is_unique_per(&self, kind: ArtifactKind) -> bool {
        self.placeholders().any(|p| p.is_unique_per(kind))
    }

    /// Fail with `non-unique-output-naming` unless some placeholder
    /// distinguishes artifacts of `kind`.
    pub fn require_unique(&self, field: &'static str, kind: ArtifactKind) -> Result<()> {
        if self.is_unique_per(kind) {
            return Ok(());
        }
        Err(ConfigError::NonUniqueOutputNaming {
            field,
            pattern: self.source.clone(),
            expected: kind.unique_placeholders().to_string(),
        })
    }

    /// Expand the template for one artifact.
    pub fn render(&self, info: &ArtifactInfo<'_>) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(p) => match p {
                    Placeholder::Name => out.push_str(info.name),
                    Placeholder::Id => out.push_str(info.id),
                    Placeholder::Ext => out.push_str(info.ext),
                    Placeholder::Query => out.push_str(info.query),
                    Placeholder::ContentHash(len) => out.push_str(truncate(info.content_hash, *len)),
                    Placeholder::ChunkHash(len) => out.push_str(truncate(info.chunk_hash, *len)),
                    Placeholder::FullHash(len) => out.push_str(truncate(info.full_hash, *len)),
                    Placeholder::Hash(len) => out.push_str(truncate(info.module_hash, *len)),
                },
            }
        }
        out
    }
}

fn truncate(hash: &str, len: Option<usize>) -> &str {
    match len {
        Some(len) => hash.get(..len).unwrap_or(hash),
        None => hash,
    }
}

impl fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for FilenameTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}
