//! Operation tokens and the containment lattice
//!
//! Tokens are stored as opaque strings by the artifact store. Containment is
//! decided by a fixed table, never by comparing string structure or positions.

use crate::errors::{WardenError, WardenResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A permission operation token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Operation {
    /// `n`: no access
    NoAccess,
    /// `l`: list
    List,
    /// `l+`: list, create and commit
    ListCreate,
    /// `lv`: list and list vectors
    ListVectors,
    /// `lv+`: list, list vectors, create and commit
    ListVectorsCreate,
    /// `lf`: list and list files
    ListFiles,
    /// `lf+`: list, list files, create and commit
    ListFilesCreate,
    /// `r`: read, get file, list files, list, search vectors, get vector
    Read,
    /// `r+`: read plus put file, create, commit, add vectors, add documents
    ReadCreate,
    /// `rw`: read, write and create with file management
    ReadWrite,
    /// `rw+`: read, write, create and manage (including permission edits)
    ReadWriteManage,
    /// `*`: every operation
    All,
}

use Operation::*;

const LIST_COVERS: &[Operation] = &[List];
const LIST_CREATE_COVERS: &[Operation] = &[List, ListCreate];
const LIST_VECTORS_COVERS: &[Operation] = &[List, ListVectors];
const LIST_VECTORS_CREATE_COVERS: &[Operation] =
    &[List, ListCreate, ListVectors, ListVectorsCreate];
const LIST_FILES_COVERS: &[Operation] = &[List, ListFiles];
const LIST_FILES_CREATE_COVERS: &[Operation] = &[List, ListCreate, ListFiles, ListFilesCreate];
const READ_COVERS: &[Operation] = &[List, ListVectors, ListFiles, Read];
const READ_CREATE_COVERS: &[Operation] = &[
    List,
    ListCreate,
    ListVectors,
    ListVectorsCreate,
    ListFiles,
    ListFilesCreate,
    Read,
    ReadCreate,
];
const READ_WRITE_COVERS: &[Operation] = &[
    List,
    ListCreate,
    ListVectors,
    ListVectorsCreate,
    ListFiles,
    ListFilesCreate,
    Read,
    ReadCreate,
    ReadWrite,
];
const READ_WRITE_MANAGE_COVERS: &[Operation] = &[
    List,
    ListCreate,
    ListVectors,
    ListVectorsCreate,
    ListFiles,
    ListFilesCreate,
    Read,
    ReadCreate,
    ReadWrite,
    ReadWriteManage,
];

impl Operation {
    /// Every token, in capability order
    pub const ALL: [Operation; 12] = [
        NoAccess,
        List,
        ListCreate,
        ListVectors,
        ListVectorsCreate,
        ListFiles,
        ListFilesCreate,
        Read,
        ReadCreate,
        ReadWrite,
        ReadWriteManage,
        All,
    ];

    /// Capability required to edit a resource's permission map
    pub const MANAGE: Operation = ReadWriteManage;

    /// The wire token for this operation
    pub const fn as_str(self) -> &'static str {
        match self {
            NoAccess => "n",
            List => "l",
            ListCreate => "l+",
            ListVectors => "lv",
            ListVectorsCreate => "lv+",
            ListFiles => "lf",
            ListFilesCreate => "lf+",
            Read => "r",
            ReadCreate => "r+",
            ReadWrite => "rw",
            ReadWriteManage => "rw+",
            All => "*",
        }
    }

    /// Parse a wire token, rejecting anything outside the fixed set
    pub fn parse(token: &str) -> WardenResult<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == token)
            .ok_or_else(|| WardenError::validation(format!("Unknown operation token '{token}'")))
    }

    /// Every token this operation covers, itself included
    pub fn covers(self) -> &'static [Operation] {
        match self {
            NoAccess => &[NoAccess],
            List => LIST_COVERS,
            ListCreate => LIST_CREATE_COVERS,
            ListVectors => LIST_VECTORS_COVERS,
            ListVectorsCreate => LIST_VECTORS_CREATE_COVERS,
            ListFiles => LIST_FILES_COVERS,
            ListFilesCreate => LIST_FILES_CREATE_COVERS,
            Read => READ_COVERS,
            ReadCreate => READ_CREATE_COVERS,
            ReadWrite => READ_WRITE_COVERS,
            ReadWriteManage => READ_WRITE_MANAGE_COVERS,
            All => &Self::ALL,
        }
    }

    /// Whether holding `self` permits performing `requested`
    pub fn grants(self, requested: Operation) -> bool {
        self == All || self == requested || self.covers().contains(&requested)
    }
}

/// Evaluate a possibly-empty grant. The empty grant permits nothing.
pub fn grant_permits(granted: Option<Operation>, requested: Operation) -> bool {
    granted.is_some_and(|op| op.grants(requested))
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = WardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Operation {
    type Error = WardenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Operation> for String {
    fn from(op: Operation) -> Self {
        op.as_str().to_string()
    }
}
