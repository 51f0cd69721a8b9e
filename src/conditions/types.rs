//! core types for compiled policy conditions

use std::fmt;
use std::ops::{BitOr, BitOrAssign, Deref};
use std::sync::Arc;

use serde::Serialize;

/// file attribute a condition can test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Path,
    Tree,
    Filename,
    Owner,
    Group,
    Pool,
    Type,
    Size,
    Depth,
    DirCount,
    OstIndex,
    LastAccess,
    LastMod,
    LastArchive,
    LastRestore,
    Creation,
    Xattr,
    Status,
}

/// comparison operators of a compiled condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    #[default]
    Equal,
    Diff,
    Greater,
    GreaterEq,
    Less,
    LessEq,
    /// shell-pattern match, from `==` on a value with wildcards
    Like,
    /// negated shell-pattern match, from `!=` on a value with wildcards
    Unlike,
}

impl Comparator {
    /// textual form used when rendering conditions
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::Equal => "==",
            Comparator::Diff => "<>",
            Comparator::Greater => ">",
            Comparator::GreaterEq => ">=",
            Comparator::Less => "<",
            Comparator::LessEq => "<=",
            Comparator::Like => " =~ ",
            Comparator::Unlike => " !~ ",
        }
    }

    /// whether this is one of the equality-like operators
    pub fn is_equality(&self) -> bool {
        matches!(
            self,
            Comparator::Equal | Comparator::Diff | Comparator::Like | Comparator::Unlike
        )
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// file type values for the `type` criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    File,
    Dir,
    Symlink,
    Chr,
    Blk,
    Fifo,
    Sock,
}

impl FileType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Some(FileType::File),
            "dir" | "directory" => Some(FileType::Dir),
            "symlink" | "link" => Some(FileType::Symlink),
            "chr" => Some(FileType::Chr),
            "blk" => Some(FileType::Blk),
            "fifo" => Some(FileType::Fifo),
            "sock" => Some(FileType::Sock),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::File => "file",
            FileType::Dir => "dir",
            FileType::Symlink => "symlink",
            FileType::Chr => "chr",
            FileType::Blk => "blk",
            FileType::Fifo => "fifo",
            FileType::Sock => "sock",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// typed value of a condition; the variant follows the criterion's value type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareValue {
    Str(String),
    Int(i32),
    /// bytes
    Size(i64),
    /// seconds
    Duration(i64),
    Type(FileType),
}

impl Default for CompareValue {
    fn default() -> Self {
        CompareValue::Int(0)
    }
}

/// the atomic leaf of a compiled expression
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CompareTriplet {
    pub criterion: Criterion,
    pub op: Comparator,
    pub value: CompareValue,
    /// attribute name, for `xattr.<name>` conditions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xattr_name: Option<String>,
    /// value was written with `**` and rewritten for pattern matching
    pub any_level: bool,
}

impl Default for Criterion {
    fn default() -> Self {
        Criterion::Path
    }
}

impl CompareTriplet {
    pub fn new(criterion: Criterion, op: Comparator, value: CompareValue) -> Self {
        Self {
            criterion,
            op,
            value,
            xattr_name: None,
            any_level: false,
        }
    }
}

/// set of file attributes an expression reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct AttrMask(pub u64);

impl AttrMask {
    pub const EMPTY: AttrMask = AttrMask(0);
    pub const FULLPATH: AttrMask = AttrMask(1 << 0);
    pub const NAME: AttrMask = AttrMask(1 << 1);
    pub const OWNER: AttrMask = AttrMask(1 << 2);
    pub const GROUP: AttrMask = AttrMask(1 << 3);
    pub const SIZE: AttrMask = AttrMask(1 << 4);
    pub const DEPTH: AttrMask = AttrMask(1 << 5);
    pub const DIRCOUNT: AttrMask = AttrMask(1 << 6);
    pub const LAST_ACCESS: AttrMask = AttrMask(1 << 7);
    pub const LAST_MOD: AttrMask = AttrMask(1 << 8);
    pub const LAST_ARCHIVE: AttrMask = AttrMask(1 << 9);
    pub const LAST_RESTORE: AttrMask = AttrMask(1 << 10);
    pub const CREATION_TIME: AttrMask = AttrMask(1 << 11);
    pub const TYPE: AttrMask = AttrMask(1 << 12);
    pub const STRIPE_INFO: AttrMask = AttrMask(1 << 13);
    pub const STRIPE_ITEMS: AttrMask = AttrMask(1 << 14);
    pub const XATTRS: AttrMask = AttrMask(1 << 15);

    /// first bit used for per-status-manager attributes
    pub const STATUS_SHIFT: u32 = 32;
    pub const MAX_STATUS_MANAGERS: usize = 32;

    const NAMES: [(AttrMask, &'static str); 16] = [
        (Self::FULLPATH, "fullpath"),
        (Self::NAME, "name"),
        (Self::OWNER, "owner"),
        (Self::GROUP, "group"),
        (Self::SIZE, "size"),
        (Self::DEPTH, "depth"),
        (Self::DIRCOUNT, "dircount"),
        (Self::LAST_ACCESS, "last_access"),
        (Self::LAST_MOD, "last_mod"),
        (Self::LAST_ARCHIVE, "last_archive"),
        (Self::LAST_RESTORE, "last_restore"),
        (Self::CREATION_TIME, "creation_time"),
        (Self::TYPE, "type"),
        (Self::STRIPE_INFO, "stripe_info"),
        (Self::STRIPE_ITEMS, "stripe_items"),
        (Self::XATTRS, "xattrs"),
    ];

    /// status attribute of the status manager instance at `index`
    pub fn status(index: usize) -> AttrMask {
        debug_assert!(index < Self::MAX_STATUS_MANAGERS);
        AttrMask(1 << (Self::STATUS_SHIFT as usize + index))
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, other: AttrMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// names of the attributes in this mask
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = Self::NAMES
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, name)| name.to_string())
            .collect();
        for index in 0..Self::MAX_STATUS_MANAGERS {
            if self.contains(Self::status(index)) {
                names.push(format!("status[{}]", index));
            }
        }
        names
    }
}

impl BitOr for AttrMask {
    type Output = AttrMask;

    fn bitor(self, rhs: AttrMask) -> AttrMask {
        AttrMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for AttrMask {
    fn bitor_assign(&mut self, rhs: AttrMask) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for AttrMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(none)");
        }
        write!(f, "{}", self.names().join(","))
    }
}

/// boolean operators of compiled expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    Not,
    And,
    Or,
}

/// shape of a compiled node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Condition,
    UnaryExpr,
    BinaryExpr,
}

/// a compiled boolean expression node
#[derive(Debug, Clone, PartialEq)]
pub enum BoolNode {
    Condition(Box<CompareTriplet>),
    Not(Subtree),
    And(Subtree, Subtree),
    Or(Subtree, Subtree),
}

impl BoolNode {
    pub fn node_type(&self) -> NodeType {
        match self {
            BoolNode::Condition(_) => NodeType::Condition,
            BoolNode::Not(_) => NodeType::UnaryExpr,
            BoolNode::And(..) | BoolNode::Or(..) => NodeType::BinaryExpr,
        }
    }

    pub fn bool_op(&self) -> Option<BoolOp> {
        match self {
            BoolNode::Condition(_) => None,
            BoolNode::Not(_) => Some(BoolOp::Not),
            BoolNode::And(..) => Some(BoolOp::And),
            BoolNode::Or(..) => Some(BoolOp::Or),
        }
    }

    pub fn condition(&self) -> Option<&CompareTriplet> {
        match self {
            BoolNode::Condition(triplet) => Some(triplet),
            _ => None,
        }
    }

    /// direct children of a composite node
    pub fn children(&self) -> Vec<&Subtree> {
        match self {
            BoolNode::Condition(_) => vec![],
            BoolNode::Not(expr) => vec![expr],
            BoolNode::And(left, right) | BoolNode::Or(left, right) => vec![left, right],
        }
    }

    /// true when every child of this node is exclusively owned by it
    pub fn owns_children(&self) -> bool {
        self.children().iter().all(|child| child.is_owned())
    }

    /// number of condition leaves, following shared subtrees
    pub fn condition_count(&self) -> usize {
        match self {
            BoolNode::Condition(_) => 1,
            _ => self.children().iter().map(|c| c.condition_count()).sum(),
        }
    }
}

/// child link of a compiled node
///
/// `Owned` subtrees are dropped with their parent. `Shared` subtrees are
/// fileclass definitions held by a registry: the link only adds a reference,
/// so a definition is freed once, when its last holder goes away.
#[derive(Debug, Clone, PartialEq)]
pub enum Subtree {
    Owned(Box<BoolNode>),
    Shared(Arc<BoolNode>),
}

impl Subtree {
    pub fn owned(node: BoolNode) -> Self {
        Subtree::Owned(Box::new(node))
    }

    pub fn shared(node: &Arc<BoolNode>) -> Self {
        Subtree::Shared(Arc::clone(node))
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, Subtree::Owned(_))
    }

    /// turn this subtree into a shareable definition without copying owned content
    pub fn into_shared(self) -> Arc<BoolNode> {
        match self {
            Subtree::Owned(node) => Arc::new(*node),
            Subtree::Shared(node) => node,
        }
    }
}

impl Deref for Subtree {
    type Target = BoolNode;

    fn deref(&self) -> &BoolNode {
        match self {
            Subtree::Owned(node) => node,
            Subtree::Shared(node) => node,
        }
    }
}

/// a compiled expression with the attributes it depends on
#[derive(Debug, Clone, PartialEq)]
pub struct BoolExpr {
    pub root: Subtree,
    pub attr_mask: AttrMask,
}

impl BoolExpr {
    pub fn new(root: Subtree, attr_mask: AttrMask) -> Self {
        Self { root, attr_mask }
    }
}
