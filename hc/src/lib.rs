//! Reference-counted hash-consing.
//!
//! A [Table] interns values of some type `D`: structurally equal values are stored once and handed
//! out as [Node]s, which compare, hash, and order by a unique [Id] rather than by structure.
//!
//! Tables are not thread-safe. Clients usually keep one per thread:
//!
//! ```rust
//! use pull_ite_hc::{Node, Table};
//!
//! thread_local! {
//!     static NUMS: Table<u8> = Table::default();
//! }
//!
//! let a: Node<u8> = NUMS.with(|t| t.create(7));
//! let b: Node<u8> = NUMS.with(|t| t.create(7));
//! assert_eq!(a, b);
//! assert_eq!(*a, 7);
//! ```

#![warn(missing_docs)]

use fxhash::FxHashMap as HashMap;
use log::trace;

use std::cell::{Cell, RefCell};
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::rc::Rc;


/// The unique identifier of a node.
///
/// Identifiers are handed out in allocation order and never reused by a table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Id(pub u64);

impl Display for Id {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A hash-consed node.
pub struct Node<D> {
    data: Rc<D>,
    id: Id,
}

impl<D> Node<D> {
    /// Get the unique ID of this node.
    pub fn id(&self) -> Id {
        self.id
    }
    /// Get the ref count of this node. The owning table holds two references.
    pub fn ref_cnt(&self) -> u64 {
        Rc::strong_count(&self.data) as u64
    }
}

impl<D> Clone for Node<D> {
    fn clone(&self) -> Self {
        Node {
            data: self.data.clone(),
            id: self.id,
        }
    }
}

impl<D> Deref for Node<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.data
    }
}

impl<D> PartialEq for Node<D> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<D> Eq for Node<D> {}

impl<D> PartialOrd for Node<D> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<D> Ord for Node<D> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl<D> Hash for Node<D> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl<D: Display> Display for Node<D> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(&*self.data, f)
    }
}

impl<D: Debug> Debug for Node<D> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(&*self.data, f)
    }
}

/// A hash-cons table.
pub struct Table<D> {
    table: RefCell<HashMap<Rc<D>, Node<D>>>,
    next_id: Cell<u64>,
}

impl<D> Default for Table<D> {
    fn default() -> Self {
        Self {
            table: Default::default(),
            next_id: Cell::new(0),
        }
    }
}

impl<D> Debug for Table<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("len", &self.table.borrow().len())
            .field("next_id", &self.next_id.get())
            .finish()
    }
}

impl<D: Hash + Eq> Table<D> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `data`, returning the existing node if equal data is already present.
    pub fn create(&self, data: D) -> Node<D> {
        let mut table = self.table.borrow_mut();
        if let Some(n) = table.get(&data) {
            return n.clone();
        }
        let id = Id(self.next_id.get());
        self.next_id
            .set(id.0.checked_add(1).expect("id overflow"));
        let data = Rc::new(data);
        let node = Node {
            data: data.clone(),
            id,
        };
        table.insert(data, node.clone());
        node
    }

    /// The number of live entries.
    pub fn len(&self) -> usize {
        self.table.borrow().len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of nodes ever allocated by this table.
    pub fn allocated(&self) -> u64 {
        self.next_id.get()
    }

    /// Remove every node that only the table refers to. Returns the number of nodes removed.
    pub fn gc(&self) -> usize {
        let start = std::time::Instant::now();
        let mut table = self.table.borrow_mut();
        let old_size = table.len();
        loop {
            let before = table.len();
            // 2 pointers: the key, and the node stored with it.
            table.retain(|_, n| Rc::strong_count(&n.data) > 2);
            if table.len() == before {
                break;
            }
        }
        let collected = old_size - table.len();
        trace!(
            "GC: {} nodes -> {} nodes in {} us",
            old_size,
            table.len(),
            start.elapsed().as_micros()
        );
        collected
    }
}

impl<D> Drop for Table<D> {
    fn drop(&mut self) {
        // If we just drop everything in the table, there can be deep Rc::drop recursions.
        // Peeling off unreferenced nodes first keeps each drop shallow.
        if !std::thread::panicking() {
            let table = self.table.get_mut();
            loop {
                let before = table.len();
                table.retain(|_, n| Rc::strong_count(&n.data) > 2);
                if table.len() == before {
                    break;
                }
            }
        }
    }
}
