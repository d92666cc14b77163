//! Paged Arena
//!
//! A growable sequence of slots split into fixed-capacity pages.

use std::ops::{Index, IndexMut};

/// Number of slots in one arena page.
pub const PAGE_SIZE: usize = 16;

/// One fixed-capacity page. The backing vector is allocated with exactly
/// `PAGE_SIZE` capacity and never pushed past it, so it never reallocates.
#[derive(Debug)]
struct Page<T> {
    slots: Vec<T>,
}

impl<T> Page<T> {
    fn new() -> Self {
        Self {
            slots: Vec::with_capacity(PAGE_SIZE),
        }
    }

    fn is_full(&self) -> bool {
        self.slots.len() == PAGE_SIZE
    }
}

/// A paged arena of `T` slots addressed by `usize` index.
///
/// Slots are only ever appended or popped from the end; freeing a slot in
/// the middle is the owner's business (free lists live in the slots).
#[derive(Debug)]
pub struct PagedArena<T> {
    pages: Vec<Page<T>>,
    len: usize,
}

impl<T> PagedArena<T> {
    /// Create an empty arena. No page is allocated until the first push.
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            len: 0,
        }
    }

    /// Create an empty arena whose page table has room for `pages` pages.
    pub fn with_page_capacity(pages: usize) -> Self {
        Self {
            pages: Vec::with_capacity(pages),
            len: 0,
        }
    }

    /// Number of allocated slots (live or free).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no slot has ever been allocated.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of pages currently held.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append a slot and return its index.
    ///
    /// A new page is allocated only when the last page is full.
    pub fn push(&mut self, value: T) -> usize {
        if self.pages.last().map_or(true, Page::is_full) {
            self.pages.push(Page::new());
        }
        let index = self.len;
        if let Some(page) = self.pages.last_mut() {
            page.slots.push(value);
        }
        self.len += 1;
        index
    }

    /// Remove the most recently pushed slot.
    ///
    /// Used to undo a push. A page left empty is released again, so the
    /// arena returns to exactly the shape it had before the push.
    pub fn pop(&mut self) -> Option<T> {
        let page = self.pages.last_mut()?;
        let value = page.slots.pop()?;
        if page.slots.is_empty() {
            self.pages.pop();
        }
        self.len -= 1;
        Some(value)
    }

    /// Borrow the slot at `index`, if allocated.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.pages
            .get(index / PAGE_SIZE)
            .and_then(|page| page.slots.get(index % PAGE_SIZE))
    }

    /// Mutably borrow the slot at `index`, if allocated.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.pages
            .get_mut(index / PAGE_SIZE)
            .and_then(|page| page.slots.get_mut(index % PAGE_SIZE))
    }

    /// Iterate over every allocated slot in index order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.pages.iter().flat_map(|page| page.slots.iter())
    }
}

impl<T> Default for PagedArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for PagedArena<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.pages[index / PAGE_SIZE].slots[index % PAGE_SIZE]
    }
}

impl<T> IndexMut<usize> for PagedArena<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.pages[index / PAGE_SIZE].slots[index % PAGE_SIZE]
    }
}
