//! Program navigator.
//!
//! Holds the fetch cursor over a shared, immutable [`Listing`]. Each machine state owns
//! its own `Program`; cloning copies the cursor and bumps the reference count of the
//! listing, so snapshots never share mutable state.
//!
//! Fetch walks the sections in the order they appear in the source. A taken branch or
//! a jump moves the cursor to the start of the target section; running off the end of a
//! section continues with the next non-empty one, and running off the last section
//! exhausts fetching.

use std::sync::Arc;

use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};
use tracing::debug;

use crate::isa::asm::Listing;
use crate::isa::instruction::Instruction;

/// Lookahead window split at the first control-flow instruction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct InstructionQueue {
    /// Code orders up to and including the first branch or jump.
    pub visible: Vec<usize>,
    /// Code orders beyond it; renderers gray these out.
    pub remaining: Vec<usize>,
}

/// Fetch cursor over a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    listing: Arc<Listing>,
    section: usize,
    index: usize,
    fetched: usize,
    execution_order: Vec<usize>,
    window: Option<usize>,
}

impl Program {
    /// Creates a cursor at the first instruction of the first non-empty section.
    ///
    /// # Arguments
    ///
    /// * `listing` - The parsed program.
    /// * `window` - Maximum length of [`Program::instruction_queue`]; `None` for no cap.
    pub fn new(listing: Arc<Listing>, window: Option<usize>) -> Self {
        let mut program = Self {
            listing,
            section: 0,
            index: 0,
            fetched: 0,
            execution_order: Vec::new(),
            window,
        };
        program.skip_empty_sections();
        program
    }

    /// Shared handle to the listing.
    pub fn shared_listing(&self) -> Arc<Listing> {
        Arc::clone(&self.listing)
    }

    /// Number of instructions fetched so far. Never decreases.
    pub const fn fetched(&self) -> usize {
        self.fetched
    }

    /// Code orders of fetched instructions, in fetch order.
    pub fn execution_order(&self) -> &[usize] {
        &self.execution_order
    }

    /// Returns true once the cursor has run past the last section.
    pub fn is_exhausted(&self) -> bool {
        self.current().is_none()
    }

    /// Code order of the instruction under the cursor.
    fn current(&self) -> Option<usize> {
        let name = self.listing.section_order.get(self.section)?;
        self.listing.section(name).get(self.index).copied()
    }

    /// Returns the instruction under the cursor, or `None` when fetching is exhausted.
    pub fn next_instruction(&self) -> Option<&Instruction> {
        self.current()
            .and_then(|order| self.listing.instructions.get(order))
    }

    /// Records the instruction under the cursor as fetched and moves the cursor.
    ///
    /// # Arguments
    ///
    /// * `jump` - Label to continue at. Unknown labels fall through to the next
    ///   instruction.
    pub fn advance(&mut self, jump: Option<&str>) {
        let Some(order) = self.current() else {
            return;
        };
        self.execution_order.push(order);
        self.fetched += 1;

        let target = jump.and_then(|label| {
            let found = self.listing.section_order.iter().position(|s| s == label);
            if found.is_none() {
                debug!(label, "jump to unknown label falls through");
            }
            found
        });

        if let Some(section) = target {
            self.section = section;
            self.index = 0;
        } else {
            self.index += 1;
            let len = self
                .listing
                .section_order
                .get(self.section)
                .map_or(0, |name| self.listing.section(name).len());
            if self.index >= len {
                self.section += 1;
                self.index = 0;
            }
        }
        self.skip_empty_sections();
    }

    fn skip_empty_sections(&mut self) {
        while let Some(name) = self.listing.section_order.get(self.section) {
            if self.index < self.listing.section(name).len() {
                break;
            }
            self.section += 1;
            self.index = 0;
        }
    }

    /// Lookahead from the cursor through the remaining sections, in section order.
    ///
    /// The window is capped by the configured queue length and is empty once fetching is
    /// exhausted.
    pub fn instruction_queue(&self) -> InstructionQueue {
        let mut queue = InstructionQueue::default();
        let cap = self.window.unwrap_or(usize::MAX);
        let mut split = false;
        let mut index = self.index;
        for name in self.listing.section_order.iter().skip(self.section) {
            for &order in self.listing.section(name).iter().skip(index) {
                if queue.visible.len() + queue.remaining.len() >= cap {
                    return queue;
                }
                if split {
                    queue.remaining.push(order);
                } else {
                    queue.visible.push(order);
                    split = self.listing.instructions[order].is_control();
                }
            }
            index = 0;
        }
        queue
    }

    /// Returns the `n`-th fetched instruction.
    pub fn at_execution_order(&self, n: usize) -> Option<&Instruction> {
        self.execution_order
            .get(n)
            .and_then(|&order| self.listing.instructions.get(order))
    }

    /// Returns the instruction with code order `n`.
    pub fn at_code_order(&self, n: usize) -> Option<&Instruction> {
        self.listing.instructions.get(n)
    }
}

impl Serialize for Program {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Program", 5)?;
        s.serialize_field("section", &self.listing.section_order.get(self.section))?;
        s.serialize_field("next", &self.current())?;
        s.serialize_field("fetched", &self.fetched)?;
        s.serialize_field("execution_order", &self.execution_order)?;
        s.serialize_field("queue", &self.instruction_queue())?;
        s.end()
    }
}
